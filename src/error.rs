//! Error type used within crate with From for commonly used crate errors
use std::error;
use std::{fmt, io};

/// Result type used within crate
pub type Result<T> = std::result::Result<T, Error>;

/// Which way a failed interrupt transfer was going
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransferDirection {
    /// Host to hub (command)
    Out,
    /// Hub to host (response)
    In,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransferDirection::Out => write!(f, "out"),
            TransferDirection::In => write!(f, "in"),
        }
    }
}

/// Contained with [`ErrorKind`] to provide more context
#[derive(Debug, PartialEq, Clone)]
pub struct ErrorArg<E, G>
where
    E: fmt::Debug,
    G: fmt::Debug,
{
    expected: E,
    got: G,
}

impl fmt::Display for ErrorArg<usize, usize> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Expected: {}, Got: {}", self.expected, self.got)
    }
}

impl<E, G> ErrorArg<E, G>
where
    E: fmt::Debug,
    G: fmt::Debug,
{
    /// New ErrorArg
    pub fn new(expected: E, got: G) -> ErrorArg<E, G> {
        ErrorArg { expected, got }
    }

    /// The expected value
    pub fn expected(&self) -> &E {
        &self.expected
    }

    /// The actual value
    pub fn got(&self) -> &G {
        &self.got
    }
}

#[derive(Debug, PartialEq, Clone)]
/// Kind of error produced
pub enum ErrorKind {
    /// Failed to initialise the USB context
    Init,
    /// Failed to read the device list or a device descriptor during enumeration
    Enumeration,
    /// Failed to read a string descriptor whilst listing hubs
    Query,
    /// No matching hub with the requested ordinal on the bus
    NotFound,
    /// Unable to open matched hub - check permissions
    Opening,
    /// Failed to detach the kernel driver from the command interface
    Detach,
    /// Failed to set the device configuration
    Configuration,
    /// Failed to claim the command interface
    Claim,
    /// Interrupt transfer failed in the contained direction
    Transfer(TransferDirection),
    /// Hub acknowledgement was shorter than the fixed frame length
    ShortRead(ErrorArg<usize, usize>),
    /// Invalid arg for method or cli
    InvalidArg,
    /// Error parsing config file
    Config,
    /// [`std::io::Error`] probably not found when reading file to parse
    Io,
    /// Error From other crate without enum variant
    Other(&'static str),
}

#[derive(Debug, PartialEq)]
/// Crate error which impl [`std::error`]
pub struct Error {
    /// The [`ErrorKind`]
    pub kind: ErrorKind,
    /// String description
    pub message: String,
}

impl Error {
    /// New error helper
    pub fn new(kind: ErrorKind, message: &str) -> Error {
        Error {
            kind,
            message: message.to_string(),
        }
    }

    /// New error helper for a response shorter than the expected frame length
    pub fn new_short_read(expected: usize, got: usize) -> Error {
        let error_arg = ErrorArg::new(expected, got);
        Error {
            kind: ErrorKind::ShortRead(error_arg),
            message: format!(
                "Short read from device. Expected: {}, Got: {}",
                expected, got
            ),
        }
    }

    /// The [`ErrorKind`]
    pub fn kind(&self) -> ErrorKind {
        self.kind.to_owned()
    }

    /// The description
    pub fn message(&self) -> &String {
        &self.message
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{:?} Error: {}", self.kind, self.message)
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Config,
            message: error.to_string(),
        }
    }
}
