//! On-wire command protocol for the YKUSH switchable hub: identity constants,
//! port selection and the fixed 6 byte command/response frames.
//!
//! The hub speaks a minimal protocol on two interrupt endpoints: the host
//! sends one 6 byte frame, the hub answers with one 6 byte frame.
//! Acknowledgement is purely the response length; the payload is not
//! interpreted.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Vendor ID shared by all hubs of this model
pub const VENDOR_ID: u16 = 0x04d8;
/// Product ID shared by all hubs of this model
pub const PRODUCT_ID: u16 = 0xf2f7;
/// Number of switchable downstream ports
pub const PORT_COUNT: u8 = 3;
/// Firmware sentinel for "every port at once"; does not collide with any
/// single port encoding in `1..=PORT_COUNT`
pub const ALL_PORTS: u8 = 0x0a;
/// Interrupt OUT endpoint commands are written to
pub const ENDPOINT_OUT: u8 = 0x01;
/// Interrupt IN endpoint the acknowledgement is read from
pub const ENDPOINT_IN: u8 = 0x81;
/// Fixed length of both command and response frames
pub const COMMAND_LEN: usize = 6;
/// Timeout applied independently to each interrupt transfer
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

/// Set in byte 0 for power up; clear for power down
const POWER_UP_FLAG: u8 = 0x10;

/// Whether a port is being switched on or off
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PowerDirection {
    /// Switch port power on
    Up,
    /// Switch port power off
    Down,
}

impl fmt::Display for PowerDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PowerDirection::Up => write!(f, "up"),
            PowerDirection::Down => write!(f, "down"),
        }
    }
}

/// A single downstream port or the firmware "all ports" sentinel
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PortSelector {
    /// One port in `1..=PORT_COUNT`
    Port(u8),
    /// Every port simultaneously
    All,
}

impl PortSelector {
    /// The selector bits OR'd into byte 0 of the command frame
    pub fn encode(&self) -> u8 {
        match self {
            PortSelector::Port(port) => *port,
            PortSelector::All => ALL_PORTS,
        }
    }

    /// Check the selector is something the firmware recognises
    ///
    /// Out of range ports are rejected here so they are never put on the
    /// wire.
    pub fn validate(&self) -> Result<()> {
        match self {
            PortSelector::Port(port) if (1..=PORT_COUNT).contains(port) => Ok(()),
            PortSelector::All => Ok(()),
            PortSelector::Port(port) => Err(Error::new(
                ErrorKind::InvalidArg,
                &format!("Port must be 1-{} or 'a', got {}", PORT_COUNT, port),
            )),
        }
    }
}

impl FromStr for PortSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<PortSelector> {
        let selector = match s {
            "a" => PortSelector::All,
            _ => PortSelector::Port(s.parse::<u8>().map_err(|_| {
                Error::new(
                    ErrorKind::InvalidArg,
                    &format!("Port must be 1-{} or 'a', got '{}'", PORT_COUNT, s),
                )
            })?),
        };
        selector.validate()?;
        Ok(selector)
    }
}

impl fmt::Display for PortSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PortSelector::Port(port) => write!(f, "{}", port),
            PortSelector::All => write!(f, "a"),
        }
    }
}

/// The two frame layouts observed in the wild
///
/// Deployed firmware disagrees on whether byte 1 repeats byte 0; neither
/// layout is authoritative so the choice is left to the caller rather than
/// baked in.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FrameVariant {
    /// Bytes 1..6 are zero padding
    #[default]
    Canonical,
    /// Byte 0 is repeated in byte 1, remaining bytes zero
    MirrorByte,
}

/// A fully encoded 6 byte command frame
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CommandFrame([u8; COMMAND_LEN]);

impl CommandFrame {
    /// Encode a power command for `selector` in the given frame layout
    ///
    /// Callers must [`PortSelector::validate`] the selector first; encoding
    /// itself does not range check.
    pub fn encode(
        direction: PowerDirection,
        selector: PortSelector,
        variant: FrameVariant,
    ) -> CommandFrame {
        let flag = match direction {
            PowerDirection::Up => POWER_UP_FLAG,
            PowerDirection::Down => 0x00,
        };
        let mut buf = [0u8; COMMAND_LEN];
        buf[0] = flag | selector.encode();
        if variant == FrameVariant::MirrorByte {
            buf[1] = buf[0];
        }
        CommandFrame(buf)
    }

    /// The raw frame for submission to the OUT endpoint
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Check the hub acknowledged with a full frame
///
/// The response payload carries no validated content; a transfer of exactly
/// [`COMMAND_LEN`] bytes is the only success condition.
pub fn validate_response(transferred: usize) -> Result<()> {
    if transferred < COMMAND_LEN {
        Err(Error::new_short_read(COMMAND_LEN, transferred))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_up_sets_flag() {
        let frame =
            CommandFrame::encode(PowerDirection::Up, PortSelector::Port(3), FrameVariant::Canonical);
        assert_eq!(frame.as_bytes(), &[0x13, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_down_clears_flag() {
        let frame = CommandFrame::encode(
            PowerDirection::Down,
            PortSelector::Port(3),
            FrameVariant::Canonical,
        );
        assert_eq!(frame.as_bytes(), &[0x03, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_all_ports() {
        let frame =
            CommandFrame::encode(PowerDirection::Down, PortSelector::All, FrameVariant::Canonical);
        assert_eq!(frame.as_bytes()[0], ALL_PORTS);
        let frame =
            CommandFrame::encode(PowerDirection::Up, PortSelector::All, FrameVariant::Canonical);
        assert_eq!(frame.as_bytes()[0], 0x10 | ALL_PORTS);
    }

    #[test]
    fn test_all_ports_distinct_from_single_ports() {
        for port in 1..=PORT_COUNT {
            for direction in [PowerDirection::Up, PowerDirection::Down] {
                let single = CommandFrame::encode(
                    direction,
                    PortSelector::Port(port),
                    FrameVariant::Canonical,
                );
                let all =
                    CommandFrame::encode(direction, PortSelector::All, FrameVariant::Canonical);
                assert_ne!(single.as_bytes()[0], all.as_bytes()[0]);
            }
        }
    }

    #[test]
    fn test_encode_mirror_byte_variant() {
        let frame = CommandFrame::encode(
            PowerDirection::Up,
            PortSelector::Port(2),
            FrameVariant::MirrorByte,
        );
        assert_eq!(frame.as_bytes(), &[0x12, 0x12, 0, 0, 0, 0]);
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!("a".parse::<PortSelector>().unwrap(), PortSelector::All);
        assert_eq!("2".parse::<PortSelector>().unwrap(), PortSelector::Port(2));
        assert_eq!(
            "0".parse::<PortSelector>().unwrap_err().kind(),
            ErrorKind::InvalidArg
        );
        assert_eq!(
            format!("{}", PORT_COUNT + 1)
                .parse::<PortSelector>()
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArg
        );
        assert_eq!(
            "bogus".parse::<PortSelector>().unwrap_err().kind(),
            ErrorKind::InvalidArg
        );
    }

    #[test]
    fn test_validate_response_short_read() {
        assert!(validate_response(COMMAND_LEN).is_ok());
        let err = validate_response(3).unwrap_err();
        match err.kind() {
            ErrorKind::ShortRead(arg) => {
                assert_eq!(*arg.expected(), COMMAND_LEN);
                assert_eq!(*arg.got(), 3);
            }
            k => panic!("expected ShortRead, got {:?}", k),
        }
    }
}
