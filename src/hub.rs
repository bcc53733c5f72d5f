//! Hub discovery, ordinal selection and the claimed command session.
//!
//! Matching hubs are addressed by a 1-based ordinal assigned in enumeration
//! order. The bus gives us nothing better in the control path: replugging
//! hubs can change which physical device is ordinal 1, so the ordinal is an
//! explicit, documented limitation rather than a stable identity.
use std::fmt;
use std::time::Duration;

use rusb::UsbContext;

use crate::error::{Error, ErrorKind, Result, TransferDirection};
use crate::protocol::{
    self, CommandFrame, FrameVariant, PortSelector, PowerDirection, COMMAND_LEN, ENDPOINT_IN,
    ENDPOINT_OUT, TRANSFER_TIMEOUT,
};

/// Interface the command endpoints live on
const COMMAND_INTERFACE: u8 = 0;
/// Configuration the hub must be in to accept commands
const COMMAND_CONFIGURATION: u8 = 1;

/// Set log level for rusb on the context this invocation owns
///
/// Scoped to the passed context rather than the library-wide default so no
/// global libusb state is initialised behind the invocation's back.
pub fn set_rusb_log_level<T: UsbContext>(ctx: &mut T, debug: u8) {
    let log_level = match debug {
        0 => rusb::LogLevel::None,
        1 => rusb::LogLevel::Warning,
        2 => rusb::LogLevel::Info,
        _ => rusb::LogLevel::Debug,
    };

    ctx.set_log_level(log_level);
}

/// Identity and descriptor strings of one matched hub, gathered for listing
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct HubSummary {
    /// 1-based position within the matching devices in enumeration order
    pub ordinal: usize,
    /// Vendor ID from the device descriptor
    pub vendor_id: u16,
    /// Product ID from the device descriptor
    pub product_id: u16,
    /// Manufacturer string descriptor
    pub manufacturer: String,
    /// Product string descriptor
    pub product: String,
    /// Serial number string descriptor
    pub serial: String,
}

impl fmt::Display for HubSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {:04x}:{:04x} {}/{}/{}",
            self.ordinal, self.vendor_id, self.product_id, self.manufacturer, self.product, self.serial
        )
    }
}

/// Handle operations the command session needs; seam for testing the session
/// state machine without hardware
pub trait HubHandle {
    /// Detach the kernel driver from `iface`
    fn detach_kernel_driver(&mut self, iface: u8) -> std::result::Result<(), rusb::Error>;
    /// Activate configuration `config`
    fn set_active_configuration(&mut self, config: u8) -> std::result::Result<(), rusb::Error>;
    /// Claim `iface` for exclusive use
    fn claim_interface(&mut self, iface: u8) -> std::result::Result<(), rusb::Error>;
    /// Release a previously claimed `iface`
    fn release_interface(&mut self, iface: u8) -> std::result::Result<(), rusb::Error>;
    /// Reset the device
    fn reset(&mut self) -> std::result::Result<(), rusb::Error>;
    /// Submit an interrupt OUT transfer, returning bytes written
    fn write_interrupt(
        &self,
        endpoint: u8,
        buf: &[u8],
        timeout: Duration,
    ) -> std::result::Result<usize, rusb::Error>;
    /// Submit an interrupt IN transfer, returning bytes read
    fn read_interrupt(
        &self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, rusb::Error>;
}

impl<T: UsbContext> HubHandle for rusb::DeviceHandle<T> {
    fn detach_kernel_driver(&mut self, iface: u8) -> std::result::Result<(), rusb::Error> {
        rusb::DeviceHandle::detach_kernel_driver(self, iface)
    }

    fn set_active_configuration(&mut self, config: u8) -> std::result::Result<(), rusb::Error> {
        rusb::DeviceHandle::set_active_configuration(self, config)
    }

    fn claim_interface(&mut self, iface: u8) -> std::result::Result<(), rusb::Error> {
        rusb::DeviceHandle::claim_interface(self, iface)
    }

    fn release_interface(&mut self, iface: u8) -> std::result::Result<(), rusb::Error> {
        rusb::DeviceHandle::release_interface(self, iface)
    }

    fn reset(&mut self) -> std::result::Result<(), rusb::Error> {
        rusb::DeviceHandle::reset(self)
    }

    fn write_interrupt(
        &self,
        endpoint: u8,
        buf: &[u8],
        timeout: Duration,
    ) -> std::result::Result<usize, rusb::Error> {
        rusb::DeviceHandle::write_interrupt(self, endpoint, buf, timeout)
    }

    fn read_interrupt(
        &self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> std::result::Result<usize, rusb::Error> {
        rusb::DeviceHandle::read_interrupt(self, endpoint, buf, timeout)
    }
}

/// All matching hubs on the bus in enumeration order; index + 1 is the
/// ordinal
pub fn find_hubs<T: UsbContext>(ctx: &T) -> Result<Vec<rusb::Device<T>>> {
    let devices = ctx.devices().map_err(|e| {
        Error::new(
            ErrorKind::Enumeration,
            &format!("Failed to enumerate devices: {}", e),
        )
    })?;

    let mut hubs = Vec::new();
    for device in devices.iter() {
        let desc = device.device_descriptor().map_err(|e| {
            Error::new(
                ErrorKind::Enumeration,
                &format!("Failed to read device descriptor: {}", e),
            )
        })?;
        if desc.vendor_id() == protocol::VENDOR_ID && desc.product_id() == protocol::PRODUCT_ID {
            hubs.push(device);
        }
    }

    log::debug!("found {} matching hub(s)", hubs.len());
    Ok(hubs)
}

/// Pick the hub with 1-based `ordinal` from the enumeration ordered matches
///
/// Ordinal 0, or one beyond the number of matches, is a [`ErrorKind::NotFound`].
fn select_ordinal<T>(hubs: Vec<T>, ordinal: usize) -> Result<T> {
    if ordinal == 0 || ordinal > hubs.len() {
        return Err(Error::new(
            ErrorKind::NotFound,
            &format!("No hub with ID {} found", ordinal),
        ));
    }
    hubs.into_iter().nth(ordinal - 1).ok_or_else(|| {
        Error::new(
            ErrorKind::NotFound,
            &format!("No hub with ID {} found", ordinal),
        )
    })
}

fn read_string<T: UsbContext>(
    handle: &rusb::DeviceHandle<T>,
    language: rusb::Language,
    index: Option<u8>,
    what: &str,
) -> Result<String> {
    let index = index.ok_or_else(|| {
        Error::new(
            ErrorKind::Query,
            &format!("Device reports no {} string", what),
        )
    })?;
    handle
        .read_string_descriptor(language, index, TRANSFER_TIMEOUT)
        .map(|s| s.trim().trim_end_matches('\0').to_string())
        .map_err(|e| {
            Error::new(
                ErrorKind::Query,
                &format!("Unable to query {} string: {}", what, e),
            )
        })
}

/// Open each matching hub in turn and gather its descriptor strings
///
/// Hubs are only opened transiently for the query; the handle is dropped
/// before moving to the next match. A failed string read aborts the whole
/// listing rather than skipping the device.
pub fn list_hubs<T: UsbContext>(ctx: &T) -> Result<Vec<HubSummary>> {
    let mut summaries = Vec::new();

    for (i, device) in find_hubs(ctx)?.into_iter().enumerate() {
        let desc = device.device_descriptor().map_err(|e| {
            Error::new(
                ErrorKind::Enumeration,
                &format!("Failed to read device descriptor: {}", e),
            )
        })?;
        let handle = device.open().map_err(|e| {
            Error::new(ErrorKind::Opening, &format!("Unable to open device: {}", e))
        })?;
        let language = handle
            .read_languages(TRANSFER_TIMEOUT)
            .ok()
            .and_then(|languages| languages.first().copied())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::Query,
                    "Unable to query device: no string descriptor languages",
                )
            })?;

        summaries.push(HubSummary {
            ordinal: i + 1,
            vendor_id: desc.vendor_id(),
            product_id: desc.product_id(),
            manufacturer: read_string(
                &handle,
                language,
                desc.manufacturer_string_index(),
                "manufacturer",
            )?,
            product: read_string(&handle, language, desc.product_string_index(), "product")?,
            serial: read_string(
                &handle,
                language,
                desc.serial_number_string_index(),
                "serial",
            )?,
        });
    }

    Ok(summaries)
}

/// Opened hub handle that resets the device as it goes out of scope
///
/// An opened handle gets its reset on every exit path, whether or not the
/// session got as far as claiming the interface.
struct OpenedHandle<H: HubHandle>(H);

impl<H: HubHandle> Drop for OpenedHandle<H> {
    fn drop(&mut self) {
        if let Err(e) = self.0.reset() {
            log::warn!("Failed to reset device: {}", e);
        }
    }
}

/// A configured, claimed hub handle ready for command exchange
///
/// Constructed only once the interface claim has succeeded, so dropping a
/// [`Session`] always runs the full teardown: release the interface, then
/// the [`OpenedHandle`] reset as the handle closes. Earlier failures during
/// [`Session::configure`] drop the guard alone, so the handle is still
/// reset and closed with no claim to undo.
pub struct Session<H: HubHandle> {
    handle: OpenedHandle<H>,
    variant: FrameVariant,
}

impl<H: HubHandle> Session<H> {
    /// Bring an open hub handle to the state where commands can be exchanged
    ///
    /// The kernel owns no driver for this interface between runs, so a
    /// driver-not-attached result from the detach step counts as success.
    pub fn configure(handle: H, variant: FrameVariant) -> Result<Session<H>> {
        let mut handle = OpenedHandle(handle);

        match handle.0.detach_kernel_driver(COMMAND_INTERFACE) {
            Ok(()) | Err(rusb::Error::NotFound) => (),
            Err(e) => {
                return Err(Error::new(
                    ErrorKind::Detach,
                    &format!("Failed to detach kernel driver: {}", e),
                ))
            }
        }

        handle
            .0
            .set_active_configuration(COMMAND_CONFIGURATION)
            .map_err(|e| {
                Error::new(
                    ErrorKind::Configuration,
                    &format!("Failed to set configuration: {}", e),
                )
            })?;

        handle.0.claim_interface(COMMAND_INTERFACE).map_err(|e| {
            Error::new(ErrorKind::Claim, &format!("Failed to claim interface: {}", e))
        })?;

        Ok(Session { handle, variant })
    }

    /// Send one power command and wait for the hub's acknowledgement
    ///
    /// The OUT transfer completes before the IN transfer is issued; each
    /// carries its own fixed timeout and a single timeout is terminal.
    pub fn send(&mut self, direction: PowerDirection, selector: PortSelector) -> Result<()> {
        let frame = CommandFrame::encode(direction, selector, self.variant);
        self.handle
            .0
            .write_interrupt(ENDPOINT_OUT, frame.as_bytes(), TRANSFER_TIMEOUT)
            .map_err(|e| {
                Error::new(
                    ErrorKind::Transfer(TransferDirection::Out),
                    &format!("Failed to send command: {}", e),
                )
            })?;
        log::debug!("sent command frame {:02x?}", frame.as_bytes());

        let mut response = [0u8; COMMAND_LEN];
        let transferred = self
            .handle
            .0
            .read_interrupt(ENDPOINT_IN, &mut response, TRANSFER_TIMEOUT)
            .map_err(|e| {
                Error::new(
                    ErrorKind::Transfer(TransferDirection::In),
                    &format!("Failed to receive response: {}", e),
                )
            })?;
        log::debug!("received {} byte response {:02x?}", transferred, response);

        protocol::validate_response(transferred)
    }
}

impl<H: HubHandle> Drop for Session<H> {
    fn drop(&mut self) {
        if let Err(e) = self.handle.0.release_interface(COMMAND_INTERFACE) {
            log::warn!("Failed to release interface {}: {}", COMMAND_INTERFACE, e);
        }
        // reset runs in the handle guard's own drop, after the release
    }
}

/// Power `selector` of the hub with 1-based `ordinal` up or down
pub fn power<T: UsbContext>(
    ctx: &T,
    ordinal: usize,
    direction: PowerDirection,
    selector: PortSelector,
    variant: FrameVariant,
) -> Result<()> {
    selector.validate()?;

    let device = select_ordinal(find_hubs(ctx)?, ordinal)?;
    let handle = device
        .open()
        .map_err(|e| Error::new(ErrorKind::Opening, &format!("Failed to open device: {}", e)))?;

    let mut session = Session::configure(handle, variant)?;
    session.send(direction, selector)
}
