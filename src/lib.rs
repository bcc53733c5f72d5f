//! Switch downstream port power on YKUSH switchable USB hubs and list the
//! hubs attached to the system.
//!
//! Hubs are addressed by a 1-based ordinal in bus enumeration order; see
//! [`hub`] for the caveats of ordinal addressing and [`protocol`] for the
//! 6 byte command frames the hub firmware understands.
#![warn(missing_docs)]
use simple_logger::SimpleLogger;

pub mod config;
pub mod error;
pub mod hub;
pub mod protocol;

/// Set ykushctl module and binary log level
pub fn set_log_level(debug: u8) -> crate::error::Result<()> {
    match debug {
        // just use env if not passed
        0 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Error.to_level_filter())
            .env(),
        1 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Info.to_level_filter()),
        2 => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Debug.to_level_filter()),
        _ => SimpleLogger::new()
            .with_utc_timestamps()
            .with_level(log::Level::Trace.to_level_filter()),
    }
    .init()
    .map_err(|e| {
        crate::error::Error::new(
            crate::error::ErrorKind::Other("simple_logger"),
            &format!("Failed to set log level: {}", e),
        )
    })?;

    Ok(())
}
