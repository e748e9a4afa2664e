//! Firmware target abstraction
//!
//! A target is anything a loaded image can be sent to: a USB device in its
//! ISP (in-system programming) mode, or the in-memory dummy used for dry
//! runs and tests.

mod traits;

pub use traits::FirmwareTarget;

use core::fmt;

use crate::error::{Error, Result};

/// Which firmware a device is currently running
///
/// Devices enumerate with a different product id in each mode, so the mode
/// is also part of how a device is found on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceMode {
    /// Normal application firmware
    Application,
    /// In-system programming loader, accepts new firmware
    #[default]
    Isp,
}

impl DeviceMode {
    /// Parse a mode name (`app`, `application`, `isp`, `boot`)
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("app") || s.eq_ignore_ascii_case("application") {
            Some(Self::Application)
        } else if s.eq_ignore_ascii_case("isp") || s.eq_ignore_ascii_case("boot") {
            Some(Self::Isp)
        } else {
            None
        }
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::Isp => write!(f, "isp"),
        }
    }
}

/// Check that an image of `len` bytes fits a target of `capacity` bytes
pub fn check_image_fits(len: usize, capacity: usize) -> Result<()> {
    if len > capacity {
        return Err(Error::ImageTooLarge {
            size: len,
            capacity,
        });
    }
    Ok(())
}
