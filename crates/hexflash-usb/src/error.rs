//! Error types for USB targets

use std::fmt;

/// Result type for USB target operations
pub type Result<T> = std::result::Result<T, UsbError>;

/// Errors that can occur when finding or talking to a USB target
#[derive(Debug)]
pub enum UsbError {
    /// No connected device matches the ids
    DeviceNotFound {
        /// USB vendor id searched for
        vendor: u16,
        /// USB product id searched for
        product: u16,
    },
    /// More than one connected device matches the ids
    MultipleDevices {
        /// USB vendor id searched for
        vendor: u16,
        /// USB product id searched for
        product: u16,
        /// Number of matching devices
        count: usize,
    },
    /// Failed to enumerate devices
    EnumerationFailed(nusb::Error),
    /// Failed to open device
    OpenFailed(nusb::Error),
    /// Failed to claim interface
    ClaimFailed(nusb::Error),
}

impl fmt::Display for UsbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsbError::DeviceNotFound { vendor, product } => {
                write!(f, "No device found (VID:{:04x} PID:{:04x})", vendor, product)
            }
            UsbError::MultipleDevices {
                vendor,
                product,
                count,
            } => write!(
                f,
                "{} devices match VID:{:04x} PID:{:04x}, connect only one",
                count, vendor, product
            ),
            UsbError::EnumerationFailed(e) => write!(f, "Failed to list USB devices: {}", e),
            UsbError::OpenFailed(e) => write!(f, "Failed to open device: {}", e),
            UsbError::ClaimFailed(e) => write!(f, "Failed to claim interface: {}", e),
        }
    }
}

impl std::error::Error for UsbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UsbError::EnumerationFailed(e) | UsbError::OpenFailed(e) | UsbError::ClaimFailed(e) => {
                Some(e)
            }
            UsbError::DeviceNotFound { .. } | UsbError::MultipleDevices { .. } => None,
        }
    }
}
