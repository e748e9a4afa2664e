//! Device profile types

use alloc::string::{String, ToString};

use crate::ihex::DEFAULT_CAPACITY;
use crate::target::DeviceMode;

/// USB identifiers of a device in both of its modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbIds {
    /// USB vendor id, shared by both modes
    pub vendor: u16,
    /// Product id while running application firmware
    pub application_product: u16,
    /// Product id while in ISP mode
    pub isp_product: u16,
}

impl UsbIds {
    /// Product id the device enumerates with in `mode`
    pub fn product_for(&self, mode: DeviceMode) -> u16 {
        match mode {
            DeviceMode::Application => self.application_product,
            DeviceMode::Isp => self.isp_product,
        }
    }
}

/// A programmable device: how much memory it has and how to find it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Profile name (e.g., "mg84fl54b")
    pub name: String,
    /// Programmable memory in bytes; also the image buffer capacity
    pub capacity: usize,
    /// USB identifiers, if known
    pub usb: Option<UsbIds>,
}

impl DeviceProfile {
    /// Megawin MG84FL54B with its 16 KiB of ISP/IAP flash
    ///
    /// USB ids are board specific and come from a profile file or the
    /// target parameters.
    pub fn mg84fl54b() -> Self {
        Self {
            name: "mg84fl54b".to_string(),
            capacity: DEFAULT_CAPACITY,
            usb: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_for_mode() {
        let ids = UsbIds {
            vendor: 0x1234,
            application_product: 0x0001,
            isp_product: 0x0002,
        };
        assert_eq!(ids.product_for(DeviceMode::Application), 0x0001);
        assert_eq!(ids.product_for(DeviceMode::Isp), 0x0002);
    }

    #[test]
    fn test_builtin_profile() {
        let profile = DeviceProfile::mg84fl54b();
        assert_eq!(profile.capacity, 16384);
        assert!(profile.usb.is_none());
    }
}
