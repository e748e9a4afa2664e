//! USB device discovery and the `UsbTarget` implementation
//!
//! A device is located by its vendor id and the product id it enumerates
//! with in the requested mode. Exactly one device must match; with several
//! identical boards connected there is no safe way to pick one.

use hexflash_core::error::{Error as CoreError, Result as CoreResult};
use hexflash_core::profile::UsbIds;
use hexflash_core::target::{check_image_fits, DeviceMode, FirmwareTarget};
use maybe_async::maybe_async;
use nusb::MaybeFuture;

use crate::error::{Result, UsbError};

/// Interface claimed on the device
const INTERFACE: u8 = 0;

/// Information about a connected USB device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDeviceInfo {
    /// USB bus identifier
    pub bus: String,
    /// USB device address
    pub address: u8,
    /// USB vendor id
    pub vendor: u16,
    /// USB product id
    pub product: u16,
    /// Product string, if the device reports one
    pub product_name: Option<String>,
}

impl std::fmt::Display for UsbDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} at bus {} address {}",
            self.vendor, self.product, self.bus, self.address
        )?;
        if let Some(name) = &self.product_name {
            write!(f, " ({})", name)?;
        }
        Ok(())
    }
}

/// List connected USB devices, optionally only those of one vendor
pub fn list_devices(vendor: Option<u16>) -> Result<Vec<UsbDeviceInfo>> {
    let devices = nusb::list_devices()
        .wait()
        .map_err(UsbError::EnumerationFailed)?
        .filter(|d| vendor.map_or(true, |v| d.vendor_id() == v))
        .map(|d| UsbDeviceInfo {
            bus: d.bus_id().to_string(),
            address: d.device_address(),
            vendor: d.vendor_id(),
            product: d.product_id(),
            product_name: d.product_string().map(str::to_string),
        })
        .collect();

    Ok(devices)
}

/// Pick the single device out of the matches for `vendor`/`product`
fn select_one<T>(mut matches: Vec<T>, vendor: u16, product: u16) -> Result<T> {
    match matches.len() {
        0 => Err(UsbError::DeviceNotFound { vendor, product }),
        1 => Ok(matches.remove(0)),
        count => Err(UsbError::MultipleDevices {
            vendor,
            product,
            count,
        }),
    }
}

/// Find the one connected device with the given ids
pub fn find_device(vendor: u16, product: u16) -> Result<nusb::DeviceInfo> {
    let matches: Vec<_> = nusb::list_devices()
        .wait()
        .map_err(UsbError::EnumerationFailed)?
        .filter(|d| d.vendor_id() == vendor && d.product_id() == product)
        .collect();

    select_one(matches, vendor, product)
}

/// Firmware target reached over USB
///
/// Discovery and interface claiming are generic. The commands that switch a
/// device between application and ISP mode, and the transfer protocol
/// itself, are device specific and not implemented: a device must already
/// be in ISP mode, and [`FirmwareTarget::upload`] reports
/// [`CoreError::TransferUnsupported`] instead of pretending to succeed.
pub struct UsbTarget {
    /// Claimed interface (kept alive to hold the device claim)
    _interface: nusb::Interface,
    info: UsbDeviceInfo,
    mode: DeviceMode,
    capacity: usize,
}

impl UsbTarget {
    /// Find and open the device with `ids` in `mode`
    pub fn open(ids: &UsbIds, mode: DeviceMode, capacity: usize) -> Result<Self> {
        let product = ids.product_for(mode);
        let device_info = find_device(ids.vendor, product)?;

        log::info!(
            "Opening {:04x}:{:04x} ({} mode) at bus {} address {}",
            ids.vendor,
            product,
            mode,
            device_info.bus_id(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(UsbError::OpenFailed)?;

        let interface = device
            .claim_interface(INTERFACE)
            .wait()
            .map_err(UsbError::ClaimFailed)?;

        let info = UsbDeviceInfo {
            bus: device_info.bus_id().to_string(),
            address: device_info.device_address(),
            vendor: device_info.vendor_id(),
            product: device_info.product_id(),
            product_name: device_info.product_string().map(str::to_string),
        };
        log::debug!("Claimed interface {} on {}", INTERFACE, info);

        Ok(Self {
            _interface: interface,
            info,
            mode,
            capacity,
        })
    }

    /// The opened device
    pub fn info(&self) -> &UsbDeviceInfo {
        &self.info
    }

    /// Mode the device was opened in
    pub fn mode(&self) -> DeviceMode {
        self.mode
    }
}

#[maybe_async]
impl FirmwareTarget for UsbTarget {
    fn name(&self) -> &str {
        "usb"
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    async fn enter_programming_mode(&mut self) -> CoreResult<()> {
        if self.mode == DeviceMode::Isp {
            log::debug!("{} already in ISP mode", self.info);
            return Ok(());
        }
        log::error!(
            "No mode switch command known for {}; put it in ISP mode and use mode=isp",
            self.info
        );
        Err(CoreError::ModeSwitchFailed)
    }

    async fn leave_programming_mode(&mut self) -> CoreResult<()> {
        log::debug!("Leaving {} in {} mode", self.info, self.mode);
        Ok(())
    }

    async fn upload(&mut self, image: &[u8]) -> CoreResult<()> {
        check_image_fits(image.len(), self.capacity)?;
        log::error!(
            "No transfer protocol known for {}; {} byte image not sent",
            self.info,
            image.len()
        );
        Err(CoreError::TransferUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_one() {
        assert_eq!(select_one(vec!["a"], 1, 2).unwrap(), "a");
    }

    #[test]
    fn test_select_none() {
        let err = select_one(Vec::<u8>::new(), 0x1234, 0x0002).unwrap_err();
        assert!(matches!(
            err,
            UsbError::DeviceNotFound {
                vendor: 0x1234,
                product: 0x0002
            }
        ));
        assert_eq!(err.to_string(), "No device found (VID:1234 PID:0002)");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_select_many() {
        let err = select_one(vec![1, 2, 3], 0x1234, 0x0002).unwrap_err();
        assert!(matches!(err, UsbError::MultipleDevices { count: 3, .. }));
    }

    #[test]
    fn test_device_info_display() {
        let info = UsbDeviceInfo {
            bus: "1".to_string(),
            address: 7,
            vendor: 0x1234,
            product: 0x0002,
            product_name: Some("ISP".to_string()),
        };
        assert_eq!(info.to_string(), "1234:0002 at bus 1 address 7 (ISP)");
    }
}
