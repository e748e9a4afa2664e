//! hexflash-usb - USB target support
//!
//! This crate finds a device on the USB bus by vendor id and the product id
//! of the requested mode, and exposes it as a
//! [`FirmwareTarget`](hexflash_core::target::FirmwareTarget).
//!
//! # Example
//!
//! ```no_run
//! use hexflash_core::profile::UsbIds;
//! use hexflash_core::target::DeviceMode;
//! use hexflash_usb::UsbTarget;
//!
//! let ids = UsbIds { vendor: 0x1234, application_product: 0x0001, isp_product: 0x0002 };
//! let target = UsbTarget::open(&ids, DeviceMode::Isp, 16 * 1024)?;
//! println!("Opened {}", target.info());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "std")]
mod device;
#[cfg(feature = "std")]
mod error;

#[cfg(feature = "std")]
pub use device::{find_device, list_devices, UsbDeviceInfo, UsbTarget};
#[cfg(feature = "std")]
pub use error::{Result, UsbError};
