//! Firmware target selection and the flashing sequence
//!
//! The CLI only talks to this crate: it names a target with a string such
//! as `dummy` or `usb:vid=0e6a,isp_pid=0301`, gets a [`TargetHandle`] back
//! and hands it the loaded image.
//!
//! ```text
//!   CLI ──► open_target("usb:...", &profile) ──► TargetHandle
//!                                                  │
//!                      ┌───────────────────────────┴──────┐
//!                      ▼                                  ▼
//!               hexflash-dummy                      hexflash-usb
//!            (in-memory device)                (nusb device discovery)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hexflash_core::profile::DeviceProfile;
//! use hexflash_target::open_target;
//!
//! let profile = DeviceProfile::mg84fl54b();
//! let mut handle = open_target("dummy", &profile)?;
//! handle.flash(&image)?;
//! ```

mod handle;
mod registry;

pub use handle::TargetHandle;
pub use registry::{
    available_targets, open_target, parse_target_params, target_names_short, TargetInfo,
    TargetParams,
};

// Re-export core types the CLI needs
pub use hexflash_core::target::FirmwareTarget;
