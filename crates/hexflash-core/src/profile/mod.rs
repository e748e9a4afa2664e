//! Device profiles
//!
//! A profile names a programmable device, its memory capacity (which sizes
//! the image buffer) and the USB ids it enumerates with. The built-in
//! profile covers the MG84FL54B; more can be loaded from RON files.

mod types;

#[cfg(feature = "std")]
mod database;

pub use types::{DeviceProfile, UsbIds};

#[cfg(feature = "std")]
pub use database::{ProfileDatabase, ProfileDbError, Size};
