//! CLI command implementations
//!
//! Every command that takes a file loads it completely first. A target is
//! only opened by `flash`, and only after the load succeeded.

mod dump;
mod flash;
mod list;
mod load;

pub use dump::run_dump;
pub use flash::run_flash;
#[cfg(feature = "usb")]
pub use list::list_devices;
pub use list::{list_profiles, list_targets};
pub use load::run_check;
