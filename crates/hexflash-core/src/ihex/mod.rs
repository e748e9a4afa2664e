//! Intel HEX image loading
//!
//! Only the 8-bit addressing subset of the format is accepted: data records
//! (type 0) and the end-of-file record (type 1). A load runs each line
//! through three stages and stops at the first error:
//!
//! 1. [`Record::parse`] checks the shape of the line and decodes its fields
//! 2. [`Record::validate`] checks the record checksum
//! 3. [`ImageBuffer::apply`] writes data into the image within its capacity
//!
//! [`Loader`] sequences these stages and enforces that exactly one
//! end-of-file record ends the input.
//!
//! # Example
//!
//! ```
//! use hexflash_core::ihex::load_str;
//!
//! let mut image = [0u8; 16384];
//! let used = load_str(":0300300002337A1E\n:00000001FF\n", &mut image).unwrap();
//! assert_eq!(used, 0x33);
//! assert_eq!(&image[0x30..0x33], &[0x02, 0x33, 0x7A]);
//! ```

mod image;
mod loader;
mod record;

#[cfg(feature = "std")]
mod reader;

pub use image::{ImageBuffer, Outcome};
pub use loader::{load_bytes, load_str, LoadState, Loader};
pub use record::{Record, RecordType, MAX_DATA_LEN, MAX_LINE_LEN, MIN_LINE_LEN, START_CODE};

#[cfg(feature = "std")]
pub use reader::{load, load_file, FirmwareImage, LoadError};

/// Default image capacity: the 16 KiB ISP/IAP flash of the MG84FL54B
pub const DEFAULT_CAPACITY: usize = 16 * 1024;

/// Largest image an 8-bit addressing Intel HEX file can describe
pub const MAX_CAPACITY: usize = 0x1_0000;
