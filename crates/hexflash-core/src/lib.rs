//! hexflash-core - Core library for Intel HEX firmware flashing
//!
//! This crate loads 8-bit Intel HEX firmware images into a bounded memory
//! image and defines the target abstraction images are flashed through. It
//! is designed to be `no_std` compatible; the loader state machine needs
//! neither an allocator nor I/O.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`): loading
//!   from `BufRead` sources and files, the RON profile database
//! - `alloc` - Enable heap allocation for device profiles
//! - `is_sync` - Compile the target traits as blocking
//!
//! # Example
//!
//! ```ignore
//! use hexflash_core::ihex;
//!
//! let mut image = vec![0u8; ihex::DEFAULT_CAPACITY];
//! match ihex::load_file("firmware.hex", &mut image) {
//!     Ok(len) => println!("Loaded {} bytes", len),
//!     Err(e) => println!("Load failed: {}", e),
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod error;
pub mod ihex;
#[cfg(feature = "alloc")]
pub mod profile;
pub mod target;

pub use error::{Error, LineError, Result};
