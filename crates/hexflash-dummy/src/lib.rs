//! hexflash-dummy - In-memory firmware target for testing
//!
//! This crate provides a dummy target that emulates a device's programmable
//! memory in RAM. It's useful for dry runs and for testing the flashing
//! sequence without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::string::{String, ToString};
#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "alloc")]
use hexflash_core::error::{Error, Result};
#[cfg(feature = "alloc")]
use hexflash_core::ihex::DEFAULT_CAPACITY;
#[cfg(feature = "alloc")]
use hexflash_core::target::{check_image_fits, DeviceMode, FirmwareTarget};
#[cfg(feature = "alloc")]
use maybe_async::maybe_async;

/// Value of erased memory
pub const ERASED: u8 = 0xFF;

/// Configuration for the dummy target
#[cfg(feature = "alloc")]
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Name reported by the target
    pub name: String,
    /// Programmable memory size in bytes
    pub capacity: usize,
    /// Make every upload fail, to exercise error paths
    pub fail_upload: bool,
}

#[cfg(feature = "alloc")]
impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            name: "dummy".to_string(),
            capacity: DEFAULT_CAPACITY,
            fail_upload: false,
        }
    }
}

/// Dummy firmware target
///
/// Starts in application mode with erased memory. Uploads are only
/// accepted in ISP mode; each upload erases the whole memory before
/// writing the image.
#[cfg(feature = "alloc")]
#[derive(Debug)]
pub struct DummyTarget {
    config: DummyConfig,
    memory: Vec<u8>,
    mode: DeviceMode,
    uploads: usize,
    mode_switches: usize,
}

#[cfg(feature = "alloc")]
impl DummyTarget {
    /// Create a new dummy target with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let memory = vec![ERASED; config.capacity];
        Self {
            config,
            memory,
            mode: DeviceMode::Application,
            uploads: 0,
            mode_switches: 0,
        }
    }

    /// Create a new dummy target with default configuration (16 KiB)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy target of the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(DummyConfig {
            capacity,
            ..DummyConfig::default()
        })
    }

    /// Get a reference to the emulated memory
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Current device mode
    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    /// Number of completed uploads
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Number of mode changes performed
    pub fn mode_switches(&self) -> usize {
        self.mode_switches
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    fn switch_to(&mut self, mode: DeviceMode) {
        if self.mode != mode {
            log::debug!("dummy: switching to {} mode", mode);
            self.mode = mode;
            self.mode_switches += 1;
        }
    }
}

#[cfg(feature = "alloc")]
#[maybe_async]
impl FirmwareTarget for DummyTarget {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capacity(&self) -> usize {
        self.config.capacity
    }

    async fn enter_programming_mode(&mut self) -> Result<()> {
        self.switch_to(DeviceMode::Isp);
        Ok(())
    }

    async fn leave_programming_mode(&mut self) -> Result<()> {
        self.switch_to(DeviceMode::Application);
        Ok(())
    }

    async fn upload(&mut self, image: &[u8]) -> Result<()> {
        check_image_fits(image.len(), self.config.capacity)?;

        if self.mode != DeviceMode::Isp {
            log::error!("dummy: upload attempted in {} mode", self.mode);
            return Err(Error::TransferFailed);
        }
        if self.config.fail_upload {
            return Err(Error::TransferFailed);
        }

        self.memory.fill(ERASED);
        self.memory[..image.len()].copy_from_slice(image);
        self.uploads += 1;
        log::info!("dummy: received {} byte image", image.len());
        Ok(())
    }
}

#[cfg(all(test, feature = "is_sync"))]
mod tests {
    use super::*;

    #[test]
    fn test_upload_in_isp_mode() {
        let mut target = DummyTarget::with_capacity(64);
        target.enter_programming_mode().unwrap();
        assert_eq!(target.mode(), DeviceMode::Isp);

        target.upload(&[1, 2, 3, 4]).unwrap();
        assert_eq!(&target.memory()[..4], &[1, 2, 3, 4]);
        assert!(target.memory()[4..].iter().all(|&b| b == ERASED));
        assert_eq!(target.uploads(), 1);

        target.leave_programming_mode().unwrap();
        assert_eq!(target.mode(), DeviceMode::Application);
        assert_eq!(target.mode_switches(), 2);
    }

    #[test]
    fn test_upload_requires_isp_mode() {
        let mut target = DummyTarget::new_default();
        assert_eq!(target.upload(&[0xAA]), Err(Error::TransferFailed));
        assert_eq!(target.uploads(), 0);
        assert!(target.memory().iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_upload_erases_previous_image() {
        let mut target = DummyTarget::with_capacity(8);
        target.enter_programming_mode().unwrap();
        target.upload(&[0; 8]).unwrap();
        target.upload(&[7, 7]).unwrap();
        assert_eq!(&target.memory()[..2], &[7, 7]);
        assert!(target.memory()[2..].iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_image_too_large() {
        let mut target = DummyTarget::with_capacity(4);
        target.enter_programming_mode().unwrap();
        assert_eq!(
            target.upload(&[0; 5]),
            Err(Error::ImageTooLarge {
                size: 5,
                capacity: 4
            })
        );
    }

    #[test]
    fn test_failing_upload() {
        let mut target = DummyTarget::new(DummyConfig {
            fail_upload: true,
            ..DummyConfig::default()
        });
        target.enter_programming_mode().unwrap();
        assert_eq!(target.upload(&[1]), Err(Error::TransferFailed));
        assert!(target.memory().iter().all(|&b| b == ERASED));
    }

    #[test]
    fn test_repeated_mode_switch_is_noop() {
        let mut target = DummyTarget::new_default();
        target.enter_programming_mode().unwrap();
        target.enter_programming_mode().unwrap();
        assert_eq!(target.mode_switches(), 1);
    }
}
