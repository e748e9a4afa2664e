//! TargetHandle - owns an opened firmware target

use hexflash_core::target::FirmwareTarget;

/// An opened firmware target
///
/// The CLI works only with this type and never needs to know whether the
/// image goes to a USB device or to the in-memory dummy.
pub struct TargetHandle {
    /// The underlying target (type-erased, owned)
    target: Box<dyn FirmwareTarget>,
}

impl TargetHandle {
    pub(crate) fn new(target: Box<dyn FirmwareTarget>) -> Self {
        Self { target }
    }

    /// Name of the target
    pub fn name(&self) -> &str {
        self.target.name()
    }

    /// Programmable memory size in bytes
    pub fn capacity(&self) -> usize {
        self.target.capacity()
    }

    /// Send a loaded image to the device
    ///
    /// Runs enter-programming-mode, upload, leave-programming-mode. Once the
    /// device is in programming mode, leaving it is attempted even when the
    /// upload fails; the upload error is the one returned.
    pub fn flash(&mut self, image: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        log::debug!("Entering programming mode on {}", self.name());
        self.target.enter_programming_mode()?;

        log::info!("Uploading {} bytes to {}", image.len(), self.name());
        let uploaded = self.target.upload(image);
        let left = self.target.leave_programming_mode();

        match (uploaded, left) {
            (Err(e), Err(leave_err)) => {
                log::warn!("Failed to leave programming mode: {}", leave_err);
                Err(e.into())
            }
            (Err(e), Ok(())) => Err(e.into()),
            (Ok(()), left) => left.map_err(Into::into),
        }
    }
}
