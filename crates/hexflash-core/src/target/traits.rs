//! Target trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async
//! - With the `is_sync` feature, traits become synchronous

use maybe_async::maybe_async;

use crate::error::Result;

/// A device that accepts a firmware image (sync or async depending on
/// `is_sync` feature)
///
/// The flashing sequence is `enter_programming_mode`, `upload`,
/// `leave_programming_mode`. Callers only reach it after the image loaded
/// without error; a target never sees a partially parsed image.
///
/// ## Example
///
/// ```ignore
/// #[maybe_async]
/// impl FirmwareTarget for MyBoard {
///     fn name(&self) -> &str { "my-board" }
///     fn capacity(&self) -> usize { 16 * 1024 }
///
///     async fn upload(&mut self, image: &[u8]) -> Result<()> {
///         check_image_fits(image.len(), self.capacity())?;
///         self.write_pages(image).await
///     }
/// }
/// ```
#[maybe_async(AFIT)]
pub trait FirmwareTarget {
    /// Short human-readable name of the target
    fn name(&self) -> &str;

    /// Size of the programmable memory in bytes
    fn capacity(&self) -> usize;

    /// Switch the device into its programming mode
    ///
    /// Targets that are always ready to accept an image keep the default.
    async fn enter_programming_mode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Switch the device back to its application firmware
    async fn leave_programming_mode(&mut self) -> Result<()> {
        Ok(())
    }

    /// Transfer the image, `image.len()` is the used length of the load
    ///
    /// Fails with [`Error::ImageTooLarge`](crate::error::Error::ImageTooLarge)
    /// if the image is larger than [`capacity`](Self::capacity).
    async fn upload(&mut self, image: &[u8]) -> Result<()>;
}
