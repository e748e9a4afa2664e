//! Flash command implementation

use crate::commands::load::load_image;
use hexflash_core::profile::DeviceProfile;
use hexflash_target::open_target;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Load a file and upload it to `target`
///
/// The target is only opened once the whole file has loaded.
pub fn run_flash(
    path: &Path,
    target: &str,
    profile: &DeviceProfile,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(path, profile)?;

    let mut handle = open_target(target, profile)?;
    if image.len() > handle.capacity() {
        return Err(format!(
            "Image is {} bytes but {} only holds {}",
            image.len(),
            handle.name(),
            handle.capacity()
        )
        .into());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Flashing {} bytes to {}", image.len(), handle.name()));
    pb.enable_steady_tick(Duration::from_millis(100));

    match handle.flash(image.data()) {
        Ok(()) => {
            pb.finish_with_message("Flash complete");
            println!(
                "Flashed {} bytes from {} to {}",
                image.len(),
                path.display(),
                handle.name()
            );
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("Flash failed");
            Err(e)
        }
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_flash_to_dummy() {
        let path = std::env::temp_dir().join(format!("hexflash-{}-flash.hex", std::process::id()));
        fs::write(&path, ":0300300002337A1E\n:00000001FF\n").unwrap();

        let result = run_flash(&path, "dummy", &DeviceProfile::mg84fl54b());
        fs::remove_file(&path).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_file_never_opens_target() {
        let path = std::env::temp_dir().join(format!("hexflash-{}-noeof.hex", std::process::id()));
        fs::write(&path, ":0300300002337A1E\n").unwrap();

        // The target name is invalid, so reaching open_target would change the error
        let err = run_flash(&path, "nonexistent", &DeviceProfile::mg84fl54b()).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_failed_upload_is_reported() {
        let path = std::env::temp_dir().join(format!("hexflash-{}-fail.hex", std::process::id()));
        fs::write(&path, ":0300300002337A1E\n:00000001FF\n").unwrap();

        let result = run_flash(&path, "dummy:fail=yes", &DeviceProfile::mg84fl54b());
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
