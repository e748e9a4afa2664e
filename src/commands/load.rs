//! Loading the image and the check command

use hexflash_core::ihex::FirmwareImage;
use hexflash_core::profile::DeviceProfile;
use std::path::Path;

/// Load an Intel HEX file into a buffer sized for `profile`
///
/// Nothing past this point sees an image that failed to load.
pub fn load_image(
    path: &Path,
    profile: &DeviceProfile,
) -> Result<FirmwareImage, Box<dyn std::error::Error>> {
    log::debug!(
        "Loading {} into a {} byte buffer ({})",
        path.display(),
        profile.capacity,
        profile.name
    );

    let image = FirmwareImage::from_file(path, profile.capacity)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    log::info!(
        "Loaded {} bytes from {} ({} bytes capacity)",
        image.len(),
        path.display(),
        image.capacity()
    );
    Ok(image)
}

/// Load a file and report its used length
pub fn run_check(path: &Path, profile: &DeviceProfile) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(path, profile)?;

    println!(
        "{}: OK, {} bytes used of {} ({:.1}%)",
        path.display(),
        image.len(),
        image.capacity(),
        usage_percent(image.len(), image.capacity())
    );
    Ok(())
}

fn usage_percent(used: usize, capacity: usize) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    used as f64 * 100.0 / capacity as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hexflash-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_image() {
        let path = write_temp("ok.hex", ":0300300002337A1E\n:00000001FF\n");
        let image = load_image(&path, &DeviceProfile::mg84fl54b()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(image.len(), 0x33);
        assert_eq!(&image.data()[0x30..], &[0x02, 0x33, 0x7A]);
    }

    #[test]
    fn test_load_image_error_names_file_and_line() {
        let path = write_temp("bad.hex", ":0300300002337A1E\n:010000000000\n");
        let err = load_image(&path, &DeviceProfile::mg84fl54b()).unwrap_err();
        fs::remove_file(&path).unwrap();

        let msg = err.to_string();
        assert!(msg.starts_with(&path.display().to_string()));
        assert!(msg.ends_with("(line 2)"));
    }

    #[test]
    fn test_usage_percent() {
        assert_eq!(usage_percent(0, 0), 0.0);
        assert_eq!(usage_percent(8192, 16384), 50.0);
    }
}
