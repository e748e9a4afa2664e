//! List commands implementation

use hexflash_core::profile::ProfileDatabase;

/// List all targets compiled in
pub fn list_targets() {
    println!("Available targets:");
    println!();
    for target in hexflash_target::available_targets() {
        println!("  {:<8} - {}", target.name, target.description);
    }
}

/// List all known device profiles
pub fn list_profiles(db: &ProfileDatabase) {
    println!("Device profiles:");
    println!();
    println!("{:<16} {:>10} {:>10} {:>10}", "Name", "Capacity", "App ID", "ISP ID");
    println!("{}", "-".repeat(49));

    for profile in db.iter() {
        let (app, isp) = match profile.usb {
            Some(ids) => (
                format!("{:04x}:{:04x}", ids.vendor, ids.application_product),
                format!("{:04x}:{:04x}", ids.vendor, ids.isp_product),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<16} {:>10} {:>10} {:>10}",
            profile.name,
            format_size(profile.capacity),
            app,
            isp
        );
    }
}

/// List connected USB devices
#[cfg(feature = "usb")]
pub fn list_devices(vendor: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let devices = hexflash_usb::list_devices(vendor)?;
    if devices.is_empty() {
        println!("No USB devices found");
        return Ok(());
    }
    for device in devices {
        println!("  {}", device);
    }
    Ok(())
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(16384), "16 KiB");
        assert_eq!(format_size(65536), "64 KiB");
        assert_eq!(format_size(1000), "1000 B");
    }
}
