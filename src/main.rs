//! hexflash - Intel HEX firmware loader and ISP uploader
//!
//! Loads an Intel HEX file (8-bit addressing subset) into an image buffer
//! sized for the device, then hands the image to a firmware target.
//!
//! # Architecture
//!
//! - `hexflash-core` parses and validates records and assembles the image.
//!   Any error aborts the load before a device is contacted.
//! - `hexflash-target` opens targets by name (`dummy`, `usb:...`) and runs
//!   the enter/upload/leave sequence on them.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use hexflash_core::profile::{DeviceProfile, ProfileDatabase};
use std::path::{Path, PathBuf};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db = load_profile_database(cli.device_db.as_deref())
        .map_err(|e| format!("Failed to load device profiles: {}", e))?;

    log::debug!("Loaded {} device profiles", db.len());

    match cli.command {
        Commands::Flash {
            file,
            target,
            profile,
        } => commands::run_flash(&file, &target, find_profile(&db, &profile)?),
        Commands::Dump { file, profile } => commands::run_dump(&file, find_profile(&db, &profile)?),
        Commands::Check { file, profile } => {
            commands::run_check(&file, find_profile(&db, &profile)?)
        }
        Commands::ListTargets => {
            commands::list_targets();
            Ok(())
        }
        Commands::ListProfiles => {
            commands::list_profiles(&db);
            Ok(())
        }
        #[cfg(feature = "usb")]
        Commands::ListDevices { vid } => commands::list_devices(vid),
        #[cfg(not(feature = "usb"))]
        Commands::ListDevices { .. } => Err("USB support not compiled in".into()),
    }
}

fn find_profile<'a>(
    db: &'a ProfileDatabase,
    name: &str,
) -> Result<&'a DeviceProfile, Box<dyn std::error::Error>> {
    db.find(name)
        .ok_or_else(|| format!("Unknown device profile: {} (see list-profiles)", name).into())
}

/// Load device profiles from the specified path or default locations
fn load_profile_database(
    path: Option<&Path>,
) -> Result<ProfileDatabase, Box<dyn std::error::Error>> {
    let mut db = ProfileDatabase::new();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() {
            db.load_dir(path)?;
        } else if path.is_file() {
            db.load_file(path)?;
        } else {
            return Err(format!("Device profile path not found: {}", path.display()).into());
        }
    } else {
        // Try default locations
        let default_paths = [
            PathBuf::from("profiles"),
            PathBuf::from("/usr/share/hexflash/profiles"),
            PathBuf::from("/usr/local/share/hexflash/profiles"),
        ];

        for dir in &default_paths {
            if dir.is_dir() {
                match db.load_dir(dir) {
                    Ok(count) => {
                        log::debug!("Loaded {} profiles from {}", count, dir.display());
                    }
                    Err(e) => {
                        log::warn!("Failed to load profiles from {}: {}", dir.display(), e);
                    }
                }
            }
        }
    }

    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profile_without_db() {
        let db = load_profile_database(None).unwrap();
        let profile = find_profile(&db, cli::DEFAULT_PROFILE).unwrap();
        assert_eq!(profile.capacity, 16384);
    }

    #[test]
    fn test_unknown_profile() {
        let db = ProfileDatabase::new();
        let err = find_profile(&db, "atmega328p").unwrap_err();
        assert!(err.to_string().contains("atmega328p"));
    }

    #[test]
    fn test_missing_db_path() {
        assert!(load_profile_database(Some(Path::new("/nonexistent/hexflash/profiles"))).is_err());
    }

    #[test]
    fn test_cli_parses_flash() {
        let args = ["hexflash", "-v", "flash", "fw.hex", "-t", "dummy"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Flash {
                file,
                target,
                profile,
            } => {
                assert_eq!(file, PathBuf::from("fw.hex"));
                assert_eq!(target, "dummy");
                assert_eq!(profile, cli::DEFAULT_PROFILE);
            }
            _ => panic!("expected flash command"),
        }
    }

    #[test]
    fn test_cli_parses_vid() {
        let cli = Cli::try_parse_from(["hexflash", "list-devices", "--vid", "0x0e6a"]).unwrap();
        assert!(matches!(cli.command, Commands::ListDevices { vid: Some(0x0e6a) }));
    }
}
