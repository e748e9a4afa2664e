//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Profile used when none is given
pub const DEFAULT_PROFILE: &str = "mg84fl54b";

/// Parse a USB id written in hex, with or without a `0x` prefix
fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
}

/// Generate dynamic help text for the target argument
fn target_help() -> String {
    format!(
        "Target to flash [available: {}]",
        hexflash_target::target_names_short()
    )
}

#[derive(Parser)]
#[command(name = "hexflash")]
#[command(author, version, about = "Intel HEX firmware loader and ISP uploader", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a device profile file or directory (contains .ron files)
    /// Defaults to looking in ./profiles/ and /usr/share/hexflash/profiles/
    #[arg(long, global = true)]
    pub device_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load an Intel HEX file and upload it to a device
    Flash {
        /// Intel HEX file
        file: PathBuf,

        /// Target to flash
        #[arg(short, long, default_value = "usb", help = target_help())]
        target: String,

        /// Device profile (capacity and USB ids)
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// Load an Intel HEX file and print the image as a hexdump
    Dump {
        /// Intel HEX file
        file: PathBuf,

        /// Device profile (capacity)
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// Load an Intel HEX file and report the image size
    Check {
        /// Intel HEX file
        file: PathBuf,

        /// Device profile (capacity)
        #[arg(short, long, default_value = DEFAULT_PROFILE)]
        profile: String,
    },

    /// List available targets
    ListTargets,

    /// List known device profiles
    ListProfiles,

    /// List connected USB devices
    ListDevices {
        /// Only show devices with this vendor id (hex)
        #[arg(long, value_parser = parse_hex_u16)]
        vid: Option<u16>,
    },
}
