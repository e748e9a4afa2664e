//! Device profile database for runtime loading and lookup
//!
//! Profiles are read from RON files of the form:
//!
//! ```ron
//! (
//!     profiles: [
//!         (
//!             name: "my-board",
//!             capacity: KiB(16),
//!             usb: Some((vendor: 0x1234, application: 0x0001, isp: 0x0002)),
//!         ),
//!     ],
//! )
//! ```

use alloc::{format, string::String, vec::Vec};
use std::fs;
use std::io;
use std::path::Path;

use super::types::{DeviceProfile, UsbIds};
use crate::ihex::MAX_CAPACITY;

/// Error type for profile database operations
#[derive(Debug)]
pub enum ProfileDbError {
    /// I/O error reading files
    Io(io::Error),
    /// RON parsing error
    Parse(ron::error::SpannedError),
    /// Validation error
    Validation(String),
}

impl From<io::Error> for ProfileDbError {
    fn from(e: io::Error) -> Self {
        ProfileDbError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ProfileDbError {
    fn from(e: ron::error::SpannedError) -> Self {
        ProfileDbError::Parse(e)
    }
}

impl std::fmt::Display for ProfileDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileDbError::Io(e) => write!(f, "I/O error: {}", e),
            ProfileDbError::Parse(e) => write!(f, "Parse error: {}", e),
            ProfileDbError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ProfileDbError {}

// ============================================================================
// RON deserialization types (intermediate format)
// ============================================================================

/// Size specification with human-readable units (for RON parsing)
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub enum Size {
    /// Size in bytes
    B(u32),
    /// Size in kibibytes (1024 bytes)
    KiB(u32),
}

impl Size {
    /// Convert to bytes, `None` if the size does not fit in `usize`
    pub fn to_bytes(self) -> Option<usize> {
        match self {
            Size::B(n) => usize::try_from(n).ok(),
            Size::KiB(n) => usize::try_from(n).ok()?.checked_mul(1024),
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Deserialize)]
struct UsbDef {
    vendor: u16,
    application: u16,
    isp: u16,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ProfileDef {
    name: String,
    capacity: Size,
    #[serde(default)]
    usb: Option<UsbDef>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct ProfileFileDef {
    profiles: Vec<ProfileDef>,
}

// ============================================================================
// Profile database
// ============================================================================

/// Runtime profile database
///
/// Always contains the built-in profiles. Profiles loaded later replace
/// earlier ones with the same name.
#[derive(Debug, Clone)]
pub struct ProfileDatabase {
    profiles: Vec<DeviceProfile>,
}

impl Default for ProfileDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileDatabase {
    /// Create a database holding only the built-in profiles
    pub fn new() -> Self {
        Self {
            profiles: alloc::vec![DeviceProfile::mg84fl54b()],
        }
    }

    /// Load profiles from a single RON file
    pub fn load_file(&mut self, path: &Path) -> Result<usize, ProfileDbError> {
        let content = fs::read_to_string(path)?;
        self.load_ron(&content)
    }

    /// Load profiles from a RON string
    ///
    /// The whole file is validated before any profile is added.
    pub fn load_ron(&mut self, content: &str) -> Result<usize, ProfileDbError> {
        let file: ProfileFileDef = ron::from_str(content)?;

        let mut loaded = Vec::with_capacity(file.profiles.len());
        for def in file.profiles {
            loaded.push(validate(def)?);
        }

        let count = loaded.len();
        for profile in loaded {
            self.insert(profile);
        }
        Ok(count)
    }

    /// Load all RON files from a directory
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ProfileDbError> {
        let mut total = 0;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "ron") {
                total += self.load_file(&path)?;
            }
        }

        Ok(total)
    }

    /// Find a profile by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&DeviceProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get the number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over all profiles
    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.profiles.iter()
    }

    fn insert(&mut self, profile: DeviceProfile) {
        if let Some(existing) = self
            .profiles
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&profile.name))
        {
            log::debug!("Profile {} replaced", profile.name);
            *existing = profile;
        } else {
            self.profiles.push(profile);
        }
    }
}

fn validate(def: ProfileDef) -> Result<DeviceProfile, ProfileDbError> {
    if def.name.trim().is_empty() {
        return Err(ProfileDbError::Validation("profile with empty name".into()));
    }

    let capacity = match def.capacity.to_bytes() {
        Some(capacity) if (1..=MAX_CAPACITY).contains(&capacity) => capacity,
        _ => {
            return Err(ProfileDbError::Validation(format!(
                "profile {}: capacity {:?} outside 1..={} bytes",
                def.name, def.capacity, MAX_CAPACITY
            )));
        }
    };

    Ok(DeviceProfile {
        name: def.name,
        capacity,
        usb: def.usb.map(|u| UsbIds {
            vendor: u.vendor,
            application_product: u.application,
            isp_product: u.isp,
        }),
    })
}
