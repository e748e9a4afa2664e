//! Target registry - opens targets by name

use crate::handle::TargetHandle;
use hexflash_core::profile::DeviceProfile;
#[cfg(feature = "usb")]
use hexflash_core::{profile::UsbIds, target::DeviceMode};
use std::collections::HashMap;

/// Parsed target parameters
#[derive(Debug)]
pub struct TargetParams {
    /// Target name (canonical)
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl TargetParams {
    /// Warn about parameters the target does not understand
    fn warn_unknown(&self, known: &[&str]) {
        for key in self.params.keys() {
            if !known.contains(&key.as_str()) {
                log::warn!("Ignoring unknown {} parameter '{}'", self.name, key);
            }
        }
    }
}

/// Parse a target string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_target_params("usb:vid=0e6a,mode=isp")?;
/// assert_eq!(params.name, "usb");
/// assert_eq!(params.params.get("mode"), Some(&"isp".to_string()));
/// ```
pub fn parse_target_params(s: &str) -> Result<TargetParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    if name.is_empty() {
        return Err("Empty target name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(TargetParams {
        name: name.to_string(),
        params,
    })
}

/// Open a firmware target and wrap it in a TargetHandle
///
/// # Arguments
/// * `target` - Target specification (e.g., "dummy" or "usb:vid=0e6a,isp_pid=0301")
/// * `profile` - Device profile supplying capacity and default USB ids
///
/// # Example
/// ```ignore
/// let profile = DeviceProfile::mg84fl54b();
/// let mut handle = open_target("dummy", &profile)?;
/// handle.flash(&image)?;
/// ```
pub fn open_target(
    target: &str,
    profile: &DeviceProfile,
) -> Result<TargetHandle, Box<dyn std::error::Error>> {
    let params = parse_target_params(target)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params, profile),

        #[cfg(feature = "usb")]
        "usb" => open_usb(&params, profile),

        _ => Err(format!("Unknown target: {}", params.name).into()),
    }
}

// Target-specific open functions

#[cfg(feature = "dummy")]
fn open_dummy(
    params: &TargetParams,
    profile: &DeviceProfile,
) -> Result<TargetHandle, Box<dyn std::error::Error>> {
    use hexflash_dummy::{DummyConfig, DummyTarget};

    params.warn_unknown(&["fail"]);

    let fail_upload = match params.params.get("fail").map(String::as_str) {
        None | Some("no") | Some("0") | Some("false") => false,
        Some("yes") | Some("1") | Some("true") => true,
        Some(other) => return Err(format!("Invalid value for fail: '{}'", other).into()),
    };

    log::info!(
        "Opening dummy target ({} bytes, profile {})",
        profile.capacity,
        profile.name
    );

    let target = DummyTarget::new(DummyConfig {
        capacity: profile.capacity,
        fail_upload,
        ..DummyConfig::default()
    });
    Ok(TargetHandle::new(Box::new(target)))
}

#[cfg(feature = "usb")]
fn open_usb(
    params: &TargetParams,
    profile: &DeviceProfile,
) -> Result<TargetHandle, Box<dyn std::error::Error>> {
    params.warn_unknown(&["vid", "pid", "app_pid", "isp_pid", "mode"]);

    let (ids, mode) = resolve_usb_ids(params, profile)?;
    log::info!(
        "Opening USB target {:04x}:{:04x} ({} mode)...",
        ids.vendor,
        ids.product_for(mode),
        mode
    );

    let target = hexflash_usb::UsbTarget::open(&ids, mode, profile.capacity).map_err(|e| {
        format!(
            "Failed to open USB target: {}\nMake sure the device is connected and you have permissions.",
            e
        )
    })?;
    Ok(TargetHandle::new(Box::new(target)))
}

/// Parse a USB id written in hex, with or without a `0x` prefix
#[cfg(feature = "usb")]
fn parse_usb_id(key: &str, value: &str) -> Result<u16, Box<dyn std::error::Error>> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16).map_err(|_| {
        format!("Invalid USB id for {}: '{}' (expected 4 hex digits)", key, value).into()
    })
}

/// Combine the profile's USB ids with the ones given as parameters
///
/// `vid`, `app_pid` and `isp_pid` override the profile; `pid` sets the
/// product id of the mode being opened.
#[cfg(feature = "usb")]
fn resolve_usb_ids(
    params: &TargetParams,
    profile: &DeviceProfile,
) -> Result<(UsbIds, DeviceMode), Box<dyn std::error::Error>> {
    let mode = match params.params.get("mode") {
        Some(m) => DeviceMode::parse(m)
            .ok_or_else(|| format!("Invalid mode: '{}' (expected isp or app)", m))?,
        None => DeviceMode::default(),
    };

    let id = |key: &str| -> Result<Option<u16>, Box<dyn std::error::Error>> {
        params
            .params
            .get(key)
            .map(|v| parse_usb_id(key, v))
            .transpose()
    };

    let base = profile.usb;
    let vendor = id("vid")?.or(base.map(|ids| ids.vendor));
    let mut application = id("app_pid")?.or(base.map(|ids| ids.application_product));
    let mut isp = id("isp_pid")?.or(base.map(|ids| ids.isp_product));
    if let Some(pid) = id("pid")? {
        match mode {
            DeviceMode::Application => application = Some(pid),
            DeviceMode::Isp => isp = Some(pid),
        }
    }

    let vendor = vendor.ok_or_else(|| {
        format!(
            "Profile '{}' has no USB ids, pass vid=<hex> and pid=<hex>",
            profile.name
        )
    })?;
    let product = match mode {
        DeviceMode::Application => application,
        DeviceMode::Isp => isp,
    }
    .ok_or_else(|| format!("No USB product id for {} mode, pass pid=<hex>", mode))?;

    let ids = UsbIds {
        vendor,
        application_product: application.unwrap_or(product),
        isp_product: isp.unwrap_or(product),
    };
    Ok((ids, mode))
}

// Target information and listing
/// Information about a target
pub struct TargetInfo {
    /// Name (used for matching)
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all available targets (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_targets() -> Vec<TargetInfo> {
    let mut targets = Vec::new();

    #[cfg(feature = "dummy")]
    targets.push(TargetInfo {
        name: "dummy",
        description: "In-memory device for dry runs (fail=<yes|no>)",
    });

    #[cfg(feature = "usb")]
    targets.push(TargetInfo {
        name: "usb",
        description: "USB device in ISP mode (vid=<hex>,pid=<hex>,app_pid=<hex>,isp_pid=<hex>,mode=<isp|app>)",
    });

    targets
}

/// Generate a short list of target names for CLI help
pub fn target_names_short() -> String {
    let targets = available_targets();
    if targets.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = targets.iter().map(|t| t.name).collect();
    names.join(", ")
}
