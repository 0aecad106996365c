//! Host device details for initiate requests

use chrono::Utc;

use av_core::{DeviceInfoTrait, DeviceMetadata};

const LOCALE_VARIABLES: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Collects what the host can report about itself.
///
/// The SMS-capable flag and OS version are left out because a desktop host
/// cannot report them.
#[derive(Debug, Clone)]
pub struct SystemDeviceInfo {
    app_name: String,
    app_version: String,
}

impl SystemDeviceInfo {
    pub fn new(app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            app_version: app_version.into(),
        }
    }
}

impl Default for SystemDeviceInfo {
    fn default() -> Self {
        Self::new("AppVerify", env!("CARGO_PKG_VERSION"))
    }
}

impl DeviceInfoTrait for SystemDeviceInfo {
    fn collect(&self) -> DeviceMetadata {
        let language = LOCALE_VARIABLES
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find_map(|value| language_tag(&value));

        DeviceMetadata {
            is_sms_capable: None,
            app_name: Some(self.app_name.clone()).filter(|name| !name.is_empty()),
            app_version: Some(self.app_version.clone()).filter(|version| !version.is_empty()),
            os_name: Some(std::env::consts::OS.to_string()),
            os_version: None,
            language,
            requested_at: Some(Utc::now()),
        }
    }
}

/// Convert a POSIX locale such as `en_US.UTF-8` into a language tag (`en-US`)
pub fn language_tag(locale: &str) -> Option<String> {
    let base = locale
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}
