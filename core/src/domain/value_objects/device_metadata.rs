//! Optional device details attached to initiate requests.

use chrono::{DateTime, Utc};

/// Timestamp layout expected by `sms_request_datetime_utc`
pub const REQUEST_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Best-effort description of the requesting device.
///
/// Every field is optional and omitted from the request when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetadata {
    pub is_sms_capable: Option<bool>,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub language: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
}

impl DeviceMetadata {
    /// Form fields for the present values, in a stable order
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        if let Some(capable) = self.is_sms_capable {
            fields.push(("is_sms_capable", capable.to_string()));
        }

        let text_fields = [
            ("app_name", &self.app_name),
            ("app_version", &self.app_version),
            ("os_name", &self.os_name),
            ("os_version", &self.os_version),
            ("language", &self.language),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                fields.push((key, value.to_string()));
            }
        }

        if let Some(requested_at) = self.requested_at {
            fields.push((
                "sms_request_datetime_utc",
                requested_at.format(REQUEST_DATETIME_FORMAT).to_string(),
            ));
        }

        fields
    }
}
