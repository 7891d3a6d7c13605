use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format tag applied to file decodes when the engine reports no symbology.
pub const FILE_SCAN_FORMAT: &str = "FILE_SCAN";

/// One decoded payload. Serialized as `{ "text", "timestamp", "format" }`,
/// which is also the on-disk history layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub text: String,
    /// Capture instant in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ScanResult {
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Build a [`ScanResult`] stamped with the current wall clock.
pub fn format_scan_result(text: impl Into<String>, symbology: Option<&str>) -> ScanResult {
    format_scan_result_at(text, symbology, Utc::now())
}

pub fn format_scan_result_at(
    text: impl Into<String>,
    symbology: Option<&str>,
    at: DateTime<Utc>,
) -> ScanResult {
    ScanResult {
        text: text.into(),
        timestamp: at.timestamp_millis(),
        format: symbology
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned),
    }
}
