//! Presentation-facing entry points. Errors are flattened to their display
//! text at this boundary.

use serde::Serialize;

use crate::content::{
    classify, suggested_action, truncate_for_display, Category, SuggestedAction, WifiCredential,
};
use crate::file_decode::ImageFile;
use crate::models::ScanResult;
use crate::platform::BrowserSupportInfo;
use crate::ScannerApp;

use super::SessionSnapshot;

const PREVIEW_CHARS: usize = 100;

/// Classification of a decoded payload, ready for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescription {
    pub category: Category,
    pub label: &'static str,
    pub preview: String,
    pub action: SuggestedAction,
    /// Parsed fields for network-credential payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<WifiCredential>,
}

pub async fn get_scanner_state(app: &ScannerApp) -> SessionSnapshot {
    app.session.snapshot().await
}

pub async fn start_scanning(app: &ScannerApp) -> Result<SessionSnapshot, String> {
    app.session.start().await.map_err(|e| e.to_string())
}

pub async fn stop_scanning(app: &ScannerApp) -> Result<SessionSnapshot, String> {
    Ok(app.session.stop().await)
}

pub async fn switch_camera(app: &ScannerApp, device_id: String) -> Result<SessionSnapshot, String> {
    app.session
        .switch_camera(&device_id)
        .await
        .map_err(|e| e.to_string())
}

pub async fn clear_error(app: &ScannerApp) -> Result<SessionSnapshot, String> {
    Ok(app.session.clear_error().await)
}

pub async fn clear_history(app: &ScannerApp) -> Result<SessionSnapshot, String> {
    Ok(app.session.clear_history().await)
}

pub async fn get_history(app: &ScannerApp) -> Result<Vec<ScanResult>, String> {
    Ok(app.history())
}

pub async fn scan_from_file(
    app: &ScannerApp,
    name: String,
    media_type: Option<String>,
    bytes: Vec<u8>,
) -> Result<ScanResult, String> {
    let file = ImageFile::from_bytes(name, media_type.as_deref(), bytes);
    app.scan_from_file(&file).await.map_err(|e| e.to_string())
}

pub async fn scan_from_path(app: &ScannerApp, path: String) -> Result<ScanResult, String> {
    let file = ImageFile::from_path(&path)
        .await
        .map_err(|e| format!("{e:#}"))?;
    app.scan_from_file(&file).await.map_err(|e| e.to_string())
}

pub fn check_browser_support(app: &ScannerApp) -> BrowserSupportInfo {
    app.browser_support()
}

pub fn describe_content(text: String) -> ContentDescription {
    let category = classify(&text);
    ContentDescription {
        category,
        label: category.label(),
        preview: truncate_for_display(&text, PREVIEW_CHARS),
        action: suggested_action(category, &text),
        network: match category {
            Category::NetworkCredential => WifiCredential::parse(&text),
            _ => None,
        },
    }
}
