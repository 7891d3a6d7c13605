//! The platform media collaborator: capability probe, camera permission and
//! device enumeration.

pub mod support;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{PermissionFailure, ScanError};
use crate::models::MediaDeviceInfo;

pub use support::{
    check_support, detect_browser, permission_instructions, recommended_browsers, Browser,
    BrowserSupportInfo,
};

/// Synchronous snapshot of what the host environment offers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaCapabilities {
    /// False when running outside a browser-like host entirely.
    pub has_host_environment: bool,
    pub is_secure_context: bool,
    pub has_media_devices: bool,
    pub has_get_user_media: bool,
    pub user_agent: String,
}

impl MediaCapabilities {
    pub fn has_camera_api(&self) -> bool {
        self.has_media_devices && self.has_get_user_media
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    Environment,
    User,
}

/// Constraints for the permission probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// A granted media stream. The session only holds it long enough to confirm
/// the grant.
pub trait MediaStream: Send {
    fn stop_tracks(&mut self);
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("permission denied")]
    NotAllowed,
    #[error("no camera device found")]
    NotFound,
    #[error("camera not supported")]
    NotSupported,
    #[error("camera already in use")]
    NotReadable,
    #[error("{0}")]
    Other(String),
}

impl MediaError {
    pub fn permission_failure(&self) -> Option<PermissionFailure> {
        match self {
            MediaError::NotAllowed => Some(PermissionFailure::Denied),
            MediaError::NotFound => Some(PermissionFailure::NoDevice),
            MediaError::NotSupported => Some(PermissionFailure::Unsupported),
            MediaError::NotReadable => Some(PermissionFailure::InUse),
            MediaError::Other(_) => None,
        }
    }

    /// Map to the session error taxonomy. Permission-class failures carry
    /// browser-specific instructions.
    pub fn into_scan_error(self, browser: Browser) -> ScanError {
        match self.permission_failure() {
            Some(failure) => ScanError::Permission {
                failure,
                remediation: permission_instructions(browser),
            },
            None => ScanError::Acquisition(self.to_string()),
        }
    }
}

#[async_trait]
pub trait PlatformMedia: Send + Sync {
    fn capabilities(&self) -> MediaCapabilities;

    /// May prompt the user; may stay pending indefinitely.
    async fn request_camera(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError>;

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError>;
}
