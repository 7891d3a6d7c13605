use serde::{Deserialize, Serialize};

/// A video input the session can decode from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraDescriptor {
    pub device_id: String,
    /// Empty until the platform has granted camera permission.
    pub label: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    AudioOutput,
}

/// Raw entry from the platform's device enumeration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
}

impl MediaDeviceInfo {
    pub fn video(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind: DeviceKind::VideoInput,
            label: label.into(),
        }
    }

    pub fn into_camera(self) -> Option<CameraDescriptor> {
        match self.kind {
            DeviceKind::VideoInput => Some(CameraDescriptor {
                device_id: self.device_id,
                label: self.label,
            }),
            DeviceKind::AudioInput | DeviceKind::AudioOutput => None,
        }
    }
}
