use std::sync::Arc;

use crate::models::CameraDescriptor;
use crate::platform::PlatformMedia;
use crate::storage::{KeyValueStore, LAST_CAMERA_KEY};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Available video inputs plus the durable "last used" choice.
#[derive(Clone)]
pub struct CameraInventory {
    media: Arc<dyn PlatformMedia>,
    store: Arc<dyn KeyValueStore>,
}

impl CameraInventory {
    pub fn new(media: Arc<dyn PlatformMedia>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { media, store }
    }

    /// Video inputs in platform order. Enumeration failure yields nothing.
    pub async fn enumerate(&self) -> Vec<CameraDescriptor> {
        match self.media.enumerate_devices().await {
            Ok(devices) => devices
                .into_iter()
                .filter_map(|device| device.into_camera())
                .collect(),
            Err(err) => {
                log_warn!("camera enumeration failed: {err}");
                Vec::new()
            }
        }
    }

    pub fn remember_selection(&self, device_id: &str) {
        if let Err(err) = self.store.set(LAST_CAMERA_KEY, device_id) {
            log_warn!("failed to remember camera {device_id}: {err:#}");
        }
    }

    pub fn recall_selection(&self) -> Option<String> {
        match self.store.get(LAST_CAMERA_KEY) {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(err) => {
                log_warn!("failed to recall last camera: {err:#}");
                None
            }
        }
    }

    /// The remembered camera if it is still connected, else the first one.
    pub fn select(&self, cameras: &[CameraDescriptor]) -> Option<CameraDescriptor> {
        let remembered = self.recall_selection();
        remembered
            .and_then(|id| cameras.iter().find(|camera| camera.device_id == id))
            .or_else(|| cameras.first())
            .cloned()
    }
}
