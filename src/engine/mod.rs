//! The decode engine collaborator.
//!
//! An engine turns camera frames or still images into text. The crate never
//! decodes pixels itself; hosts inject an [`EngineFactory`] and the session
//! and file decoder each build their own instances from it.

pub mod options;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

pub use options::{DecodeOptions, ScanRegion, Symbology};

use crate::platform::FacingMode;

/// Engine failure messages that only mean "nothing recognisable in this
/// frame". They arrive continuously while no code is in view.
const NOT_FOUND_MARKERS: [&str; 2] = ["NotFoundException", "No MultiFormat Readers"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no code found in image")]
    NotFound,
    #[error("camera stream failed: {0}")]
    Stream(String),
    #[error("{0}")]
    Other(String),
}

/// Typed payload of one recognised code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecodeEvent {
    pub text: String,
    pub symbology: Option<String>,
}

impl DecodeEvent {
    pub fn new(text: impl Into<String>, symbology: Option<&str>) -> Self {
        Self {
            text: text.into(),
            symbology: symbology.map(str::to_owned),
        }
    }
}

/// What the engine reports from the running loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSignal {
    Decoded(DecodeEvent),
    Failed(String),
}

impl EngineSignal {
    /// True for signals that carry no information: empty payloads and the
    /// per-frame "not found" failures.
    pub fn is_noise(&self) -> bool {
        match self {
            EngineSignal::Decoded(event) => event.text.is_empty(),
            EngineSignal::Failed(message) => NOT_FOUND_MARKERS
                .iter()
                .any(|marker| message.contains(marker)),
        }
    }
}

/// Handle the engine uses to report decode attempts back to the loop.
/// Sends after the loop has shut down are dropped silently.
#[derive(Debug, Clone)]
pub struct DecodeSink {
    tx: mpsc::UnboundedSender<EngineSignal>,
}

impl DecodeSink {
    pub fn new(tx: mpsc::UnboundedSender<EngineSignal>) -> Self {
        Self { tx }
    }

    pub fn decoded(&self, text: impl Into<String>, symbology: Option<&str>) {
        let _ = self
            .tx
            .send(EngineSignal::Decoded(DecodeEvent::new(text, symbology)));
    }

    pub fn failed(&self, message: impl Into<String>) {
        let _ = self.tx.send(EngineSignal::Failed(message.into()));
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceSelector {
    DeviceId(String),
    Facing(FacingMode),
}

impl DeviceSelector {
    /// Target `device_id`, or the environment-facing camera when the platform
    /// has not exposed an id (some hosts blank ids until permission settles).
    pub fn for_device(device_id: &str) -> Self {
        if device_id.is_empty() {
            DeviceSelector::Facing(FacingMode::Environment)
        } else {
            DeviceSelector::DeviceId(device_id.to_owned())
        }
    }
}

/// Who an engine instance belongs to. Live and file instances never share
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScope {
    Live,
    File,
}

#[async_trait]
pub trait DecodeEngine: Send + Sync {
    /// Begin continuous decode attempts against `device`, reporting through
    /// `sink` at roughly `options.target_frame_rate` attempts per second.
    async fn start(
        &self,
        device: DeviceSelector,
        options: &DecodeOptions,
        sink: DecodeSink,
    ) -> Result<(), EngineError>;

    /// Halt continuous attempts and release the camera stream.
    async fn stop(&self) -> Result<(), EngineError>;

    /// Single-shot decode of a still image.
    async fn scan_file(
        &self,
        image: &[u8],
        return_bounding_box: bool,
    ) -> Result<DecodeEvent, EngineError>;

    /// Release any remaining resources. Called once before the instance is
    /// dropped.
    fn clear(&self) {}
}

pub trait EngineFactory: Send + Sync {
    fn create(&self, scope: EngineScope) -> Result<Arc<dyn DecodeEngine>, EngineError>;
}

impl<F> EngineFactory for F
where
    F: Fn(EngineScope) -> Result<Arc<dyn DecodeEngine>, EngineError> + Send + Sync,
{
    fn create(&self, scope: EngineScope) -> Result<Arc<dyn DecodeEngine>, EngineError> {
        self(scope)
    }
}
