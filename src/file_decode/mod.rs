//! One-shot decoding of still images.
//!
//! Every call builds its own engine instance and releases it before
//! returning, so file decodes never share state with the live loop or with
//! each other.

pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::ImageFormat;
use uuid::Uuid;

use crate::engine::{DecodeEngine, EngineError, EngineFactory, EngineScope};
use crate::error::ScanError;
use crate::history::HistoryStore;
use crate::models::{format_scan_result, ScanResult, FILE_SCAN_FORMAT};

pub use validate::validate_image;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// A still image handed in by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    /// Declared MIME type, if the source provided one.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_owned),
            bytes: bytes.into(),
        }
    }

    /// Read an image from disk. The media type comes from the extension;
    /// unknown extensions leave it undeclared.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let media_type = ImageFormat::from_path(path)
            .ok()
            .map(|format| format.to_mime_type().to_owned());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Clears the borrowed engine when the decode finishes, on every path.
struct EngineLease(Arc<dyn DecodeEngine>);

impl Drop for EngineLease {
    fn drop(&mut self) {
        self.0.clear();
    }
}

#[derive(Clone)]
pub struct FileDecoder {
    factory: Arc<dyn EngineFactory>,
    history: Arc<HistoryStore>,
}

impl FileDecoder {
    pub fn new(factory: Arc<dyn EngineFactory>, history: Arc<HistoryStore>) -> Self {
        Self { factory, history }
    }

    /// Decode a single image and record the result in history. Does not
    /// touch the scanning session.
    pub async fn decode_file(&self, file: &ImageFile) -> Result<ScanResult, ScanError> {
        let job_id = Uuid::new_v4();
        log_info!("file decode {} started for {:?} ({} bytes)", job_id, file.name, file.len());

        let engine = self
            .factory
            .create(EngineScope::File)
            .map_err(|err| ScanError::Engine(err.to_string()))?;
        let lease = EngineLease(engine);

        let event = match lease.0.scan_file(&file.bytes, false).await {
            Ok(event) if !event.text.is_empty() => event,
            Ok(_) => return Err(self.failed(job_id, EngineError::NotFound)),
            Err(err) => return Err(self.failed(job_id, err)),
        };
        drop(lease);

        let symbology = event.symbology.as_deref().unwrap_or(FILE_SCAN_FORMAT);
        let result = format_scan_result(event.text, Some(symbology));
        self.history.append(result.clone());

        log_info!("file decode {} finished", job_id);
        Ok(result)
    }

    fn failed(&self, job_id: Uuid, err: EngineError) -> ScanError {
        log_warn!("file decode {} failed: {}", job_id, err);
        ScanError::FileDecode(err.to_string())
    }
}
