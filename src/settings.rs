use std::fs;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::DecodeOptions;

pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSettings {
    pub decode: DecodeOptions,
    /// Upper bound for images accepted by file decoding.
    pub max_file_bytes: u64,
    /// Give up on an unanswered permission prompt after this long. Unset
    /// waits forever.
    pub permission_timeout_ms: Option<u64>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            decode: DecodeOptions::default(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            permission_timeout_ms: None,
        }
    }
}

impl ScannerSettings {
    pub fn permission_timeout(&self) -> Option<Duration> {
        self.permission_timeout_ms.map(Duration::from_millis)
    }
}

/// Scanner configuration persisted as pretty JSON. A missing or unparsable
/// file yields defaults.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<ScannerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            ScannerSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Settings that live only for this process.
    pub fn in_memory(settings: ScannerSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(settings),
        }
    }

    pub fn current(&self) -> ScannerSettings {
        self.read().clone()
    }

    pub fn decode_options(&self) -> DecodeOptions {
        self.read().decode.clone()
    }

    pub fn update(&self, settings: ScannerSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn update_decode_options(&self, options: DecodeOptions) -> Result<()> {
        let mut guard = self.write();
        guard.decode = options;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = fs::read_to_string(path)?;
        let data: ScannerSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &ScannerSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, ScannerSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, ScannerSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
