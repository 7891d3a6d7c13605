pub mod camera;
pub mod content;
pub mod decode_loop;
pub mod engine;
pub mod error;
pub mod file_decode;
pub mod history;
pub mod models;
pub mod platform;
pub mod session;
pub mod settings;
pub mod storage;
pub mod utils;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

pub use engine::{DecodeEngine, DecodeSink, EngineFactory, EngineScope};
pub use error::{ErrorInfo, ScanError};
pub use file_decode::{FileDecoder, ImageFile};
pub use history::HistoryStore;
pub use models::{CameraDescriptor, ScanResult};
pub use platform::{BrowserSupportInfo, PlatformMedia};
pub use session::{Phase, ScanSession, SessionSnapshot};
pub use settings::SettingsStore;
pub use storage::KeyValueStore;
pub use utils::logging::init_logging;

const DATABASE_FILE: &str = "qrscan.sqlite3";
const PORTABLE_STORE_FILE: &str = "storage.json";
const SETTINGS_FILE: &str = "settings.json";

/// Everything a host needs to drive the scanner: the live session, file
/// decoding, history and settings, wired to one store.
pub struct ScannerApp {
    pub(crate) session: ScanSession,
    pub(crate) files: FileDecoder,
    pub(crate) history: Arc<HistoryStore>,
    pub(crate) settings: Arc<SettingsStore>,
    pub(crate) media: Arc<dyn PlatformMedia>,
}

impl ScannerApp {
    pub fn new(
        media: Arc<dyn PlatformMedia>,
        engines: Arc<dyn EngineFactory>,
        store: Arc<dyn KeyValueStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        let history = Arc::new(HistoryStore::new(store.clone()));
        let session = ScanSession::new(
            media.clone(),
            engines.clone(),
            store,
            history.clone(),
            settings.clone(),
        );

        Self {
            session,
            files: FileDecoder::new(engines, history.clone()),
            history,
            settings,
            media,
        }
    }

    /// Open the scanner with its SQLite store and settings file under
    /// `data_dir`, creating the directory if needed.
    pub fn open(
        data_dir: &Path,
        media: Arc<dyn PlatformMedia>,
        engines: Arc<dyn EngineFactory>,
    ) -> Result<Self> {
        create_data_dir(data_dir)?;
        let store = storage::SqliteStore::new(data_dir.join(DATABASE_FILE))?;
        Self::open_with_store(data_dir, media, engines, Arc::new(store))
    }

    /// Like [`open`](Self::open) but keeps history and the camera choice in a
    /// plain JSON file, for hosts without SQLite.
    pub fn open_portable(
        data_dir: &Path,
        media: Arc<dyn PlatformMedia>,
        engines: Arc<dyn EngineFactory>,
    ) -> Result<Self> {
        create_data_dir(data_dir)?;
        let store = storage::JsonFileStore::new(data_dir.join(PORTABLE_STORE_FILE))?;
        Self::open_with_store(data_dir, media, engines, Arc::new(store))
    }

    fn open_with_store(
        data_dir: &Path,
        media: Arc<dyn PlatformMedia>,
        engines: Arc<dyn EngineFactory>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        info!("Scanner data opened at {}", data_dir.display());
        Ok(Self::new(media, engines, store, Arc::new(settings)))
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn history(&self) -> Vec<ScanResult> {
        self.history.entries()
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn browser_support(&self) -> BrowserSupportInfo {
        platform::check_support(&self.media.capabilities())
    }

    /// Validate and decode a still image, then surface it as the session's
    /// latest result. The session phase is left alone.
    pub async fn scan_from_file(&self, file: &ImageFile) -> Result<ScanResult, ScanError> {
        let max_bytes = self.settings.current().max_file_bytes;
        file_decode::validate_image(file, max_bytes)?;

        let result = self.files.decode_file(file).await?;
        self.session.record_file_result(result.clone()).await;
        Ok(result)
    }

    /// Stop scanning and release the live engine.
    pub async fn shutdown(&self) {
        self.session.dispose().await;
        info!("Scanner shut down");
    }
}

fn create_data_dir(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data dir {}", data_dir.display()))
}
