#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Notify};

use qrscan_lib::engine::{
    DecodeEngine, DecodeEvent, DecodeOptions, DecodeSink, DeviceSelector, EngineError,
    EngineFactory, EngineScope,
};
use qrscan_lib::models::MediaDeviceInfo;
use qrscan_lib::platform::{
    CameraConstraints, MediaCapabilities, MediaError, MediaStream, PlatformMedia,
};
use qrscan_lib::settings::{ScannerSettings, SettingsStore};
use qrscan_lib::storage::{KeyValueStore, MemoryStore};
use qrscan_lib::{ScannerApp, SessionSnapshot};

pub const CHROME_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Engine double that records every call and lets tests inject signals.
#[derive(Default)]
pub struct FakeEngine {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub clears: AtomicUsize,
    pub devices: Mutex<Vec<String>>,
    streaming: AtomicBool,
    close_sink_on_start: AtomicBool,
    sink: Mutex<Option<DecodeSink>>,
    fail_next_start: Mutex<Option<String>>,
    emit_on_stop: Mutex<Option<String>>,
    file_outcome: Mutex<Option<Result<DecodeEvent, EngineError>>>,
}

impl FakeEngine {
    pub fn emit(&self, text: &str, symbology: Option<&str>) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.decoded(text, symbology);
        }
    }

    pub fn emit_failure(&self, message: &str) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.failed(message);
        }
    }

    pub fn fail_next_start(&self, message: &str) {
        *self.fail_next_start.lock().unwrap() = Some(message.to_owned());
    }

    /// Make the next successful start drop its sink right away, as an
    /// engine whose stream dies would.
    pub fn close_sink_on_next_start(&self) {
        self.close_sink_on_start.store(true, Ordering::SeqCst);
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    /// Deliver one decode from inside `stop()`, before it returns.
    pub fn emit_during_stop(&self, text: &str) {
        *self.emit_on_stop.lock().unwrap() = Some(text.to_owned());
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecodeEngine for FakeEngine {
    async fn start(
        &self,
        device: DeviceSelector,
        _options: &DecodeOptions,
        sink: DecodeSink,
    ) -> Result<(), EngineError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next_start.lock().unwrap().take() {
            return Err(EngineError::Stream(message));
        }
        let target = match device {
            DeviceSelector::DeviceId(id) => id,
            DeviceSelector::Facing(mode) => format!("facing:{mode:?}"),
        };
        self.devices.lock().unwrap().push(target);
        self.streaming.store(true, Ordering::SeqCst);
        if self.close_sink_on_start.swap(false, Ordering::SeqCst) {
            drop(sink);
            *self.sink.lock().unwrap() = None;
        } else {
            *self.sink.lock().unwrap() = Some(sink);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.streaming.store(false, Ordering::SeqCst);
        let pending = self.emit_on_stop.lock().unwrap().take();
        if let Some(text) = pending {
            self.emit(&text, Some("QR_CODE"));
        }
        Ok(())
    }

    async fn scan_file(
        &self,
        _image: &[u8],
        _return_bounding_box: bool,
    ) -> Result<DecodeEvent, EngineError> {
        // Yield so concurrent decodes actually interleave
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.file_outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Err(EngineError::NotFound))
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory handing out fresh [`FakeEngine`]s and keeping them for
/// inspection.
#[derive(Default)]
pub struct EngineHub {
    live: Mutex<Vec<Arc<FakeEngine>>>,
    primed: Mutex<Option<Arc<FakeEngine>>>,
    files: Mutex<Vec<Arc<FakeEngine>>>,
    file_outcome: Mutex<Option<Result<DecodeEvent, EngineError>>>,
}

impl EngineHub {
    pub fn live(&self) -> Arc<FakeEngine> {
        self.live
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no live engine created yet")
    }

    /// The engine the next live request receives, for configuring it before
    /// the session creates it.
    pub fn prime_live(&self) -> Arc<FakeEngine> {
        let engine = Arc::new(FakeEngine::default());
        *self.primed.lock().unwrap() = Some(engine.clone());
        engine
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn file_engines(&self) -> Vec<Arc<FakeEngine>> {
        self.files.lock().unwrap().clone()
    }

    /// What every file engine created from now on returns.
    pub fn set_file_outcome(&self, outcome: Result<DecodeEvent, EngineError>) {
        *self.file_outcome.lock().unwrap() = Some(outcome);
    }
}

impl EngineFactory for EngineHub {
    fn create(&self, scope: EngineScope) -> Result<Arc<dyn DecodeEngine>, EngineError> {
        let engine = match scope {
            EngineScope::Live => self.primed.lock().unwrap().take(),
            EngineScope::File => None,
        }
        .unwrap_or_default();
        match scope {
            EngineScope::Live => self.live.lock().unwrap().push(engine.clone()),
            EngineScope::File => {
                *engine.file_outcome.lock().unwrap() = self.file_outcome.lock().unwrap().clone();
                self.files.lock().unwrap().push(engine.clone());
            }
        }
        Ok(engine)
    }
}

struct FakeStream {
    released: Arc<AtomicUsize>,
}

impl MediaStream for FakeStream {
    fn stop_tracks(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Platform media double with a configurable grant and device list.
pub struct FakeMedia {
    pub caps: MediaCapabilities,
    grant: Mutex<Result<(), MediaError>>,
    devices: Mutex<Vec<MediaDeviceInfo>>,
    gate: Option<Arc<Notify>>,
    pub requests: AtomicUsize,
    pub released: Arc<AtomicUsize>,
}

impl FakeMedia {
    pub fn granting(devices: Vec<MediaDeviceInfo>) -> Self {
        Self {
            caps: secure_caps(),
            grant: Mutex::new(Ok(())),
            devices: Mutex::new(devices),
            gate: None,
            requests: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_caps(mut self, caps: MediaCapabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Hold every permission request until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_grant(&self, grant: Result<(), MediaError>) {
        *self.grant.lock().unwrap() = grant;
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformMedia for FakeMedia {
    fn capabilities(&self) -> MediaCapabilities {
        self.caps.clone()
    }

    async fn request_camera(
        &self,
        _constraints: &CameraConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let grant = self.grant.lock().unwrap().clone();
        grant.map(|_| {
            Box::new(FakeStream {
                released: self.released.clone(),
            }) as Box<dyn MediaStream>
        })
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, MediaError> {
        Ok(self.devices.lock().unwrap().clone())
    }
}

pub fn secure_caps() -> MediaCapabilities {
    MediaCapabilities {
        has_host_environment: true,
        is_secure_context: true,
        has_media_devices: true,
        has_get_user_media: true,
        user_agent: CHROME_UA.into(),
    }
}

pub fn two_cameras() -> Vec<MediaDeviceInfo> {
    vec![
        MediaDeviceInfo::video("front", "Front Camera"),
        MediaDeviceInfo::video("back", "Back Camera"),
    ]
}

pub struct Harness {
    pub app: ScannerApp,
    pub media: Arc<FakeMedia>,
    pub engines: Arc<EngineHub>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new(media: FakeMedia) -> Self {
        Self::with_store(media, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(media: FakeMedia, store: Arc<MemoryStore>) -> Self {
        let media = Arc::new(media);
        let engines = Arc::new(EngineHub::default());
        let settings = Arc::new(SettingsStore::in_memory(ScannerSettings::default()));
        let app = ScannerApp::new(
            media.clone(),
            engines.clone(),
            store.clone() as Arc<dyn KeyValueStore>,
            settings,
        );
        Self {
            app,
            media,
            engines,
            store,
        }
    }
}

/// Wait until a published snapshot satisfies `condition`.
pub async fn wait_for_snapshot(
    rx: &mut watch::Receiver<SessionSnapshot>,
    condition: impl FnMut(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(condition))
        .await
        .expect("timed out waiting for session update")
        .expect("session dropped")
        .clone()
}

/// Give the decode loop task a chance to drain anything queued.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
