use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::camera::CameraInventory;
use crate::decode_loop::DecodeLoopController;
use crate::engine::EngineFactory;
use crate::error::ScanError;
use crate::history::HistoryStore;
use crate::models::{CameraDescriptor, ScanResult};
use crate::platform::{
    check_support, detect_browser, CameraConstraints, MediaCapabilities, MediaError,
    PlatformMedia,
};
use crate::settings::SettingsStore;
use crate::storage::KeyValueStore;

use super::{Phase, SessionShared, SessionSnapshot};

/// Result of a successful permission probe.
struct Acquired {
    cameras: Vec<CameraDescriptor>,
    camera: CameraDescriptor,
}

/// The scanning session state machine.
///
/// Cheap to clone; clones drive the same session. State changes go only
/// through the methods below and are broadcast to every
/// [`subscribe`](Self::subscribe) receiver.
#[derive(Clone)]
pub struct ScanSession {
    shared: Arc<SessionShared>,
    driver: Arc<Mutex<DecodeLoopController>>,
    media: Arc<dyn PlatformMedia>,
    inventory: CameraInventory,
    settings: Arc<SettingsStore>,
}

impl ScanSession {
    pub fn new(
        media: Arc<dyn PlatformMedia>,
        engines: Arc<dyn EngineFactory>,
        store: Arc<dyn KeyValueStore>,
        history: Arc<HistoryStore>,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared::new(history)),
            driver: Arc::new(Mutex::new(DecodeLoopController::new(engines))),
            inventory: CameraInventory::new(media.clone(), store),
            media,
            settings,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.state.lock().await;
        self.shared.snapshot_of(&state)
    }

    pub async fn phase(&self) -> Phase {
        self.shared.state.lock().await.phase
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.subscribe()
    }

    pub fn history(&self) -> Vec<ScanResult> {
        self.shared.history.entries()
    }

    pub fn inventory(&self) -> &CameraInventory {
        &self.inventory
    }

    /// Acquire a camera and start decoding.
    ///
    /// Valid from `Idle`, `PermissionDenied` and `Error`. Failures move the
    /// session to `PermissionDenied` or `Error`, record `last_error`, and are
    /// returned as well. A `stop()` issued while the permission prompt is
    /// pending wins: the session stays `Idle` and this returns its snapshot.
    pub async fn start(&self) -> Result<SessionSnapshot, ScanError> {
        let generation = {
            let mut state = self.shared.state.lock().await;
            if !state.phase.can_start() {
                return Err(ScanError::InvalidTransition {
                    operation: "start scanning",
                    phase: state.phase,
                });
            }
            let generation = state.begin_acquisition();
            self.shared.publish(&state);
            generation
        };

        info!("Acquiring camera permission");

        let acquired = match self.acquire(generation).await {
            Ok(Some(acquired)) => acquired,
            Ok(None) => return Ok(self.snapshot().await),
            Err(err) => {
                self.fail(generation, &err).await;
                return Err(err);
            }
        };

        match self.activate(generation, acquired).await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                self.fail(generation, &err).await;
                Err(err)
            }
        }
    }

    async fn acquire(&self, generation: u64) -> Result<Option<Acquired>, ScanError> {
        let caps = self.media.capabilities();
        if !caps.is_secure_context || !caps.has_camera_api() {
            return Err(capability_error(&caps));
        }
        let browser = detect_browser(&caps.user_agent);

        let constraints = CameraConstraints::default();
        let request = self.media.request_camera(&constraints);
        let granted = match self.settings.current().permission_timeout() {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| ScanError::PermissionTimeout(limit))?,
            None => request.await,
        };

        // The probe only confirms the grant; the engine opens its own stream
        let mut probe = granted.map_err(|err| err.into_scan_error(browser))?;
        probe.stop_tracks();
        drop(probe);

        if !self.shared.is_current(generation).await {
            info!("Camera acquisition superseded by stop");
            return Ok(None);
        }

        let cameras = self.inventory.enumerate().await;
        let Some(camera) = self.inventory.select(&cameras) else {
            return Err(MediaError::NotFound.into_scan_error(browser));
        };
        self.inventory.remember_selection(&camera.device_id);

        Ok(Some(Acquired { cameras, camera }))
    }

    async fn activate(
        &self,
        generation: u64,
        acquired: Acquired,
    ) -> Result<SessionSnapshot, ScanError> {
        let Acquired { cameras, camera } = acquired;

        // Held across the engine start so a concurrent stop waits for it and
        // then tears the new loop down.
        let mut driver = self.driver.lock().await;

        {
            let mut state = self.shared.state.lock().await;
            if !state.is_current(generation) {
                return Ok(self.shared.snapshot_of(&state));
            }
            state.available_cameras = cameras;
            state.selected_camera_id = Some(camera.device_id.clone());
        }
        self.shared.history.load();

        // A loop whose engine went away on its own is still registered
        if driver.is_running() {
            if let Err(err) = driver.stop_loop().await {
                warn!("Error reaping ended decode loop: {err:#}");
            }
        }

        let options = self.settings.decode_options();
        driver
            .start_loop(&camera.device_id, &options, self.shared.clone(), generation)
            .await
            .map_err(|err| ScanError::LoopStart(err.to_string()))?;

        let mut state = self.shared.state.lock().await;
        if !state.is_current(generation) {
            return Ok(self.shared.snapshot_of(&state));
        }
        if state.phase != Phase::AcquiringPermission {
            // The loop already failed the session before it became active
            return Err(ScanError::LoopStart(
                "decode engine closed its stream during start".into(),
            ));
        }

        let session_id = Uuid::new_v4().to_string();
        info!(
            "Scan session {} active on {} ({})",
            session_id,
            camera.device_id,
            if camera.label.is_empty() { "unlabelled" } else { camera.label.as_str() }
        );
        state.activate(session_id, camera.device_id);
        self.shared.publish(&state);
        Ok(self.shared.snapshot_of(&state))
    }

    /// Halt decoding and return to `Idle`. Valid from any phase, idempotent,
    /// never fails.
    pub async fn stop(&self) -> SessionSnapshot {
        {
            let mut state = self.shared.state.lock().await;
            let previous = state.phase;
            state.reset();
            self.shared.publish(&state);
            if previous != Phase::Idle {
                info!("Stopping scan session (was {:?})", previous);
            }
        }

        if let Err(err) = self.driver.lock().await.stop_loop().await {
            warn!("Error stopping decode loop: {err:#}");
        }

        self.snapshot().await
    }

    /// Restart the loop on `device_id`. Valid only while `Active`. A failed
    /// restart leaves the session stopped in `Error`.
    pub async fn switch_camera(&self, device_id: &str) -> Result<SessionSnapshot, ScanError> {
        let mut driver = self.driver.lock().await;

        let generation = {
            let state = self.shared.state.lock().await;
            if state.phase != Phase::Active {
                return Err(ScanError::InvalidTransition {
                    operation: "switch camera",
                    phase: state.phase,
                });
            }
            state.generation
        };

        info!("Switching camera to {}", device_id);

        if let Err(err) = driver.stop_loop().await {
            let err = ScanError::LoopRestart(format!("{err:#}"));
            self.fail(generation, &err).await;
            return Err(err);
        }

        {
            let mut state = self.shared.state.lock().await;
            if !state.is_current(generation) {
                // A stop landed while the old loop was shutting down
                return Ok(self.shared.snapshot_of(&state));
            }
            state.selected_camera_id = Some(device_id.to_owned());
        }
        self.inventory.remember_selection(device_id);

        let options = self.settings.decode_options();
        if let Err(err) = driver
            .start_loop(device_id, &options, self.shared.clone(), generation)
            .await
        {
            let err = ScanError::LoopRestart(err.to_string());
            self.fail(generation, &err).await;
            return Err(err);
        }

        let state = self.shared.state.lock().await;
        self.shared.publish(&state);
        Ok(self.shared.snapshot_of(&state))
    }

    pub async fn clear_error(&self) -> SessionSnapshot {
        let mut state = self.shared.state.lock().await;
        state.last_error = None;
        self.shared.publish(&state);
        self.shared.snapshot_of(&state)
    }

    /// Drop every history entry. `last_result` is left as is.
    pub async fn clear_history(&self) -> SessionSnapshot {
        let state = self.shared.state.lock().await;
        self.shared.history.clear();
        self.shared.publish(&state);
        self.shared.snapshot_of(&state)
    }

    /// Publish a result decoded outside the live loop (file decoding). Only
    /// `last_result` changes; the phase is untouched.
    pub async fn record_file_result(&self, result: ScanResult) -> SessionSnapshot {
        let mut state = self.shared.state.lock().await;
        state.last_result = Some(result);
        self.shared.publish(&state);
        self.shared.snapshot_of(&state)
    }

    /// Stop and release the live engine. Use on teardown.
    pub async fn dispose(&self) {
        self.stop().await;
        if let Err(err) = self.driver.lock().await.release().await {
            warn!("Error releasing decode engine: {err:#}");
        }
    }

    async fn fail(&self, generation: u64, err: &ScanError) {
        let mut state = self.shared.state.lock().await;
        if !state.is_current(generation) {
            return;
        }
        warn!("Scan session failed: {err}");
        state.fail(err);
        self.shared.publish(&state);
    }
}

fn capability_error(caps: &MediaCapabilities) -> ScanError {
    let support = check_support(caps);
    ScanError::Capability {
        message: support
            .error_message
            .unwrap_or_else(|| "Camera access is not supported in this browser".into()),
        remediation: support.suggestions,
    }
}
