use serde::{Deserialize, Serialize};

use crate::error::{ErrorInfo, ScanError};
use crate::models::{CameraDescriptor, ScanResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    AcquiringPermission,
    PermissionDenied,
    Active,
    Error,
}

impl Phase {
    pub fn can_start(&self) -> bool {
        matches!(self, Phase::Idle | Phase::PermissionDenied | Phase::Error)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub phase: Phase,
    /// Assigned each time acquisition succeeds; correlates log lines.
    pub session_id: Option<String>,
    pub selected_camera_id: Option<String>,
    pub available_cameras: Vec<CameraDescriptor>,
    pub last_result: Option<ScanResult>,
    pub last_error: Option<ErrorInfo>,
    /// Bumped by every transition that invalidates in-flight work (start,
    /// stop). Decode events and acquisitions tagged with an older value are
    /// discarded.
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Whether a decode loop tagged `generation` may still write results.
    pub(crate) fn accepts_events(&self, generation: u64) -> bool {
        self.is_current(generation)
            && matches!(self.phase, Phase::Active | Phase::AcquiringPermission)
    }

    pub(crate) fn begin_acquisition(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::AcquiringPermission;
        self.last_error = None;
        self.generation
    }

    pub(crate) fn activate(&mut self, session_id: String, camera_id: String) {
        self.phase = Phase::Active;
        self.session_id = Some(session_id);
        self.selected_camera_id = Some(camera_id);
    }

    pub(crate) fn fail(&mut self, err: &ScanError) {
        self.phase = err.failure_phase();
        self.last_error = Some(err.info());
    }

    /// Back to Idle. Keeps the last result, the camera choice and the device
    /// list.
    pub(crate) fn reset(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Idle;
        self.session_id = None;
        self.last_error = None;
        self.generation
    }
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: SessionState,
    pub history: Vec<ScanResult>,
}

impl SessionSnapshot {
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_scanning(&self) -> bool {
        self.state.phase == Phase::Active
    }

    pub fn is_loading(&self) -> bool {
        self.state.phase == Phase::AcquiringPermission
    }
}
