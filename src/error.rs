use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::Phase;

/// Why the platform refused or failed to hand over a camera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PermissionFailure {
    Denied,
    NoDevice,
    Unsupported,
    InUse,
}

impl PermissionFailure {
    pub fn message(&self) -> &'static str {
        match self {
            PermissionFailure::Denied => {
                "Camera access denied. Please allow camera access and try again."
            }
            PermissionFailure::NoDevice => {
                "No camera found. Please connect a camera and try again."
            }
            PermissionFailure::Unsupported => "Camera is not supported in this browser.",
            PermissionFailure::InUse => "Camera is already in use by another application.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    /// Secure context or camera API missing. Retrying only helps after the
    /// environment changes.
    #[error("{message}")]
    Capability {
        message: String,
        remediation: Vec<String>,
    },

    #[error("{}", .failure.message())]
    Permission {
        failure: PermissionFailure,
        remediation: Vec<String>,
    },

    #[error("camera permission prompt did not resolve within {0:?}")]
    PermissionTimeout(Duration),

    #[error("Camera error: {0}")]
    Acquisition(String),

    #[error("failed to start decode loop: {0}")]
    LoopStart(String),

    #[error("failed to switch camera: {0}")]
    LoopRestart(String),

    /// Engine-reported failure while the loop is running. Surfaced through
    /// `last_error` only.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("failed to scan file: {0}")]
    FileDecode(String),

    #[error("{0}")]
    InvalidFile(String),

    #[error("cannot {operation} while {phase:?}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    #[error("decode engine unavailable: {0}")]
    Engine(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Capability,
    Permission,
    Acquisition,
    LoopRestart,
    Decode,
    FileDecode,
    InvalidRequest,
}

/// Serializable form of a surfaced error, as exposed in session snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub remediation: Vec<String>,
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::Capability { .. } => ErrorKind::Capability,
            ScanError::Permission { .. } => ErrorKind::Permission,
            ScanError::PermissionTimeout(_)
            | ScanError::Acquisition(_)
            | ScanError::LoopStart(_)
            | ScanError::Engine(_) => ErrorKind::Acquisition,
            ScanError::LoopRestart(_) => ErrorKind::LoopRestart,
            ScanError::Decode(_) => ErrorKind::Decode,
            ScanError::FileDecode(_) => ErrorKind::FileDecode,
            ScanError::InvalidFile(_) | ScanError::InvalidTransition { .. } => {
                ErrorKind::InvalidRequest
            }
        }
    }

    pub fn remediation(&self) -> &[String] {
        match self {
            ScanError::Capability { remediation, .. }
            | ScanError::Permission { remediation, .. } => remediation,
            _ => &[],
        }
    }

    /// Phase a session lands in when this error aborts acquisition or a
    /// loop restart.
    pub fn failure_phase(&self) -> Phase {
        match self {
            ScanError::Permission { .. } => Phase::PermissionDenied,
            _ => Phase::Error,
        }
    }

    pub fn info(&self) -> ErrorInfo {
        ErrorInfo {
            kind: self.kind(),
            message: self.to_string(),
            remediation: self.remediation().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_errors_land_in_permission_denied() {
        let err = ScanError::Permission {
            failure: PermissionFailure::Denied,
            remediation: vec!["Allow camera access".into()],
        };
        assert_eq!(err.failure_phase(), Phase::PermissionDenied);
        let info = err.info();
        assert_eq!(info.kind, ErrorKind::Permission);
        assert_eq!(
            info.message,
            "Camera access denied. Please allow camera access and try again."
        );
        assert_eq!(info.remediation, vec!["Allow camera access".to_owned()]);
    }

    #[test]
    fn test_other_failures_land_in_error() {
        assert_eq!(
            ScanError::LoopRestart("device lost".into()).failure_phase(),
            Phase::Error
        );
        assert_eq!(
            ScanError::Capability {
                message: "Camera access requires HTTPS".into(),
                remediation: vec![],
            }
            .failure_phase(),
            Phase::Error
        );
        assert!(ScanError::Decode("x".into()).remediation().is_empty());
    }
}
