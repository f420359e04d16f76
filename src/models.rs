use serde::{Deserialize, Serialize};

use crate::errors::SyncError;

/// Lifecycle of one sync operation as the UI layer renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// A status transition handed to the UI: phase plus a human-readable
/// message. The core produces these; rendering is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub message: String,
}

impl SyncStatus {
    pub fn idle() -> Self {
        Self {
            phase: SyncPhase::Idle,
            message: String::new(),
        }
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            phase: SyncPhase::Loading,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            phase: SyncPhase::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: SyncPhase::Error,
            message: message.into(),
        }
    }

    /// Maps a sync failure to its UI presentation. A missing backup is an
    /// expected first-run state and is not presented as a failure.
    pub fn for_error(error: &SyncError) -> Self {
        if error.is_not_found() {
            Self {
                phase: SyncPhase::Idle,
                message: "No backup found on the server yet.".to_string(),
            }
        } else {
            Self::error(error.to_string())
        }
    }
}

/// Receipt for a completed backup: the filename it was written under and
/// any older backups the retention pass removed.
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    pub filename: String,
    pub pruned: Vec<String>,
}
