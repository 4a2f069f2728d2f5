//! # Avatar Upload State Machine
//!
//! ```text
//! Idle ──select──▶ InProgress ──complete──▶ Succeeded
//!                      │
//!                      └──────error──────▶ Failed
//! ```
//!
//! Each upload carries an id. Selecting another file starts a new upload
//! with a fresh id, and events tagged with an older id are dropped.

use chrono::{DateTime, Utc};

use crate::core::model::UploadProgress;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    InProgress {
        upload_id: u64,
        percent: u8,
    },
    Succeeded {
        upload_id: u64,
        url: String,
    },
    Failed {
        upload_id: u64,
        message: String,
    },
}

impl UploadPhase {
    /// Id of the upload this phase belongs to (`None` when idle).
    pub fn upload_id(&self) -> Option<u64> {
        match self {
            UploadPhase::Idle => None,
            UploadPhase::InProgress { upload_id, .. }
            | UploadPhase::Succeeded { upload_id, .. }
            | UploadPhase::Failed { upload_id, .. } => Some(*upload_id),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, UploadPhase::InProgress { .. })
    }

    pub fn progress(&self) -> UploadProgress {
        match self {
            UploadPhase::Idle => UploadProgress::default(),
            UploadPhase::InProgress { percent, .. } => UploadProgress {
                percent_complete: *percent,
                failed: false,
            },
            UploadPhase::Succeeded { .. } => UploadProgress {
                percent_complete: 100,
                failed: false,
            },
            UploadPhase::Failed { .. } => UploadProgress {
                percent_complete: 0,
                failed: true,
            },
        }
    }

    /// One-line status for the profile page. Empty when there is nothing to say.
    pub fn status_text(&self) -> String {
        match self {
            UploadPhase::Idle => String::new(),
            UploadPhase::InProgress { percent: 0, .. } => String::new(),
            UploadPhase::InProgress { percent: 100, .. } | UploadPhase::Succeeded { .. } => {
                "Image successfully uploaded!".to_string()
            }
            UploadPhase::InProgress { percent, .. } => format!("Uploading {}%", percent),
            UploadPhase::Failed { .. } => {
                "Error Image upload (image must be less than 2 mb)".to_string()
            }
        }
    }
}

/// Storage key for an uploaded file: unix millis followed by the original name.
///
/// Collisions are only avoided by the timestamp, which is good enough for
/// one user picking files by hand.
pub fn storage_key(file_name: &str, selected_at: DateTime<Utc>) -> String {
    format!("{}{}", selected_at.timestamp_millis(), file_name)
}

/// `bytes_transferred / total_bytes * 100`, rounded, clamped to 0..=100.
pub fn percent_complete(bytes_transferred: u64, total_bytes: u64) -> u8 {
    if total_bytes == 0 {
        return 0;
    }
    let ratio = bytes_transferred as f64 / total_bytes as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
