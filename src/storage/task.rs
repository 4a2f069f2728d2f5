//! # Upload Task
//!
//! Runs one upload on a tokio task and exposes it as a sequence of events:
//!
//! ```text
//! Progress, Progress, ..., Completed { url } | Failed(message)
//! ```
//!
//! Exactly one terminal event is sent, always after the last progress
//! event. `cancel()` aborts the transfer; no terminal event follows.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::provider::{ObjectStorage, TransferProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress(TransferProgress),
    Completed { url: String },
    Failed(String),
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

pub struct UploadHandle {
    events: mpsc::UnboundedReceiver<UploadEvent>,
    task: AbortHandle,
}

impl UploadHandle {
    /// Start uploading `bytes` under `key`. Must be called inside a tokio runtime.
    pub fn spawn(storage: Arc<dyn ObjectStorage>, key: String, bytes: Vec<u8>) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_upload(storage, key, bytes, events_tx));
        Self {
            events,
            task: task.abort_handle(),
        }
    }

    /// Next event, or `None` once the task has finished and all events were read.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        self.events.recv().await
    }

    /// Abort the transfer.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.task.clone()
    }
}

async fn run_upload(
    storage: Arc<dyn ObjectStorage>,
    key: String,
    bytes: Vec<u8>,
    events: mpsc::UnboundedSender<UploadEvent>,
) {
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let forward = |progress: TransferProgress| {
        debug!(
            "Upload '{}': {}/{} bytes",
            key, progress.bytes_transferred, progress.total_bytes
        );
        let _ = events.send(UploadEvent::Progress(progress));
    };

    let upload = storage.upload(&key, bytes, progress_tx);
    tokio::pin!(upload);

    let stored = loop {
        tokio::select! {
            biased;
            Some(progress) = progress_rx.recv() => forward(progress),
            result = &mut upload => break result,
        }
    };
    // Progress reported right before completion is still queued.
    while let Ok(progress) = progress_rx.try_recv() {
        forward(progress);
    }

    let terminal = match stored {
        Ok(object) => match storage.download_url(&object).await {
            Ok(url) => {
                info!("Upload '{}' available at {}", key, url);
                UploadEvent::Completed { url }
            }
            Err(e) => {
                warn!("Upload '{}' stored but URL unresolved: {}", key, e);
                UploadEvent::Failed(e.to_string())
            }
        },
        Err(e) => {
            warn!("Upload '{}' failed on {}: {}", key, storage.name(), e);
            UploadEvent::Failed(e.to_string())
        }
    };
    if events.send(terminal).is_err() {
        debug!("Upload '{}' finished after its handle was dropped", key);
    }
}
