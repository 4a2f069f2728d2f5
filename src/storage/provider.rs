use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

/// Errors that can occur while storing or resolving an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage misconfigured (bad base URL, bucket).
    Config(String),
    /// Network-level failure.
    Network(String),
    /// Storage service answered with an error status.
    Api { status: u16, message: String },
    /// Response could not be understood.
    Parse(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Config(msg) => write!(f, "storage config error: {msg}"),
            StorageError::Network(msg) => write!(f, "storage network error: {msg}"),
            StorageError::Api { status, message } => {
                write!(f, "storage error (HTTP {status}): {message}")
            }
            StorageError::Parse(msg) => write!(f, "storage parse error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Bytes handed to the transport so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

/// Handle on an object that finished uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    pub bucket: String,
    pub download_token: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Returns the name of the storage backend.
    fn name(&self) -> &str;

    /// Store `bytes` under `key`, reporting progress on `progress`.
    /// The sender is dropped when the transfer ends.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<StoredObject, StorageError>;

    /// Resolve a publicly fetchable URL for a stored object.
    async fn download_url(&self, object: &StoredObject) -> Result<String, StorageError>;
}
