//! Avatar uploads: the `ObjectStorage` seam, its Firebase Storage
//! implementation, and the cancellable `UploadHandle` task.

pub mod firebase;
pub mod provider;
pub mod task;

pub use firebase::FirebaseStorage;
pub use provider::{ObjectStorage, StorageError, StoredObject, TransferProgress};
pub use task::{UploadEvent, UploadHandle};

use std::io;
use std::path::Path;

use crate::core::model::AvatarFile;

/// Read a local image into memory, keeping its file name for the storage key.
pub async fn read_avatar_file(path: &Path) -> io::Result<AvatarFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string();
    let bytes = tokio::fs::read(path).await?;
    Ok(AvatarFile::new(name, bytes))
}
