//! Object storage over the Firebase Storage REST protocol.
//!
//! - Upload: `POST {base}/v0/b/{bucket}/o?name={key}` with the raw bytes
//! - Metadata: `GET {base}/v0/b/{bucket}/o/{name}`
//! - Public URL: `{base}/v0/b/{bucket}/o/{name}?alt=media&token={token}`
//!
//! Object names are a single path segment, so `/` inside a name is
//! percent-encoded as `%2F`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Client, RequestBuilder, Url};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;

use super::provider::{ObjectStorage, StorageError, StoredObject, TransferProgress};

/// Bytes handed to the transport between two progress reports.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Object metadata returned by upload and metadata requests.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    bucket: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl ObjectMetadata {
    fn first_token(&self) -> Option<String> {
        self.download_tokens.as_deref().and_then(|tokens| {
            tokens
                .split(',')
                .map(str::trim)
                .find(|t| !t.is_empty())
                .map(str::to_string)
        })
    }
}

pub struct FirebaseStorage {
    base_url: String,
    bucket: String,
    auth_token: Option<String>,
    client: Client,
}

impl FirebaseStorage {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            auth_token,
            client: Client::new(),
        }
    }

    /// `{base}/v0/b/{bucket}/o[/{name}]`
    fn object_url(&self, bucket: &str, name: Option<&str>) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StorageError::Config(format!("bad base URL '{}': {e}", self.base_url)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::Config(format!("base URL cannot be a base: {}", self.base_url)))?;
            segments.pop_if_empty().extend(["v0", "b", bucket, "o"]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_metadata(
        &self,
        response: reqwest::Response,
    ) -> Result<ObjectMetadata, StorageError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;
        if !status.is_success() {
            warn!("Storage error: {} - {}", status, body);
            return Err(StorageError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        serde_json::from_str(&body).map_err(|e| StorageError::Parse(e.to_string()))
    }

    async fn fetch_token(&self, object: &StoredObject) -> Result<String, StorageError> {
        debug!("Fetching metadata for {} to resolve a download token", object.name);
        let url = self.object_url(&object.bucket, Some(&object.name))?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;
        let metadata = self.read_metadata(response).await?;
        metadata
            .first_token()
            .ok_or_else(|| StorageError::Parse(format!("object '{}' has no download token", object.name)))
    }
}

/// Guess a content type from the file extension.
fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Stream `bytes` as a body in `CHUNK_SIZE` slices, reporting progress per
/// slice. Slices share the one buffer.
fn progress_body(bytes: Vec<u8>, progress: UnboundedSender<TransferProgress>) -> Body {
    let bytes = Bytes::from(bytes);
    let total_bytes = bytes.len() as u64;
    let stream = futures::stream::iter((0..bytes.len()).step_by(CHUNK_SIZE)).map(move |start| {
        let chunk = bytes.slice(start..(start + CHUNK_SIZE).min(bytes.len()));
        // The receiver may be gone if the upload was cancelled.
        let _ = progress.send(TransferProgress {
            bytes_transferred: (start + chunk.len()) as u64,
            total_bytes,
        });
        Ok::<_, std::io::Error>(chunk)
    });
    Body::wrap_stream(stream)
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    fn name(&self) -> &str {
        "firebase"
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<StoredObject, StorageError> {
        let mut url = self.object_url(&self.bucket, None)?;
        url.query_pairs_mut().append_pair("name", key);

        info!(
            "Uploading '{}' ({} bytes) to bucket {}",
            key,
            bytes.len(),
            self.bucket
        );

        let response = self
            .authorize(self.client.post(url))
            .header(CONTENT_TYPE, content_type_for(key))
            .body(progress_body(bytes, progress))
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let metadata = self.read_metadata(response).await?;
        debug!("Upload stored as {}/{}", metadata.bucket, metadata.name);
        let download_token = metadata.first_token();
        Ok(StoredObject {
            name: metadata.name,
            bucket: metadata.bucket,
            download_token,
        })
    }

    async fn download_url(&self, object: &StoredObject) -> Result<String, StorageError> {
        let token = match &object.download_token {
            Some(token) => token.clone(),
            None => self.fetch_token(object).await?,
        };
        let mut url = self.object_url(&object.bucket, Some(&object.name))?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", &token);
        Ok(url.to_string())
    }
}
