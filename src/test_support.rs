//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiError, ProfileBackend};
use crate::core::model::{ListingSummary, ProfileChanges, UserSession};
use crate::storage::{ObjectStorage, StorageError, StoredObject, TransferProgress};

pub fn alice() -> UserSession {
    UserSession {
        id: "u1".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        avatar_url: "https://img/alice.png".to_string(),
    }
}

pub fn listing(id: &str, name: &str) -> ListingSummary {
    ListingSummary {
        id: id.to_string(),
        name: name.to_string(),
        image_urls: vec![format!("https://img/{id}.png")],
        owner_id: "u1".to_string(),
    }
}

/// Backend returning canned results and counting calls per endpoint.
pub struct FakeBackend {
    update: Result<UserSession, ApiError>,
    delete_user: Result<(), ApiError>,
    sign_out: Result<(), ApiError>,
    listings: Result<Vec<ListingSummary>, ApiError>,
    delete_listing: Result<(), ApiError>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            update: Ok(alice()),
            delete_user: Ok(()),
            sign_out: Ok(()),
            listings: Ok(Vec::new()),
            delete_listing: Ok(()),
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl FakeBackend {
    pub fn with_update(mut self, result: Result<UserSession, ApiError>) -> Self {
        self.update = result;
        self
    }

    pub fn with_delete_user(mut self, result: Result<(), ApiError>) -> Self {
        self.delete_user = result;
        self
    }

    pub fn with_listings(mut self, result: Result<Vec<ListingSummary>, ApiError>) -> Self {
        self.listings = result;
        self
    }

    pub fn with_delete_listing(mut self, result: Result<(), ApiError>) -> Self {
        self.delete_listing = result;
        self
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
    }
}

#[async_trait]
impl ProfileBackend for FakeBackend {
    async fn update_user(
        &self,
        _user_id: &str,
        _changes: &ProfileChanges,
    ) -> Result<UserSession, ApiError> {
        self.record("update_user");
        self.update.clone()
    }

    async fn delete_user(&self, _user_id: &str) -> Result<(), ApiError> {
        self.record("delete_user");
        self.delete_user.clone()
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.record("sign_out");
        self.sign_out.clone()
    }

    async fn user_listings(&self, _user_id: &str) -> Result<Vec<ListingSummary>, ApiError> {
        self.record("user_listings");
        self.listings.clone()
    }

    async fn delete_listing(&self, _listing_id: &str) -> Result<(), ApiError> {
        self.record("delete_listing");
        self.delete_listing.clone()
    }
}

enum StorageScript {
    Steps { steps: Vec<u64>, total: u64 },
    Fail(StorageError),
    Stall,
}

/// Storage that reports scripted progress and resolves to `https://cdn.test/<key>`.
pub struct FakeStorage {
    script: StorageScript,
}

impl FakeStorage {
    pub fn with_steps(steps: &[u64], total: u64) -> Self {
        Self {
            script: StorageScript::Steps {
                steps: steps.to_vec(),
                total,
            },
        }
    }

    pub fn failing(error: StorageError) -> Self {
        Self {
            script: StorageScript::Fail(error),
        }
    }

    /// Never finishes uploading.
    pub fn stalled() -> Self {
        Self {
            script: StorageScript::Stall,
        }
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    fn name(&self) -> &str {
        "fake"
    }

    async fn upload(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<StoredObject, StorageError> {
        match &self.script {
            StorageScript::Steps { steps, total } => {
                for &bytes_transferred in steps {
                    let _ = progress.send(TransferProgress {
                        bytes_transferred,
                        total_bytes: *total,
                    });
                }
                Ok(StoredObject {
                    name: key.to_string(),
                    bucket: "test-bucket".to_string(),
                    download_token: Some("tok".to_string()),
                })
            }
            StorageScript::Fail(error) => Err(error.clone()),
            StorageScript::Stall => futures::future::pending().await,
        }
    }

    async fn download_url(&self, object: &StoredObject) -> Result<String, StorageError> {
        Ok(format!("https://cdn.test/{}", object.name))
    }
}
