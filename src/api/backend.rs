use std::fmt;

use async_trait::async_trait;

use crate::core::model::{ListingSummary, ProfileChanges, UserSession};

/// Errors from the REST backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Client misconfigured (bad base URL, bad cookie).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The backend answered `{ "success": false, "message": ... }`.
    Rejected(String),
    /// Non-2xx response without a failure envelope.
    Api { status: u16, message: String },
    /// Response body could not be decoded.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            // Shown to the user verbatim.
            ApiError::Rejected(msg) => f.write_str(msg),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The user and listing endpoints the profile page talks to.
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    /// `POST /api/user/update/{user_id}`; returns the updated user record.
    async fn update_user(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<UserSession, ApiError>;

    /// `DELETE /api/user/delete/{user_id}`
    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError>;

    /// `GET /api/auth/signOut`
    async fn sign_out(&self) -> Result<(), ApiError>;

    /// `GET /api/user/listings/{user_id}`
    async fn user_listings(&self, user_id: &str) -> Result<Vec<ListingSummary>, ApiError>;

    /// `DELETE /api/listing/delete/{listing_id}`
    async fn delete_listing(&self, listing_id: &str) -> Result<(), ApiError>;
}
