//! reqwest implementation of `ProfileBackend`.
//!
//! Every endpoint answers JSON. A body of the form
//! `{ "success": false, "message": "..." }` is an application-level failure,
//! whatever the HTTP status. Credentials travel as cookies: the configured
//! session cookie is seeded into the client's cookie jar, and cookies the
//! server sets are kept for later requests.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::cookie::Jar;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ProfileBackend};
use super::types::{FailureEnvelope, ListingRecord, UpdateUserBody, UserRecord};
use crate::core::model::{ListingSummary, ProfileChanges, UserSession};

const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";

pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Build a client for `base_url`, optionally seeding a session cookie
    /// such as `access_token=...`.
    pub fn new(base_url: impl Into<String>, session_cookie: Option<&str>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let url = Url::parse(&base_url).map_err(|e| ApiError::Config(format!("bad base URL '{base_url}': {e}")))?;

        let jar = Jar::default();
        if let Some(cookie) = session_cookie {
            jar.add_cookie_str(cookie, &url);
        }

        let client = Client::builder()
            .cookie_provider(Arc::new(jar))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        info!("API client ready for {}", base_url);
        Ok(Self { base_url, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return `(status, body)`.
    async fn send(&self, request: RequestBuilder) -> Result<(u16, String), ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!("API response: HTTP {} ({} bytes)", status, body.len());
        Ok((status, body))
    }
}

/// Decode a response body into `T`, honoring the failure envelope.
pub(crate) fn interpret<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    check_failure(status, body)?;
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Like `interpret`, for endpoints whose success payload is ignored.
pub(crate) fn confirm(status: u16, body: &str) -> Result<(), ApiError> {
    check_failure(status, body)?;
    if body.trim().is_empty() {
        return Ok(());
    }
    serde_json::from_str::<serde_json::Value>(body)
        .map(|_| ())
        .map_err(|e| ApiError::Parse(e.to_string()))
}

fn check_failure(status: u16, body: &str) -> Result<(), ApiError> {
    if let Ok(envelope) = serde_json::from_str::<FailureEnvelope>(body)
        && envelope.success == Some(false)
    {
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        warn!("Backend rejected request (HTTP {}): {}", status, message);
        return Err(ApiError::Rejected(message));
    }
    if !(200..300).contains(&status) {
        warn!("Backend error: HTTP {} - {}", status, body);
        return Err(ApiError::Api {
            status,
            message: body.trim().to_string(),
        });
    }
    Ok(())
}

#[async_trait]
impl ProfileBackend for HttpBackend {
    async fn update_user(
        &self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<UserSession, ApiError> {
        info!("Updating user {}", user_id);
        let request = self
            .client
            .post(self.url(&format!("/api/user/update/{user_id}")))
            .json(&UpdateUserBody::from(changes));
        let (status, body) = self.send(request).await?;
        interpret::<UserRecord>(status, &body).map(UserSession::from)
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        info!("Deleting user {}", user_id);
        let request = self
            .client
            .delete(self.url(&format!("/api/user/delete/{user_id}")));
        let (status, body) = self.send(request).await?;
        confirm(status, &body)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        info!("Signing out");
        let request = self.client.get(self.url("/api/auth/signOut"));
        let (status, body) = self.send(request).await?;
        confirm(status, &body)
    }

    async fn user_listings(&self, user_id: &str) -> Result<Vec<ListingSummary>, ApiError> {
        info!("Fetching listings for user {}", user_id);
        let request = self
            .client
            .get(self.url(&format!("/api/user/listings/{user_id}")));
        let (status, body) = self.send(request).await?;
        let records: Vec<ListingRecord> = interpret(status, &body)?;
        Ok(records.into_iter().map(ListingSummary::from).collect())
    }

    async fn delete_listing(&self, listing_id: &str) -> Result<(), ApiError> {
        info!("Deleting listing {}", listing_id);
        let request = self
            .client
            .delete(self.url(&format!("/api/listing/delete/{listing_id}")));
        let (status, body) = self.send(request).await?;
        confirm(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_envelope_wins_over_status() {
        let body = r#"{"success":false,"statusCode":409,"message":"Email taken"}"#;
        let err = interpret::<serde_json::Value>(200, body).unwrap_err();
        assert_eq!(err, ApiError::Rejected("Email taken".to_string()));

        let err = confirm(409, body).unwrap_err();
        assert_eq!(err, ApiError::Rejected("Email taken".to_string()));
    }

    #[test]
    fn test_failure_envelope_without_message() {
        let err = confirm(500, r#"{"success":false}"#).unwrap_err();
        assert_eq!(err, ApiError::Rejected("Request failed".to_string()));
    }

    #[test]
    fn test_plain_http_error() {
        let err = confirm(502, "Bad Gateway").unwrap_err();
        assert_eq!(
            err,
            ApiError::Api {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn test_array_body_is_not_an_envelope() {
        let listings: Vec<ListingRecord> =
            interpret(200, r#"[{"_id":"l1","name":"Loft","imageUrls":[],"userRef":"u1"}]"#).unwrap();
        assert_eq!(listings.len(), 1);
    }

    #[test]
    fn test_confirm_accepts_string_and_empty_bodies() {
        assert!(confirm(200, r#""User has been logged out!""#).is_ok());
        assert!(confirm(200, "").is_ok());
        assert!(confirm(200, r#"{"success":true}"#).is_ok());
    }

    #[test]
    fn test_undecodable_success_is_parse_error() {
        let err = interpret::<UserRecord>(200, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_bad_base_url_is_config_error() {
        assert!(matches!(
            HttpBackend::new("not a url", None),
            Err(ApiError::Config(_))
        ));
    }
}
