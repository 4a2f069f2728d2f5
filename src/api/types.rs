//! Wire types for the listing backend's JSON.
//!
//! Records use Mongo-style `_id` keys and camelCase field names; they are
//! converted into the domain types in `core::model` at the boundary.

use serde::{Deserialize, Serialize};

use crate::core::model::{ListingSummary, ProfileChanges, UserSession};

/// User document as returned by `/api/user/update/{id}`.
#[derive(Deserialize, Debug, Clone)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

impl From<UserRecord> for UserSession {
    fn from(record: UserRecord) -> Self {
        UserSession {
            id: record.id,
            username: record.username,
            email: record.email,
            avatar_url: record.avatar,
        }
    }
}

/// Listing document; only the fields the profile page shows are kept.
#[derive(Deserialize, Debug, Clone)]
pub struct ListingRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "imageUrls", default)]
    pub image_urls: Vec<String>,
    #[serde(rename = "userRef", default)]
    pub user_ref: String,
}

impl From<ListingRecord> for ListingSummary {
    fn from(record: ListingRecord) -> Self {
        ListingSummary {
            id: record.id,
            name: record.name,
            image_urls: record.image_urls,
            owner_id: record.user_ref,
        }
    }
}

/// Body of `POST /api/user/update/{id}`.
#[derive(Serialize, Debug)]
pub struct UpdateUserBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub avatar: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

impl<'a> From<&'a ProfileChanges> for UpdateUserBody<'a> {
    fn from(changes: &'a ProfileChanges) -> Self {
        UpdateUserBody {
            username: &changes.username,
            email: &changes.email,
            avatar: &changes.avatar_url,
            password: changes.password.as_deref(),
        }
    }
}

/// The backend's error envelope: `{ "success": false, "message": ..., "statusCode": ... }`.
#[derive(Deserialize, Debug)]
pub struct FailureEnvelope {
    pub success: Option<bool>,
    pub message: Option<String>,
}
