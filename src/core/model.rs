//! # Domain Model
//!
//! Plain data types shared by the store, the reducer, and the adapters.
//!
//! ```text
//! UserSession      // who is signed in (owned by the SessionStore)
//! PendingEdit      // unsaved overlay of profile fields (owned by ProfileState)
//! ProfileChanges   // PendingEdit merged over UserSession, ready to send
//! ListingSummary   // one of the user's listings, display only
//! UploadProgress   // percentage + failure flag of the current avatar upload
//! AvatarFile       // a file picked by the user, bytes already in memory
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// The signed-in user's identity as held client-side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

/// Profile fields the user can type into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Username,
    Email,
    Password,
}

impl ProfileField {
    pub const ALL: [ProfileField; 3] = [Self::Username, Self::Email, Self::Password];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Local edits not yet persisted. `None` means "keep the session value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEdit {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
}

impl PendingEdit {
    pub fn set(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::Username => self.username = Some(value),
            ProfileField::Email => self.email = Some(value),
            ProfileField::Password => self.password = Some(value),
        }
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Username => self.username.as_deref(),
            ProfileField::Email => self.email.as_deref(),
            ProfileField::Password => self.password.as_deref(),
        }
    }

    pub fn stage_avatar(&mut self, url: String) {
        self.avatar_url = Some(url);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Forget the edits that `sent` carried, keeping any field changed since.
    pub fn discard_sent(&mut self, sent: &PendingEdit) {
        fn discard(slot: &mut Option<String>, sent: &Option<String>) {
            if sent.is_some() && slot == sent {
                *slot = None;
            }
        }
        discard(&mut self.username, &sent.username);
        discard(&mut self.email, &sent.email);
        discard(&mut self.password, &sent.password);
        discard(&mut self.avatar_url, &sent.avatar_url);
    }

    /// Overlay these edits on the session to build a full update request.
    /// An empty password is treated as "not edited".
    pub fn merged_over(&self, session: &UserSession) -> ProfileChanges {
        ProfileChanges {
            username: self
                .username
                .clone()
                .unwrap_or_else(|| session.username.clone()),
            email: self.email.clone().unwrap_or_else(|| session.email.clone()),
            avatar_url: self
                .avatar_url
                .clone()
                .unwrap_or_else(|| session.avatar_url.clone()),
            password: self.password.clone().filter(|p| !p.is_empty()),
        }
    }
}

/// The body of a profile update, after merging edits over the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub password: Option<String>,
}

/// A property listing owned by the current user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub id: String,
    pub name: String,
    pub image_urls: Vec<String>,
    pub owner_id: String,
}

impl ListingSummary {
    /// First image, used as the listing's cover.
    pub fn cover_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// What the UI shows about the avatar upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub percent_complete: u8,
    pub failed: bool,
}

/// A user-chosen image, read into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl AvatarFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

// Manual Debug so logged actions don't dump image bytes.
impl fmt::Debug for AvatarFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> UserSession {
        UserSession {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar_url: "https://img/alice.png".to_string(),
        }
    }

    #[test]
    fn test_merged_over_keeps_session_values_when_untouched() {
        let changes = PendingEdit::default().merged_over(&session());
        assert_eq!(changes.username, "alice");
        assert_eq!(changes.email, "alice@example.com");
        assert_eq!(changes.avatar_url, "https://img/alice.png");
        assert_eq!(changes.password, None);
    }

    #[test]
    fn test_discard_sent_keeps_later_edits() {
        let mut pending = PendingEdit::default();
        pending.set(ProfileField::Username, "alicia".to_string());
        pending.set(ProfileField::Email, "old@example.com".to_string());
        let sent = pending.clone();

        pending.set(ProfileField::Email, "late@example.com".to_string());
        pending.stage_avatar("https://img/new.png".to_string());
        pending.discard_sent(&sent);

        assert_eq!(pending.username, None);
        assert_eq!(pending.email.as_deref(), Some("late@example.com"));
        assert_eq!(pending.avatar_url.as_deref(), Some("https://img/new.png"));
    }

    #[test]
    fn test_edits_accumulate() {
        let mut pending = PendingEdit::default();
        pending.set(ProfileField::Username, "alicia".to_string());
        pending.set(ProfileField::Email, "alicia@example.com".to_string());
        pending.stage_avatar("https://img/new.png".to_string());

        let changes = pending.merged_over(&session());
        assert_eq!(changes.username, "alicia");
        assert_eq!(changes.email, "alicia@example.com");
        assert_eq!(changes.avatar_url, "https://img/new.png");
    }

    #[test]
    fn test_empty_password_is_not_sent() {
        let mut pending = PendingEdit::default();
        pending.set(ProfileField::Password, String::new());
        assert_eq!(pending.merged_over(&session()).password, None);

        pending.set(ProfileField::Password, "hunter2".to_string());
        assert_eq!(
            pending.merged_over(&session()).password.as_deref(),
            Some("hunter2")
        );
    }

    #[test]
    fn test_cover_image_is_first_url() {
        let listing = ListingSummary {
            id: "l1".to_string(),
            name: "Cabin".to_string(),
            image_urls: vec!["a.png".to_string(), "b.png".to_string()],
            owner_id: "u1".to_string(),
        };
        assert_eq!(listing.cover_image(), Some("a.png"));
    }

    #[test]
    fn test_avatar_debug_hides_bytes() {
        let file = AvatarFile::new("me.png", vec![0u8; 2048]);
        let debug = format!("{:?}", file);
        assert!(debug.contains("me.png"));
        assert!(debug.contains("2048"));
    }
}
