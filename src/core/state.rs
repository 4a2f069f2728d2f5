//! # Profile View State
//!
//! Everything the profile page owns locally. The signed-in user, the
//! loading flag and the error message live in the shared `SessionStore`,
//! not here.
//!
//! ```text
//! ProfileState
//! ├── pending: PendingEdit             // unsaved field edits + staged avatar
//! ├── submitted: PendingEdit           // edits carried by the latest submit
//! ├── upload: UploadPhase              // avatar upload state machine
//! ├── update_success: bool             // last submit succeeded
//! ├── show_listings: bool              // listings panel visible
//! ├── listings_error: bool             // last listings fetch failed
//! ├── listings: Vec<ListingSummary>    // the user's listings, display only
//! ├── submit_seq: u64                  // latest issued submit request
//! ├── upload_seq: u64                  // latest started upload
//! └── listings_seq: u64                // latest issued listings fetch
//! ```
//!
//! State changes only happen through `update()` in action.rs.

use crate::core::model::{ListingSummary, PendingEdit, UploadProgress};
use crate::core::upload::UploadPhase;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
    pub pending: PendingEdit,
    pub(crate) submitted: PendingEdit,
    pub upload: UploadPhase,
    pub update_success: bool,
    pub show_listings: bool,
    pub listings_error: bool,
    pub listings: Vec<ListingSummary>,
    pub(crate) submit_seq: u64,
    pub(crate) upload_seq: u64,
    pub(crate) listings_seq: u64,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_progress(&self) -> UploadProgress {
        self.upload.progress()
    }

    /// Listings to render: empty while the panel is hidden.
    pub fn visible_listings(&self) -> &[ListingSummary] {
        if self.show_listings {
            &self.listings
        } else {
            &[]
        }
    }

    /// Drop everything tied to the account (after delete / sign-out).
    /// Sequence numbers move past every request still in flight, so none
    /// of their responses can touch the cleared state.
    pub(crate) fn reset_account_state(&mut self) {
        *self = Self {
            upload_seq: self.upload_seq + 1,
            submit_seq: self.submit_seq + 1,
            listings_seq: self.listings_seq + 1,
            ..Self::default()
        };
    }
}
