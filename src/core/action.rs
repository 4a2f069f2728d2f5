//! # Actions
//!
//! Everything that can happen on the profile page becomes an `Action`.
//! User presses Update? That's `Action::SubmitProfile`.
//! API responds? That's `Action::ProfileSubmitted { seq, result }`.
//!
//! The `update()` function takes the view state, the current session
//! snapshot and an action. It mutates only the view state and returns an
//! `Outcome`: an optional session action for the shared store, plus an
//! `Effect` describing the I/O to run. No I/O happens here.
//!
//! ```text
//! ProfileState + SessionSnapshot + Action  →  update()  →  Outcome { session, effect }
//! ```
//!
//! Responses carry the sequence number of the request that produced them.
//! Only the latest issued request of each kind is allowed to change state.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::core::model::{AvatarFile, ListingSummary, ProfileChanges, ProfileField, UserSession};
use crate::core::state::ProfileState;
use crate::core::store::{SessionAction, SessionSnapshot};
use crate::core::upload::{UploadPhase, percent_complete, storage_key};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // User intents
    SelectAvatar {
        file: AvatarFile,
        selected_at: DateTime<Utc>,
    },
    EditField {
        field: ProfileField,
        value: String,
    },
    SubmitProfile,
    DeleteAccount,
    SignOut,
    ToggleListings,
    DeleteListing(String),

    // Results fed back from background tasks
    UploadProgressed {
        upload_id: u64,
        bytes_transferred: u64,
        total_bytes: u64,
    },
    UploadFinished {
        upload_id: u64,
        result: Result<String, String>,
    },
    ProfileSubmitted {
        seq: u64,
        result: Result<UserSession, String>,
    },
    AccountDeleted(Result<(), String>),
    SignedOut(Result<(), String>),
    ListingsFetched {
        seq: u64,
        result: Result<Vec<ListingSummary>, String>,
    },
    ListingDeleted {
        listing_id: String,
        result: Result<(), String>,
    },
}

/// I/O requested by `update()`, executed by the view.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Effect {
    #[default]
    None,
    StartUpload {
        upload_id: u64,
        key: String,
        file: AvatarFile,
    },
    SubmitProfile {
        seq: u64,
        user_id: String,
        changes: ProfileChanges,
    },
    DeleteAccount {
        user_id: String,
    },
    SignOut,
    FetchListings {
        seq: u64,
        user_id: String,
    },
    DeleteListing {
        listing_id: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub session: Option<SessionAction>,
    pub effect: Effect,
}

impl Outcome {
    fn effect(effect: Effect) -> Self {
        Self {
            session: None,
            effect,
        }
    }

    fn session(action: SessionAction) -> Self {
        Self {
            session: Some(action),
            effect: Effect::None,
        }
    }

    fn both(action: SessionAction, effect: Effect) -> Self {
        Self {
            session: Some(action),
            effect,
        }
    }
}

pub fn update(state: &mut ProfileState, session: &SessionSnapshot, action: Action) -> Outcome {
    match action {
        Action::SelectAvatar { file, selected_at } => {
            state.upload_seq += 1;
            let upload_id = state.upload_seq;
            let key = storage_key(&file.name, selected_at);
            info!("Starting avatar upload #{} as '{}'", upload_id, key);
            state.upload = UploadPhase::InProgress {
                upload_id,
                percent: 0,
            };
            Outcome::effect(Effect::StartUpload {
                upload_id,
                key,
                file,
            })
        }

        Action::UploadProgressed {
            upload_id,
            bytes_transferred,
            total_bytes,
        } => {
            if let UploadPhase::InProgress {
                upload_id: current,
                percent,
            } = &mut state.upload
                && *current == upload_id
            {
                // Never move backwards within one upload.
                *percent = (*percent).max(percent_complete(bytes_transferred, total_bytes));
            } else {
                debug!("Ignoring progress for superseded upload #{}", upload_id);
            }
            Outcome::default()
        }

        Action::UploadFinished { upload_id, result } => {
            if !(state.upload.is_in_progress() && state.upload.upload_id() == Some(upload_id)) {
                debug!("Ignoring result of superseded upload #{}", upload_id);
                return Outcome::default();
            }
            match result {
                Ok(url) => {
                    info!("Avatar upload #{} complete", upload_id);
                    state.pending.stage_avatar(url.clone());
                    state.upload = UploadPhase::Succeeded { upload_id, url };
                }
                Err(message) => {
                    warn!("Avatar upload #{} failed: {}", upload_id, message);
                    state.upload = UploadPhase::Failed { upload_id, message };
                }
            }
            Outcome::default()
        }

        Action::EditField { field, value } => {
            state.pending.set(field, value);
            Outcome::default()
        }

        Action::SubmitProfile => {
            if session.loading {
                debug!("Submit ignored: a request is already in flight");
                return Outcome::default();
            }
            let Some(user) = &session.current_user else {
                warn!("Submit ignored: no signed-in user");
                return Outcome::default();
            };
            state.submit_seq += 1;
            state.update_success = false;
            state.submitted = state.pending.clone();
            Outcome::both(
                SessionAction::UpdateStart,
                Effect::SubmitProfile {
                    seq: state.submit_seq,
                    user_id: user.id.clone(),
                    changes: state.pending.merged_over(user),
                },
            )
        }

        Action::ProfileSubmitted { seq, result } => {
            if seq != state.submit_seq {
                debug!(
                    "Discarding stale profile response #{} (latest #{})",
                    seq, state.submit_seq
                );
                return Outcome::default();
            }
            match result {
                Ok(user) => {
                    let sent = std::mem::take(&mut state.submitted);
                    state.pending.discard_sent(&sent);
                    state.update_success = true;
                    Outcome::session(SessionAction::UpdateSuccess(user))
                }
                Err(message) => Outcome::session(SessionAction::UpdateFailure(message)),
            }
        }

        Action::DeleteAccount => {
            if session.loading {
                debug!("Delete ignored: a request is already in flight");
                return Outcome::default();
            }
            match &session.current_user {
                Some(user) => Outcome::both(
                    SessionAction::DeleteStart,
                    Effect::DeleteAccount {
                        user_id: user.id.clone(),
                    },
                ),
                None => Outcome::default(),
            }
        }

        Action::AccountDeleted(result) => match result {
            Ok(()) => {
                state.reset_account_state();
                Outcome::session(SessionAction::DeleteSuccess)
            }
            Err(message) => Outcome::session(SessionAction::DeleteFailure(message)),
        },

        Action::SignOut => {
            if session.loading {
                debug!("Sign-out ignored: a request is already in flight");
                return Outcome::default();
            }
            Outcome::both(SessionAction::SignOutStart, Effect::SignOut)
        }

        Action::SignedOut(result) => match result {
            Ok(()) => {
                state.reset_account_state();
                Outcome::session(SessionAction::SignOutSuccess)
            }
            Err(message) => Outcome::session(SessionAction::SignOutFailure(message)),
        },

        Action::ToggleListings => {
            state.show_listings = !state.show_listings;
            if !state.show_listings {
                return Outcome::default();
            }
            let Some(user) = &session.current_user else {
                return Outcome::default();
            };
            state.listings_seq += 1;
            state.listings_error = false;
            Outcome::effect(Effect::FetchListings {
                seq: state.listings_seq,
                user_id: user.id.clone(),
            })
        }

        Action::ListingsFetched { seq, result } => {
            if seq != state.listings_seq {
                debug!("Discarding stale listings response #{}", seq);
                return Outcome::default();
            }
            match result {
                Ok(listings) => {
                    info!("Loaded {} listings", listings.len());
                    state.listings = listings;
                }
                Err(message) => {
                    warn!("Failed to load listings: {}", message);
                    state.listings_error = true;
                }
            }
            Outcome::default()
        }

        Action::DeleteListing(listing_id) => {
            Outcome::effect(Effect::DeleteListing { listing_id })
        }

        Action::ListingDeleted { listing_id, result } => {
            match result {
                Ok(()) => state.listings.retain(|listing| listing.id != listing_id),
                Err(message) => warn!("Failed to delete listing {}: {}", listing_id, message),
            }
            Outcome::default()
        }
    }
}
