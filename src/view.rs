//! # Profile View
//!
//! Glue between the pure core and the outside world. Each user operation
//! becomes an `Action`; `update()` decides what changes and which `Effect`
//! to run; effects run as tokio tasks that report back by sending more
//! `Action`s into this view's channel.
//!
//! ```text
//! select_avatar_file ─┐
//! submit_profile ─────┤                 ┌── SessionStore::dispatch
//! toggle_listings ────┼─▶ dispatch() ─▶ update() ─┤
//! ...                 │                 └── run(effect) ─▶ tokio::spawn
//!                     │                                       │
//!  process_next() ◀───┴──────────── mpsc<Action> ◀────────────┘
//! ```
//!
//! Nothing here blocks: `dispatch` returns as soon as tasks are spawned.
//! The caller drains results with `process_next()` (async) or
//! `drain_pending()` (from a synchronous UI loop).

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::api::ProfileBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::model::{AvatarFile, ProfileField};
use crate::core::state::ProfileState;
use crate::core::store::{SessionAction, SessionSnapshot, SessionStore};
use crate::storage::{ObjectStorage, UploadEvent, UploadHandle};

pub struct ProfileView {
    state: ProfileState,
    store: SessionStore,
    backend: Arc<dyn ProfileBackend>,
    storage: Arc<dyn ObjectStorage>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    /// Abort handles of the upload currently being tracked.
    active_upload: Vec<AbortHandle>,
}

impl ProfileView {
    pub fn new(
        store: SessionStore,
        backend: Arc<dyn ProfileBackend>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ProfileState::new(),
            store,
            backend,
            storage,
            tx,
            rx,
            active_upload: Vec::new(),
        }
    }

    pub fn state(&self) -> &ProfileState {
        &self.state
    }

    pub fn session(&self) -> Arc<SessionSnapshot> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn select_avatar_file(&mut self, file: AvatarFile) {
        self.dispatch(Action::SelectAvatar {
            file,
            selected_at: Utc::now(),
        });
    }

    pub fn edit_field(&mut self, field: ProfileField, value: impl Into<String>) {
        self.dispatch(Action::EditField {
            field,
            value: value.into(),
        });
    }

    pub fn submit_profile(&mut self) {
        self.dispatch(Action::SubmitProfile);
    }

    pub fn delete_account(&mut self) {
        self.dispatch(Action::DeleteAccount);
    }

    pub fn sign_out(&mut self) {
        self.dispatch(Action::SignOut);
    }

    pub fn toggle_listings(&mut self) {
        self.dispatch(Action::ToggleListings);
    }

    pub fn delete_listing(&mut self, listing_id: impl Into<String>) {
        self.dispatch(Action::DeleteListing(listing_id.into()));
    }

    // ------------------------------------------------------------------
    // Action loop
    // ------------------------------------------------------------------

    pub fn dispatch(&mut self, action: Action) {
        debug!("Dispatch: {:?}", action);
        let session = self.store.snapshot();
        let outcome = update(&mut self.state, &session, action);
        if let Some(session_action) = outcome.session {
            if matches!(
                session_action,
                SessionAction::DeleteSuccess | SessionAction::SignOutSuccess
            ) {
                self.cancel_upload();
            }
            self.store.dispatch(session_action);
        }
        self.run(outcome.effect);
    }

    /// Wait for the next background result and apply it.
    pub async fn process_next(&mut self) {
        // `self.tx` keeps the channel open, so `recv` never yields `None`.
        if let Some(action) = self.rx.recv().await {
            self.dispatch(action);
        }
    }

    /// Apply every background result that has already arrived.
    /// Returns how many were applied.
    pub fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Stop tracking the current upload, aborting its transfer.
    pub fn cancel_upload(&mut self) {
        for handle in self.active_upload.drain(..) {
            handle.abort();
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::StartUpload {
                upload_id,
                key,
                file,
            } => self.spawn_upload(upload_id, key, file),
            Effect::SubmitProfile {
                seq,
                user_id,
                changes,
            } => {
                let backend = self.backend.clone();
                self.spawn_request("update profile", async move {
                    let result = backend
                        .update_user(&user_id, &changes)
                        .await
                        .map_err(|e| e.to_string());
                    Action::ProfileSubmitted { seq, result }
                });
            }
            Effect::DeleteAccount { user_id } => {
                let backend = self.backend.clone();
                self.spawn_request("delete account", async move {
                    Action::AccountDeleted(backend.delete_user(&user_id).await.map_err(|e| e.to_string()))
                });
            }
            Effect::SignOut => {
                let backend = self.backend.clone();
                self.spawn_request("sign out", async move {
                    Action::SignedOut(backend.sign_out().await.map_err(|e| e.to_string()))
                });
            }
            Effect::FetchListings { seq, user_id } => {
                let backend = self.backend.clone();
                self.spawn_request("fetch listings", async move {
                    let result = backend
                        .user_listings(&user_id)
                        .await
                        .map_err(|e| e.to_string());
                    Action::ListingsFetched { seq, result }
                });
            }
            Effect::DeleteListing { listing_id } => {
                let backend = self.backend.clone();
                self.spawn_request("delete listing", async move {
                    let result = backend
                        .delete_listing(&listing_id)
                        .await
                        .map_err(|e| e.to_string());
                    Action::ListingDeleted { listing_id, result }
                });
            }
        }
    }

    fn spawn_request<F>(&self, label: &'static str, request: F)
    where
        F: std::future::Future<Output = Action> + Send + 'static,
    {
        info!("Spawning request: {}", label);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let action = request.await;
            if tx.send(action).is_err() {
                warn!("Failed to deliver '{}' result: view dropped", label);
            }
        });
    }

    fn spawn_upload(&mut self, upload_id: u64, key: String, file: AvatarFile) {
        // Only one upload is tracked; the previous one is abandoned.
        self.cancel_upload();

        let mut handle = UploadHandle::spawn(self.storage.clone(), key, file.bytes);
        let upload_abort = handle.abort_handle();
        let tx = self.tx.clone();

        let forward = tokio::spawn(async move {
            while let Some(event) = handle.next_event().await {
                let action = match event {
                    UploadEvent::Progress(progress) => Action::UploadProgressed {
                        upload_id,
                        bytes_transferred: progress.bytes_transferred,
                        total_bytes: progress.total_bytes,
                    },
                    UploadEvent::Completed { url } => Action::UploadFinished {
                        upload_id,
                        result: Ok(url),
                    },
                    UploadEvent::Failed(message) => Action::UploadFinished {
                        upload_id,
                        result: Err(message),
                    },
                };
                if tx.send(action).is_err() {
                    warn!("Failed to forward upload #{} event: view dropped", upload_id);
                    handle.cancel();
                    return;
                }
            }
        });

        self.active_upload = vec![upload_abort, forward.abort_handle()];
    }
}

impl Drop for ProfileView {
    fn drop(&mut self) {
        self.cancel_upload();
    }
}
