//! # Session Store
//!
//! Process-wide session state, passed explicitly to whoever needs it.
//!
//! ```text
//! SessionSnapshot + SessionAction  →  reduce()  →  new SessionSnapshot
//!                                                        │
//!                                         watch channel  ▼
//!                                                   subscribers
//! ```
//!
//! Snapshots are immutable (`Arc<SessionSnapshot>`). The only way to change
//! the session is `SessionStore::dispatch`, which runs the pure reducer and
//! publishes the result.

use std::sync::Arc;

use log::debug;
use tokio::sync::watch;

use crate::core::model::UserSession;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub current_user: Option<UserSession>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn signed_in(user: UserSession) -> Self {
        Self {
            current_user: Some(user),
            ..Default::default()
        }
    }
}

/// Lifecycle actions for the update, delete and sign-out flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    SignInSuccess(UserSession),
    UpdateStart,
    UpdateSuccess(UserSession),
    UpdateFailure(String),
    DeleteStart,
    DeleteSuccess,
    DeleteFailure(String),
    SignOutStart,
    SignOutSuccess,
    SignOutFailure(String),
}

/// Pure reducer: never mutates `snapshot`.
pub fn reduce(snapshot: &SessionSnapshot, action: &SessionAction) -> SessionSnapshot {
    match action {
        SessionAction::SignInSuccess(user) | SessionAction::UpdateSuccess(user) => {
            SessionSnapshot {
                current_user: Some(user.clone()),
                loading: false,
                error: None,
            }
        }
        SessionAction::UpdateStart | SessionAction::DeleteStart | SessionAction::SignOutStart => {
            SessionSnapshot {
                loading: true,
                ..snapshot.clone()
            }
        }
        SessionAction::DeleteSuccess | SessionAction::SignOutSuccess => SessionSnapshot::default(),
        SessionAction::UpdateFailure(message)
        | SessionAction::DeleteFailure(message)
        | SessionAction::SignOutFailure(message) => SessionSnapshot {
            current_user: snapshot.current_user.clone(),
            loading: false,
            error: Some(message.clone()),
        },
    }
}

/// Cheap-to-clone handle on the shared session.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Arc<SessionSnapshot>>>,
}

impl SessionStore {
    pub fn new(initial: SessionSnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.tx.borrow().clone()
    }

    /// Apply `action` and publish the new snapshot to subscribers.
    pub fn dispatch(&self, action: SessionAction) -> Arc<SessionSnapshot> {
        debug!("Session action: {:?}", action);
        let mut published = None;
        self.tx.send_modify(|current| {
            let next = Arc::new(reduce(current, &action));
            published = Some(next.clone());
            *current = next;
        });
        published.unwrap_or_else(|| self.snapshot())
    }

    /// Receiver that is notified on every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionStore").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserSession {
        UserSession {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar_url: "a.png".to_string(),
        }
    }

    #[test]
    fn test_start_sets_loading_and_keeps_user() {
        let before = SessionSnapshot::signed_in(alice());
        let after = reduce(&before, &SessionAction::UpdateStart);
        assert!(after.loading);
        assert_eq!(after.current_user, Some(alice()));
        // reducer must not touch its input
        assert!(!before.loading);
    }

    #[test]
    fn test_update_success_replaces_user_and_clears_error() {
        let before = SessionSnapshot {
            current_user: Some(alice()),
            loading: true,
            error: Some("old".to_string()),
        };
        let updated = UserSession {
            username: "alicia".to_string(),
            ..alice()
        };
        let after = reduce(&before, &SessionAction::UpdateSuccess(updated.clone()));
        assert_eq!(after.current_user, Some(updated));
        assert!(!after.loading);
        assert_eq!(after.error, None);
    }

    #[test]
    fn test_failure_keeps_user_and_records_message() {
        let before = reduce(
            &SessionSnapshot::signed_in(alice()),
            &SessionAction::DeleteStart,
        );
        let after = reduce(&before, &SessionAction::DeleteFailure("nope".to_string()));
        assert_eq!(after.current_user, Some(alice()));
        assert!(!after.loading);
        assert_eq!(after.error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_delete_and_sign_out_clear_session() {
        let signed_in = SessionSnapshot::signed_in(alice());
        assert_eq!(
            reduce(&signed_in, &SessionAction::DeleteSuccess),
            SessionSnapshot::default()
        );
        assert_eq!(
            reduce(&signed_in, &SessionAction::SignOutSuccess),
            SessionSnapshot::default()
        );
    }

    #[tokio::test]
    async fn test_dispatch_notifies_subscribers() {
        let store = SessionStore::new(SessionSnapshot::signed_in(alice()));
        let mut rx = store.subscribe();

        let published = store.dispatch(SessionAction::SignOutStart);
        assert!(published.loading);

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().loading);
        assert!(store.snapshot().loading);
    }

    #[test]
    fn test_subscriber_wakes_only_on_dispatch() {
        use tokio_test::{assert_pending, assert_ready_ok, task};

        let store = SessionStore::new(SessionSnapshot::signed_in(alice()));
        let mut rx = store.subscribe();
        {
            let mut changed = task::spawn(rx.changed());
            assert_pending!(changed.poll());

            store.dispatch(SessionAction::UpdateFailure("Email taken".to_string()));
            assert!(changed.is_woken());
            assert_ready_ok!(changed.poll());
        }
        assert_eq!(rx.borrow().error.as_deref(), Some("Email taken"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new(SessionSnapshot::default());
        let other = store.clone();
        other.dispatch(SessionAction::SignInSuccess(alice()));
        assert_eq!(store.snapshot().current_user, Some(alice()));
    }
}
