//! # Session Cache
//!
//! Keeps the signed-in `UserSession` in `~/.homestead/session.json` so a
//! restart doesn't lose it. Written whenever the store publishes a user,
//! removed when the session is cleared.
//!
//! All writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::core::config;
use crate::core::model::UserSession;
use crate::core::store::SessionSnapshot;

/// Returns `~/.homestead/session.json`.
pub fn session_path() -> Option<PathBuf> {
    config::home_dir().map(|dir| dir.join("session.json"))
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load the cached session. `Ok(None)` when there is no cache file.
pub fn load_session(path: &Path) -> io::Result<Option<UserSession>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    let user = serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(user))
}

pub fn save_session(path: &Path, user: &UserSession) -> io::Result<()> {
    atomic_write_json(path, user)
}

pub fn clear_session(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Mirror a store snapshot to disk. Failures are logged, never fatal.
pub fn sync_snapshot(path: &Path, snapshot: &SessionSnapshot) {
    let result = match &snapshot.current_user {
        Some(user) => save_session(path, user),
        None => clear_session(path),
    };
    match result {
        Ok(()) => debug!("Session cache synced ({})", path.display()),
        Err(e) => warn!("Failed to sync session cache {}: {}", path.display(), e),
    }
}
