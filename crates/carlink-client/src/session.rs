//! Explicit session state with a file-backed snapshot.
//!
//! The session is a plain value handed to the notification center, with
//! an explicit hydrate/persist/clear lifecycle. There is no ambient
//! global: logout is `clear()` plus dropping the value.

use crate::error::ClientError;
use carlink_protocol::{Credential, OwnerId};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The logged-in user's session.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    /// Recipient user id; every record in the store belongs to it.
    pub owner_id: OwnerId,
    /// Bearer credential presented to the backend.
    pub credential: Credential,
    /// When this session started.
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    /// Start a fresh session for the given user.
    pub fn new(owner_id: impl Into<OwnerId>, credential: impl Into<Credential>) -> Self {
        Self {
            owner_id: owner_id.into(),
            credential: credential.into(),
            started_at: Utc::now(),
        }
    }
}

impl fmt::Debug for SessionState {
    /// Keeps the credential out of log output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("owner_id", &self.owner_id)
            .field("credential", &"<redacted>")
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// File-backed persistence for the session snapshot.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store persisting to the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the persisted session, if any.
    ///
    /// A missing snapshot is normal (first run, or after logout). A
    /// corrupt snapshot is discarded with a warning rather than failing
    /// startup.
    pub fn hydrate(&self) -> Option<SessionState> {
        if !self.path.exists() {
            debug!("no session snapshot (path={})", self.path.display());
            return None;
        }
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!("failed to read session snapshot: {err}");
                return None;
            }
        };
        match serde_json::from_str::<SessionState>(&contents) {
            Ok(state) => {
                info!("hydrated session snapshot (owner_id={})", state.owner_id);
                Some(state)
            }
            Err(err) => {
                warn!("discarding corrupt session snapshot: {err}");
                None
            }
        }
    }

    /// Write the session snapshot, creating parent directories as needed.
    pub fn persist(&self, state: &SessionState) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(session_err)?;
        }
        let contents = serde_json::to_string_pretty(state).map_err(session_err)?;
        fs::write(&self.path, contents).map_err(session_err)?;
        info!(
            "persisted session snapshot (owner_id={}, path={})",
            state.owner_id,
            self.path.display()
        );
        Ok(())
    }

    /// Delete the snapshot on logout. Idempotent.
    pub fn clear(&self) -> Result<(), ClientError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(session_err)?;
            info!("cleared session snapshot (path={})", self.path.display());
        }
        Ok(())
    }
}

fn session_err(err: impl fmt::Display) -> ClientError {
    ClientError::Session(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{SessionState, SessionStore};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn hydrate_returns_none_without_a_snapshot() {
        let temp = tempdir().expect("tempdir");
        let store = SessionStore::new(temp.path().join("session.json"));
        assert_eq!(store.hydrate(), None);
    }

    #[test]
    fn persists_and_hydrates_a_session() {
        let temp = tempdir().expect("tempdir");
        let store = SessionStore::new(temp.path().join("nested/session.json"));
        let state = SessionState::new("owner-1", "token-abc");
        store.persist(&state).expect("persist");
        assert_eq!(store.hydrate(), Some(state));
    }

    #[test]
    fn corrupt_snapshot_is_discarded() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{ not json").expect("write");
        let store = SessionStore::new(&path);
        assert_eq!(store.hydrate(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let temp = tempdir().expect("tempdir");
        let store = SessionStore::new(temp.path().join("session.json"));
        let state = SessionState::new("owner-1", "token-abc");
        store.persist(&state).expect("persist");
        store.clear().expect("clear");
        store.clear().expect("clear again");
        assert_eq!(store.hydrate(), None);
    }

    #[test]
    fn debug_output_redacts_the_credential() {
        let state = SessionState::new("owner-1", "token-abc");
        let rendered = format!("{state:?}");
        assert!(!rendered.contains("token-abc"));
        assert!(rendered.contains("owner-1"));
    }
}
