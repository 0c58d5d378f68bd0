//! Session context and the narrow store it is persisted through.
//!
//! The backend hands out `token`, `user_id`, and `admin` on login; we keep
//! them plus the last selected `profile_tab` behind [`SessionStore`] so the
//! workflow takes an explicit session instead of reaching for ambient global
//! state, and tests can substitute the in-memory variant.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::order::CustomerId;

#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: CustomerId,
    pub token: SecretString,
    pub is_admin: bool,
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("could not read session file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not write session file `{path}`: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse session file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;
    fn store(&self, session: &Session) -> Result<(), SessionStoreError>;
    /// Drops the signed-in identity. The profile tab preference survives.
    fn clear(&self) -> Result<(), SessionStoreError>;
    fn profile_tab(&self) -> Result<Option<String>, SessionStoreError>;
    fn set_profile_tab(&self, tab: &str) -> Result<(), SessionStoreError>;
}

/// On-disk shape. Every field is optional so a partially written file
/// still parses.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile_tab: Option<String>,
}

impl PersistedState {
    fn session(&self) -> Option<Session> {
        match (&self.token, self.user_id) {
            (Some(token), Some(user_id)) => Some(Session {
                user_id: CustomerId(user_id),
                token: token.clone().into(),
                is_admin: self.admin.unwrap_or(false),
            }),
            _ => None,
        }
    }

    fn put_session(&mut self, session: &Session) {
        self.token = Some(session.token.expose_secret().to_owned());
        self.user_id = Some(session.user_id.0);
        self.admin = session.is_admin.then_some(true);
    }

    fn drop_session(&mut self) {
        self.token = None;
        self.user_id = None;
        self.admin = None;
    }
}

/// JSON-file-backed store, the local-storage stand-in.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read_state(&self) -> Result<PersistedState, SessionStoreError> {
        if !self.path.exists() {
            return Ok(PersistedState::default());
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|source| SessionStoreError::ReadFile { path: self.path.clone(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| SessionStoreError::ParseFile { path: self.path.clone(), source })
    }

    fn write_state(&self, state: &PersistedState) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SessionStoreError::WriteFile {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let raw = serde_json::to_string_pretty(state).map_err(|source| {
            SessionStoreError::ParseFile { path: self.path.clone(), source }
        })?;
        fs::write(&self.path, raw)
            .map_err(|source| SessionStoreError::WriteFile { path: self.path.clone(), source })
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.read_state()?.session())
    }

    fn store(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut state = self.read_state()?;
        state.put_session(session);
        self.write_state(&state)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let mut state = self.read_state()?;
        state.drop_session();
        self.write_state(&state)
    }

    fn profile_tab(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.read_state()?.profile_tab)
    }

    fn set_profile_tab(&self, tab: &str) -> Result<(), SessionStoreError> {
        let mut state = self.read_state()?;
        state.profile_tab = Some(tab.to_owned());
        self.write_state(&state)
    }
}

/// Test double with the same contract.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<PersistedState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(session: &Session) -> Self {
        let store = Self::default();
        store.state.write().unwrap_or_else(|poisoned| poisoned.into_inner()).put_session(session);
        store
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner()).session())
    }

    fn store(&self, session: &Session) -> Result<(), SessionStoreError> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner()).put_session(session);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner()).drop_session();
        Ok(())
    }

    fn profile_tab(&self) -> Result<Option<String>, SessionStoreError> {
        Ok(self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner()).profile_tab.clone())
    }

    fn set_profile_tab(&self, tab: &str) -> Result<(), SessionStoreError> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner()).profile_tab =
            Some(tab.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use crate::domain::order::CustomerId;

    use super::{FileSessionStore, InMemorySessionStore, Session, SessionStore};

    fn session() -> Session {
        Session { user_id: CustomerId(7), token: "tok-abc".to_owned().into(), is_admin: true }
    }

    #[test]
    fn file_store_round_trips_a_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.load().expect("empty load").is_none());

        store.store(&session()).expect("store session");
        let loaded = store.load().expect("load").expect("session present");
        assert_eq!(loaded.user_id, CustomerId(7));
        assert_eq!(loaded.token.expose_secret(), "tok-abc");
        assert!(loaded.is_admin);
    }

    #[test]
    fn clear_keeps_the_profile_tab_preference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.store(&session()).expect("store session");
        store.set_profile_tab("ORDER_HISTORY").expect("set tab");
        store.clear().expect("clear");

        assert!(store.load().expect("load after clear").is_none());
        assert_eq!(store.profile_tab().expect("tab"), Some("ORDER_HISTORY".to_owned()));
    }

    #[test]
    fn file_store_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("nested/state/session.json"));
        store.store(&session()).expect("store into fresh directory");
        assert!(store.load().expect("load").is_some());
    }

    #[test]
    fn in_memory_store_matches_the_contract() {
        let store = InMemorySessionStore::new();
        assert!(store.load().expect("empty").is_none());

        store.store(&session()).expect("store");
        assert!(store.load().expect("load").is_some());

        store.clear().expect("clear");
        assert!(store.load().expect("cleared").is_none());
    }

    #[test]
    fn non_admin_sessions_omit_the_admin_flag() {
        let store = InMemorySessionStore::new();
        let customer =
            Session { user_id: CustomerId(9), token: "tok".to_owned().into(), is_admin: false };
        store.store(&customer).expect("store");
        let loaded = store.load().expect("load").expect("present");
        assert!(!loaded.is_admin);
    }
}
