//! The self-asserted identity used to key gallery saves.
//!
//! A session is nothing more than a handle persisted under a fixed key.
//! Holding one is the only signal that a save should be attempted; it is
//! never verified.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SessionError;

/// Key the handle is stored under.
pub const SESSION_KEY: &str = "x_username";

// ============================================================================
// OwnerHandle
// ============================================================================

/// A social-media username without the leading `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerHandle(String);

impl OwnerHandle {
    /// Cleans user input: drops the first `@` and surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, SessionError> {
        let cleaned = input.trim().replacen('@', "", 1);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(SessionError::EmptyHandle);
        }
        Ok(Self(cleaned.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SessionStore
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "x_username", default, skip_serializing_if = "Option::is_none")]
    handle: Option<OwnerHandle>,
}

/// JSON file holding the session handle.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/logo-colorist/session.json`, if the platform has a
    /// config dir.
    pub fn user_default() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("logo-colorist").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored handle. A missing file means no session.
    pub fn load(&self) -> Result<Option<OwnerHandle>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let file: SessionFile = serde_json::from_str(&content)?;
        Ok(file.handle)
    }

    pub fn save(&self, handle: &OwnerHandle) -> Result<(), SessionError> {
        self.write(&SessionFile {
            handle: Some(handle.clone()),
        })
    }

    /// Removes the stored handle. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, file: &SessionFile) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, json).map_err(|source| SessionError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// The current identity, optionally backed by a [`SessionStore`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    store: Option<SessionStore>,
    handle: Option<OwnerHandle>,
}

impl Session {
    /// A session with no handle and no persistence.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session holding `handle` in memory only.
    pub fn with_handle(handle: OwnerHandle) -> Self {
        Self {
            store: None,
            handle: Some(handle),
        }
    }

    /// Restores whatever `store` holds.
    pub fn load(store: SessionStore) -> Result<Self, SessionError> {
        let handle = store.load()?;
        debug!(logged_in = handle.is_some(), path = %store.path().display(), "loaded session");
        Ok(Self {
            store: Some(store),
            handle,
        })
    }

    pub fn handle(&self) -> Option<&OwnerHandle> {
        self.handle.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.handle.is_some()
    }

    /// Parses and stores a handle, replacing any previous one.
    pub fn login(&mut self, input: &str) -> Result<&OwnerHandle, SessionError> {
        let handle = OwnerHandle::parse(input)?;
        if let Some(store) = &self.store {
            store.save(&handle)?;
        }
        info!(handle = %handle, "logged in");
        Ok(self.handle.insert(handle))
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        if let Some(handle) = self.handle.take() {
            info!(handle = %handle, "logged out");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_at_and_whitespace() {
        assert_eq!(OwnerHandle::parse("@alice").unwrap().as_str(), "alice");
        assert_eq!(OwnerHandle::parse("  @bob ").unwrap().as_str(), "bob");
        assert_eq!(OwnerHandle::parse("carol").unwrap().as_str(), "carol");
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(matches!(OwnerHandle::parse(""), Err(SessionError::EmptyHandle)));
        assert!(matches!(OwnerHandle::parse("  @  "), Err(SessionError::EmptyHandle)));
    }

    #[test]
    fn missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);

        let session = Session::load(store).unwrap();
        assert!(!session.is_logged_in());
    }

    #[test]
    fn login_persists_under_fixed_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut session = Session::load(SessionStore::new(&path)).unwrap();

        session.login("@alice").unwrap();
        assert_eq!(session.handle().map(OwnerHandle::as_str), Some("alice"));

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[SESSION_KEY], "alice");

        let restored = Session::load(SessionStore::new(&path)).unwrap();
        assert_eq!(restored.handle().map(OwnerHandle::as_str), Some("alice"));
    }

    #[test]
    fn logout_clears_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut session = Session::load(SessionStore::new(&path)).unwrap();
        session.login("alice").unwrap();

        session.logout().unwrap();
        assert!(!session.is_logged_in());
        assert!(!path.exists());

        // Logging out twice is harmless.
        session.logout().unwrap();
    }

    #[test]
    fn failed_login_keeps_previous_handle() {
        let mut session = Session::with_handle(OwnerHandle::parse("alice").unwrap());
        assert!(session.login("@").is_err());
        assert_eq!(session.handle().map(OwnerHandle::as_str), Some("alice"));
    }
}
