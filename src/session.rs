//! Client session identity and its persistence.
//!
//! A [`SessionId`] names one logical chat client across reconnects and process
//! restarts. It is read from a [`SessionStore`] under [`SESSION_KEY`] when present,
//! otherwise generated once and written back immediately.
//!
//! # Example
//!
//! ```rust
//! use chat_socket_client::session::{MemoryStore, SessionId};
//!
//! # fn main() -> chat_socket_client::Result<()> {
//! let store = MemoryStore::default();
//! let first = SessionId::resolve(&store)?;
//! let second = SessionId::resolve(&store)?;
//! assert_eq!(first, second);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use uuid::Uuid;

use crate::Result;
use crate::error::Error;

/// Storage key holding the session identifier.
pub const SESSION_KEY: &str = "chatSessionId";

/// Key/value persistence for client-side state.
///
/// Implementations must be durable for at least as long as the host wants the
/// session to survive; [`MemoryStore`] only lives as long as the process.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Opaque, stable identifier of a chat client.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Read the identifier from `store`, generating and persisting a new one if absent.
    ///
    /// A stored value is reused verbatim unless it is blank.
    pub fn resolve<S: SessionStore + ?Sized>(store: &S) -> Result<Self> {
        if let Some(existing) = store.get(SESSION_KEY)?
            && !existing.trim().is_empty()
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(session_id = %existing, "Reusing persisted session id");
            return Ok(Self(existing));
        }

        let fresh = Self::generate();
        store.set(SESSION_KEY, fresh.as_str())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(session_id = %fresh, "Generated new session id");

        Ok(fresh)
    }

    /// Generate a fresh random identifier without persisting it.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// In-process store. Clones share the same underlying map.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a JSON object file on disk.
///
/// A missing file reads as an empty store. Writes go to a temp file in the same
/// directory and are renamed into place.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(Error::storage),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::storage(e)),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(Error::storage)?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(Error::storage)?;
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        std::fs::write(&tmp_path, json).map_err(Error::storage)?;
        std::fs::rename(&tmp_path, &self.path).map_err(Error::storage)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries)
    }
}
