//! Durable storage for the credential token.
//!
//! The browser original kept the token in `localStorage`. Here the
//! storage is a trait, so the session store doesn't care whether the
//! token lives in memory (tests, demos) or in a file under the user's
//! data directory (a real client that should stay logged in across
//! restarts).

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use shaadi_protocol::{Codec, JsonCodec, ProtocolError};
use tempfile::NamedTempFile;

use crate::SessionError;

/// A single-slot key-value store for the bearer token.
///
/// Methods are synchronous: the token is tiny, and the session store
/// calls them while it holds its commit lock, so a token write can never
/// interleave with another operation's write.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the persisted token, or `None` if there isn't one.
    ///
    /// # Errors
    /// [`SessionError::Storage`] if the storage can't be read,
    /// [`SessionError::Corrupt`] if what's there isn't a token.
    fn load(&self) -> Result<Option<String>, SessionError>;

    /// Persists `token`, replacing any previous one.
    fn save(&self, token: &str) -> Result<(), SessionError>;

    /// Deletes the token. Deleting a token that isn't there succeeds.
    fn clear(&self) -> Result<(), SessionError>;
}

impl<T: TokenStore> TokenStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, SessionError> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// Keeps the token in process memory. Survives nothing, fails never.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`, as if left over from a
    /// previous visit.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.slot() = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// On-disk record: `{ "token": "...", "saved_at": 1718000000 }`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    /// Unix seconds when the token was written. Informational only.
    #[serde(default)]
    saved_at: u64,
}

/// Keeps the token in a small JSON file.
///
/// Writes go to a sibling temp file first and are then renamed over the
/// record, so a crash mid-write leaves either the old token or the new
/// one, never half of each.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    codec: JsonCodec,
}

impl FileTokenStore {
    /// A store backed by the file at `path`. Nothing is touched until the
    /// first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            codec: JsonCodec,
        }
    }

    /// Where the token record lives.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(e)),
        };
        let record: StoredToken =
            self.codec.decode(&bytes).map_err(SessionError::Corrupt)?;
        if record.token.trim().is_empty() {
            return Err(SessionError::Corrupt(ProtocolError::InvalidMessage(
                "token record is empty".into(),
            )));
        }
        Ok(Some(record.token))
    }

    /// Writes a temp file next to the record and renames it into place.
    /// The temp file is removed if any step fails.
    fn save(&self, token: &str) -> Result<(), SessionError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let record = StoredToken {
            token: token.to_owned(),
            saved_at,
        };
        let bytes = self.codec.encode(&record).map_err(SessionError::Corrupt)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.path.display(), "token persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e)),
        }
    }
}
