//! Persisted key-value store.
//!
//! Everything the workflow persists (stage progress, template subjects and
//! bodies) goes through [`KeyValueStore`]. Two implementations ship here:
//!
//! - [`MemoryStore`]: process-local map, used by tests and embedders.
//! - [`FileStore`]: a JSON document at `<home>/.practica/store.json`.
//!
//! # On-disk format
//!
//! ```json
//! { "updated_at": "2026-03-01T12:00:00Z", "entries": { "coordination.max_access_level": "1" } }
//! ```
//!
//! Writes use an atomic `.tmp` + rename in the same directory. Every `get`
//! re-reads the file so that values written by another process or another
//! store handle are visible immediately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, StoreError};
use crate::paths;

// ---------------------------------------------------------------------------
// 1. Trait
// ---------------------------------------------------------------------------

/// String-keyed, string-valued persisted storage.
///
/// Methods take `&self` so one store can be shared between several
/// consumers; implementations use interior mutability.
pub trait KeyValueStore {
    /// Returns `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Last write wins.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

// ---------------------------------------------------------------------------
// 2. MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`KeyValueStore`]. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, e.g. with a corrupted progress value in tests.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Copy of the current contents, sorted by key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A panicking writer cannot leave a half-inserted String behind.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 3. FileStore
// ---------------------------------------------------------------------------

/// On-disk store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreFile {
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl StoreFile {
    fn empty() -> Self {
        StoreFile {
            updated_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }
}

/// JSON-file-backed [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<home>/.practica/store.json`
    pub fn at(home: &Path) -> Self {
        Self::new(paths::store_path(home))
    }

    /// [`FileStore::at`] for the current user's home directory.
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::at(&paths::home()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole document. Returns an empty store if the file does not
    /// yet exist.
    pub fn load(&self) -> Result<StoreFile, StoreError> {
        load_file(&self.path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut file = self.load()?;
        file.entries.insert(key.to_owned(), value.to_owned());
        file.updated_at = Utc::now();
        save_file(&self.path, &file)?;
        tracing::debug!(key, path = %self.path.display(), "store entry written");
        Ok(())
    }
}

/// Read a store document from `path`; missing file = empty store.
pub fn load_file(path: &Path) -> Result<StoreFile, StoreError> {
    if !path.exists() {
        return Ok(StoreFile::empty());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Atomically save a store document to `path`.
///
/// Write flow: serialize → `.json.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_file(path: &Path, file: &StoreFile) -> Result<(), StoreError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid store path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(file)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
