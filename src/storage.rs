use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Serialized `Session`.
pub const USER_KEY: &str = "user";
/// `"true"` while a session is active, absent otherwise.
pub const AUTHENTICATED_KEY: &str = "isAuthenticated";
/// Opaque token issued by the backend, when it issues one.
pub const AUTH_TOKEN_KEY: &str = "authToken";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

// 1. KeyValueStore Contract
/// KeyValueStore
///
/// Durable client-side key-value storage that survives restarts: the equivalent of a
/// browser's localStorage. Calls are synchronous and block the caller until the
/// value is on disk (or in memory, for the in-process variant).
///
/// Reads never fail: an unreadable store behaves as an empty one.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// 2. The Real Implementation
/// FileStorage
///
/// Keeps every key in one JSON object on disk. Each write rewrites the file through a
/// temporary sibling and a rename, so a crash never leaves a half-written store.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
        // A corrupt file is replaced rather than blocking every future write.
        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %self.path.display(), "discarding unreadable storage file");
            BTreeMap::new()
        });
        mutate(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        match self.read_all() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "storage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

// 3. The In-Memory Implementation
/// MemoryStorage
///
/// Process-local store for tests and throwaway runs. With `should_fail` set, every
/// write fails, which lets tests exercise the rollback path of the auth store.
#[derive(Default)]
pub struct MemoryStorage {
    pub should_fail: bool,
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Unavailable(
                "Mock storage error: simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

/// StorageState
///
/// The shared handle to whichever durable store is in use.
pub type StorageState = Arc<dyn KeyValueStore>;
