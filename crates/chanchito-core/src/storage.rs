//! Durable storage for the session record
//!
//! The record is three scalar fields under fixed keys (`token`, `role`,
//! `userId`). Backends write the whole record at once so readers never see
//! one field updated and the others stale.

use crate::error::CoreError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Raw persisted record. Fields are optional because storage may hold
/// partial or hand-edited data; validation happens at hydration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

/// Backend holding the persisted session record
pub trait SessionStorage: Send + Sync {
    /// Read the record. `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<StoredSession>, CoreError>;

    /// Replace the whole record
    fn save(&self, record: &StoredSession) -> Result<(), CoreError>;

    /// Remove the record. Removing a missing record is not an error.
    fn remove(&self) -> Result<(), CoreError>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    fn load(&self) -> Result<Option<StoredSession>, CoreError> {
        (**self).load()
    }

    fn save(&self, record: &StoredSession) -> Result<(), CoreError> {
        (**self).save(record)
    }

    fn remove(&self) -> Result<(), CoreError> {
        (**self).remove()
    }
}

/// JSON file backend (`<config_dir>/chanchito/session.json` by default)
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<StoredSession>, CoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CoreError::FileRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record = serde_json::from_str(&content).map_err(|source| CoreError::JsonParse {
            path: self.path.clone(),
            message: source.to_string(),
            source,
        })?;
        Ok(Some(record))
    }

    fn save(&self, record: &StoredSession) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoreError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(record).map_err(|source| {
            CoreError::JsonParse {
                path: self.path.clone(),
                message: source.to_string(),
                source,
            }
        })?;

        // Write-then-rename keeps the record whole for concurrent readers
        let tmp = self.temp_path();
        write_private(&tmp, content.as_bytes()).map_err(|source| CoreError::FileWrite {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| CoreError::FileWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "Session record saved");
        Ok(())
    }

    fn remove(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CoreError::FileWrite {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Write `content` to a file only the owner can read (0600 on unix).
/// The mode is set at creation and again before any byte is written, in
/// case a stale temp file already existed with wider permissions.
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(content)?;
    file.sync_all()
}

/// In-memory backend, used by tests and `--no-persist` style setups
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<StoredSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-existing record (simulates what a previous run left)
    pub fn with_record(record: StoredSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    /// Current raw record
    pub fn snapshot(&self) -> Option<StoredSession> {
        self.record.lock().clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<StoredSession>, CoreError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, record: &StoredSession) -> Result<(), CoreError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), CoreError> {
        *self.record.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record() -> StoredSession {
        StoredSession {
            token: Some("abc".to_string()),
            role: Some("admin".to_string()),
            user_id: Some("1".to_string()),
        }
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_save_load_remove() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));

        storage.save(&record()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(record()));
        assert!(!storage.temp_path().exists());

        storage.remove().unwrap();
        assert_eq!(storage.load().unwrap(), None);
        // Second remove is a no-op
        storage.remove().unwrap();
    }

    #[test]
    fn test_file_storage_uses_fixed_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);
        storage.save(&record()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["token"], "abc");
        assert_eq!(raw["role"], "admin");
        assert_eq!(raw["userId"], "1");
    }

    #[test]
    fn test_file_storage_corrupt_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.load(),
            Err(CoreError::JsonParse { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        // A leftover temp file with wide permissions must not leak its mode
        std::fs::write(storage.temp_path(), "stale").unwrap();
        std::fs::set_permissions(storage.temp_path(), std::fs::Permissions::from_mode(0o644))
            .unwrap();

        storage.save(&record()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.load().unwrap(), Some(record()));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.save(&record()).unwrap();
        assert_eq!(storage.snapshot(), Some(record()));
        storage.remove().unwrap();
        assert_eq!(storage.snapshot(), None);
    }
}
