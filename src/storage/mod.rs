use crate::config::StorageConfig;
use crate::error::{Result, TurboPechError};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Durable key/value storage backing the conversation collection
///
/// Values are opaque strings; callers serialize before writing.
pub trait ConversationStorage: Send {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: ConversationStorage + Sync + ?Sized> ConversationStorage for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// SQLite-backed storage
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes `history.db` in the user's data directory.
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "turbopech", "turbopech")
            .ok_or_else(|| TurboPechError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| TurboPechError::Storage(e.to_string()))?;

        Self::new_with_path(data_dir.join("history.db"))
    }

    /// Create a storage instance that uses the specified database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use turbopech::storage::{ConversationStorage, SqliteStorage};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
    /// storage.set("greeting", "hello").unwrap();
    /// assert_eq!(storage.get("greeting").unwrap().as_deref(), Some("hello"));
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create parent directory for database")
                    .map_err(|e| TurboPechError::Storage(e.to_string()))?;
            }
        }

        let storage = Self { db_path };
        storage.init()?;
        Ok(storage)
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| TurboPechError::Storage(e.to_string()))?;
        Ok(conn)
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| TurboPechError::Storage(e.to_string()))?;

        Ok(())
    }
}

impl ConversationStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.open()?;

        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .context("Failed to read value")
            .map_err(|e| TurboPechError::Storage(e.to_string()))?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write value")
        .map_err(|e| TurboPechError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// In-memory storage, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut values) = storage.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl ConversationStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| TurboPechError::Storage("Storage lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| TurboPechError::Storage("Storage lock poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Open the storage selected by configuration
///
/// Uses `storage.path` when set, otherwise the default data directory.
pub fn open_storage(config: &StorageConfig) -> Result<Box<dyn ConversationStorage>> {
    let storage = match &config.path {
        Some(path) => {
            tracing::debug!("Opening history database at {}", path);
            SqliteStorage::new_with_path(path)?
        }
        None => SqliteStorage::new()?,
    };
    Ok(Box::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_get_missing_key() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
        assert!(storage.get("conversations").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_set_overwrites() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();

        storage.set("conversations", "[]").unwrap();
        storage.set("conversations", "[1]").unwrap();
        assert_eq!(
            storage.get("conversations").unwrap().as_deref(),
            Some("[1]")
        );
    }

    #[test]
    fn test_sqlite_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");

        {
            let storage = SqliteStorage::new_with_path(&path).unwrap();
            storage.set("k", "v").unwrap();
        }

        let reopened = SqliteStorage::new_with_path(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::with_entry("a", "1");
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        storage.set("a", "2").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("2"));
        assert!(storage.get("b").unwrap().is_none());
    }

    #[test]
    fn test_open_storage_uses_configured_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.db");
        let config = StorageConfig {
            path: Some(path.to_string_lossy().to_string()),
        };

        let storage = open_storage(&config).unwrap();
        storage.set("x", "y").unwrap();
        assert!(path.exists());
    }
}
