//! Durable key-value store on a single SQLite file.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::kv::KeyValueStore;
use crate::error::{Error, Result};

/// SQLite-backed [`KeyValueStore`] (single connection)
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened store");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this store
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        super::schema::run_migrations(&conn)
    }

    /// Keys currently present, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Storage("store connection lock poisoned".to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn()?;
        conn.query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(Error::from)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_test_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    #[test]
    fn test_set_get_overwrite() {
        let store = open_test_store();
        assert_eq!(store.get("tasks").unwrap(), None);

        store.set("tasks", b"[]").unwrap();
        store.set("tasks", b"[{}]").unwrap();

        assert_eq!(store.get("tasks").unwrap(), Some(b"[{}]".to_vec()));
        assert_eq!(store.keys().unwrap(), vec!["tasks".to_string()]);
    }

    #[test]
    fn test_remove() {
        let store = open_test_store();
        store.set("earnedBadges", b"[]").unwrap();
        store.remove("earnedBadges").unwrap();
        store.remove("earnedBadges").unwrap();
        assert_eq!(store.get("earnedBadges").unwrap(), None);
    }

    #[test]
    fn test_unmigrated_store_reports_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(store.get("tasks"), Err(Error::Database(_))));
    }

    #[test]
    fn test_open_creates_parent_dirs_and_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/store.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.migrate().unwrap();
            store.set("hasCompletedOnboarding", b"true").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        store.migrate().unwrap();
        assert_eq!(
            store.get("hasCompletedOnboarding").unwrap(),
            Some(b"true".to_vec())
        );
    }
}
