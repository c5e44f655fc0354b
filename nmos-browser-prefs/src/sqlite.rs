//! SQLite-backed preference store.
//!
//! Keeps preferences across CLI invocations in a single small table.

use crate::error::{PrefsError, PrefsResult};
use crate::store::PreferenceStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Persistent preference store backed by SQLite.
pub struct SqlitePreferenceStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePreferenceStore {
    /// Opens (or creates) a preference store at the given path.
    pub fn open(path: impl AsRef<Path>) -> PrefsResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| PrefsError::Storage(format!("failed to open preference store: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory preference store (for testing).
    pub fn open_in_memory() -> PrefsResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            PrefsError::Storage(format!("failed to open in-memory preference store: {e}"))
        })?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> PrefsResult<()> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS preferences (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| PrefsError::Storage(format!("failed to init preference schema: {e}")))?;
        Ok(())
    }

    /// Returns every stored (name, value) pair, sorted by name.
    pub fn entries(&self) -> PrefsResult<Vec<(String, String)>> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        let mut stmt = conn
            .prepare("SELECT name, value FROM preferences ORDER BY name")
            .map_err(|e| PrefsError::Storage(format!("failed to prepare preference query: {e}")))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| PrefsError::Storage(format!("failed to query preferences: {e}")))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(
                row.map_err(|e| PrefsError::Storage(format!("failed to read preference row: {e}")))?,
            );
        }
        Ok(result)
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: &str) -> PrefsResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        conn.query_row(
            "SELECT value FROM preferences WHERE name = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| PrefsError::Storage(format!("failed to load preference {key}: {e}")))
    }

    fn set(&self, key: &str, value: &str) -> PrefsResult<()> {
        let conn = self.conn.lock().map_err(|_| PrefsError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO preferences (name, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| PrefsError::Storage(format!("failed to save preference {key}: {e}")))?;
        Ok(())
    }
}
