use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use crate::version::error::StoreError;

/// Trait for the host's key/value settings
#[cfg_attr(test, automock)]
pub trait SettingsStore: Send + Sync + 'static {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Store several values at once; either all of them are written or none
    fn set_many(&self, values: Vec<(String, Value)>) -> Result<(), StoreError>;
}

/// [`SettingsStore`] persisted in SQLite, one JSON value per key
pub struct SqliteSettings {
    conn: Mutex<Connection>,
}

impl SqliteSettings {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Initializing settings database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Settings initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating settings schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        debug!("Settings schema created successfully");
        Ok(())
    }

    fn upsert(conn: &Connection, key: &str, value: &Value, now: i64) -> Result<(), StoreError> {
        conn.execute(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            (key, serde_json::to_string(value)?, now),
        )?;
        Ok(())
    }
}

impl SettingsStore for SqliteSettings {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.lock_conn()?;
        let raw: Option<String> = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(raw.map(|raw| serde_json::from_str(&raw)).transpose()?)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        debug!("Saving setting {}", key);
        let conn = self.lock_conn()?;
        Self::upsert(&conn, key, &value, Self::current_timestamp_ms())
    }

    fn set_many(&self, values: Vec<(String, Value)>) -> Result<(), StoreError> {
        debug!("Saving {} settings", values.len());
        let now = Self::current_timestamp_ms();

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        for (key, value) in &values {
            Self::upsert(&tx, key, value, now)?;
        }
        tx.commit()?;

        Ok(())
    }
}
