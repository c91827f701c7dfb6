use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// Prefix shared by every cached API response key
pub const KEY_PREFIX: &str = "gh-cache-";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache connection poisoned by a panicking writer")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cached value plus the moment it was written
///
/// Serialized as `{"data": ..., "timestamp": <ms since epoch>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, now: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: now.timestamp_millis(),
        }
    }

    /// Fresh while `now - timestamp < ttl`
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.is_valid_at(ttl, Utc::now())
    }

    pub fn is_valid_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.timestamp < ttl.num_milliseconds()
    }
}

/// Key/value store for API responses and UI preferences
///
/// One SQLite file, two tables. Stale responses are never deleted, the
/// next successful fetch simply overwrites them.
pub struct CacheManager {
    conn: Mutex<Connection>,
}

impl CacheManager {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Throwaway store, handy for tests and `--no-cache`
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Storage key for a request URL
    pub fn key_for_url(url: &str) -> String {
        format!("{}{}", KEY_PREFIX, url)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Read an entry. Any failure along the way reads as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.read_raw("responses", key) {
            Ok(raw) => raw?,
            Err(e) => {
                debug!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Write `data` stamped with the current time, replacing any prior value
    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        self.set_at(key, data, Utc::now())
    }

    pub fn set_at<T: Serialize>(&self, key: &str, data: &T, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry::new(data, now);
        let raw = serde_json::to_string(&entry)?;
        self.write_raw("responses", key, &raw)
    }

    pub fn get_preference(&self, key: &str) -> Option<String> {
        match self.read_raw("preferences", key) {
            Ok(value) => value,
            Err(e) => {
                debug!("Preference read failed for {}: {}", key, e);
                None
            }
        }
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.write_raw("preferences", key, value)
    }

    fn read_raw(&self, table: &str, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", table),
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, table: &str, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                table
            ),
            params![key, value],
        )?;
        Ok(())
    }
}
