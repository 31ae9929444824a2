// SPDX-License-Identifier: MPL-2.0

use crate::cache::CacheError;
use crate::cache::schema::SCHEMA;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Snapshots older than this are dropped on startup (30 days)
const MAX_SNAPSHOT_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Handle to the offline snapshot database
#[derive(Clone)]
pub struct CacheDb {
    conn: Arc<Mutex<Connection>>,
}

impl CacheDb {
    /// Open or create the cache database
    /// Path: ~/.local/share/guia/cache.db
    pub fn open_default() -> Result<Self, CacheError> {
        Self::open(&Self::cache_path()?)
    }

    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CacheError::Path(format!("failed to create cache dir: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        // All statements are CREATE IF NOT EXISTS
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn cache_path() -> Result<PathBuf, CacheError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CacheError::Path("could not find data directory".to_string()))?;
        Ok(data_dir.join("guia").join("cache.db"))
    }

    /// Access connection for operations
    pub fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("cache lock poisoned")
    }

    /// Current unix timestamp in seconds
    pub fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    /// Drop snapshots nobody has refreshed in a month
    pub fn cleanup_stale(&self) -> Result<usize, CacheError> {
        let cutoff = Self::now() - MAX_SNAPSHOT_AGE_SECS;
        let removed = self
            .conn()
            .execute("DELETE FROM snapshots WHERE fetched_at < ?", [cutoff])?;
        Ok(removed)
    }
}
