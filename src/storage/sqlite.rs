//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageResult, StoredPage};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite page store
pub struct SqlitePageStore {
    conn: Mutex<Connection>,
}

impl SqlitePageStore {
    /// Opens or creates a page store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqlitePageStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory page store
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored pages
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// RFC 3339 timestamp of the last time `url` was stored
    pub fn fetched_at(&self, url: &str) -> StorageResult<Option<String>> {
        let fetched_at = self
            .conn()
            .query_row(
                "SELECT fetched_at FROM pages WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(fetched_at)
    }
}

impl PageStore for SqlitePageStore {
    fn persist_page(&self, url: &str, final_url: &str, content: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO pages (url, final_url, content, fetched_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET final_url = excluded.final_url,
                 content = excluded.content, fetched_at = excluded.fetched_at",
            params![url, final_url, content, now],
        )?;
        Ok(())
    }

    fn lookup_page(&self, url: &str) -> StorageResult<Option<StoredPage>> {
        let page = self
            .conn()
            .query_row(
                "SELECT final_url, content FROM pages WHERE url = ?1",
                params![url],
                |row| {
                    Ok(StoredPage {
                        final_url: row.get(0)?,
                        content: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(page)
    }
}
