//! Storage module for caching fetched pages
//!
//! This module handles:
//! - SQLite database initialization and schema management
//! - Persisting page bodies by URL
//! - Looking up previously fetched pages

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqlitePageStore;
pub use traits::{PageStore, StorageError, StorageResult, StoredPage};

use std::path::Path;

/// Opens the page store at `path`, creating it if necessary
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqlitePageStore)` - Successfully opened store
/// * `Err(StorageError)` - Failed to open the database
pub fn open_store(path: &Path) -> StorageResult<SqlitePageStore> {
    SqlitePageStore::new(path)
}
