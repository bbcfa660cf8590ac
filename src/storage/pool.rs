//! SQLite connection pools for the registry.
//!
//! File databases are created on first use and run in WAL mode, so `list`
//! or `add` from a second process does not block a running `watch`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error_handling::StoreError;

/// How long a connection waits on a lock held by another writer.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a pool on the database file at `db_path`, creating the file and its
/// parent directory if needed.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<Arc<SqlitePool>, StoreError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            error!("Failed to create database directory {}: {e}", parent.display());
            StoreError::FileCreationError(e.to_string())
        })?;
    }

    let existed = db_path.exists();
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to open database {}: {e}", db_path.display());
            StoreError::SqlError(e)
        })?;

    if existed {
        info!("Using existing database at {}", db_path.display());
    } else {
        info!("Database file created at {}", db_path.display());
    }
    Ok(Arc::new(pool))
}

/// Pool over a private in-memory database.
///
/// Limited to a single connection that is never recycled, since every new
/// connection to `sqlite::memory:` would see an empty database.
pub async fn init_memory_pool() -> Result<Arc<SqlitePool>, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    Ok(Arc::new(pool))
}
