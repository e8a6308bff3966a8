//! Database connection management.
//!
//! Plain `SQLite` with WAL mode; postings are public data, so nothing here
//! is encrypted.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Open (or create) the `SQLite` database at the given path.
///
/// Use `:memory:` for an in-memory database in tests.
///
/// # Errors
/// Returns `DatabaseError::Open` if the file or its parent directory cannot
/// be created, or the pool cannot connect.
pub async fn open_pool(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path = path.as_ref();
    let path_str = path
        .to_str()
        .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;

    if path_str != ":memory:" {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(path_str)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .pragma("journal_mode", "WAL")
        .pragma("foreign_keys", "ON");

    // An in-memory database exists per connection; more than one connection
    // in the pool would see different schemas.
    let max_connections = if path_str == ":memory:" { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to connect: {e}")))?;

    tracing::info!("database pool created at {}", path_str);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let pool = open_pool(":memory:").await.expect("open pool");
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .expect("probe query");
    }

    #[tokio::test]
    async fn test_open_creates_parent_dirs() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let db_path = tmp.path().join("nested").join("jobradar.db");

        let pool = open_pool(&db_path).await.expect("open pool");
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .expect("probe query");

        assert!(db_path.exists());
    }
}
