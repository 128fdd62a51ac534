//! Database connection management.
//!
//! Provides a `StorePool` wrapper around `SQLx` that configures `SQLite`
//! for safe multi-caller use: foreign keys on, and a busy timeout so
//! concurrent writers serialize instead of failing.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// `SQLite` connection pool for the template store.
///
/// Every mutating operation runs as a self-contained transaction on a
/// single pooled connection; callers never rely on connection affinity
/// between calls.
#[derive(Debug)]
pub struct StorePool {
    pool: Pool<Sqlite>,
}

impl StorePool {
    /// Create a new connection pool for the given database file.
    ///
    /// # Arguments
    /// * `path` - Path to the `SQLite` database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError::Open` if the file cannot be opened or the
    /// connect options are invalid.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;
        let in_memory = path_str == ":memory:";

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        // An in-memory database exists per connection; keep exactly one so
        // every caller sees the same store.
        let max_connections = if in_memory { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(if in_memory { None } else { Some(Duration::from_secs(600)) })
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Template store pool created at {}", path_str);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    ///
    /// This allows consumers to execute queries directly using `SQLx`.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Verify that the database is reachable.
    ///
    /// # Errors
    /// Returns `DatabaseError` if a trivial query fails.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully.
    ///
    /// This ensures all connections are properly closed before the pool is dropped.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Template store pool closed");
    }
}
