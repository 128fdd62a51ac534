//! Mailforge Template Store
//!
//! Provides `SQLite` storage for event types, email templates, declared
//! template variables, and application settings. Uses `SQLx` with embedded
//! migrations.
//!
//! # Architecture
//!
//! - **Transactions**: every multi-statement mutation (template upsert,
//!   bulk import) is one transaction on one pooled connection; a failure
//!   rolls back and leaves prior state intact
//! - **Idempotent deletes**: deleting a nonexistent record is a no-op
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//!
//! # Example
//!
//! ```ignore
//! use mailforge_db::Database;
//!
//! let db = Database::new("mailforge.db").await?;
//! db.run_migrations().await?;
//! let id = mailforge_db::event_types::add_event_type(db.pool(), "Storage Event").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod event_types;
pub mod migrations;
pub mod settings;
pub mod templates;
pub mod transfer;

// Re-export commonly used types
pub use connection::StorePool;
pub use error::{DatabaseError, Result};

use std::path::{Path, PathBuf};

/// High-level template store interface with migrations and backup.
///
/// Construct one at process start and pass it by reference to every
/// component; close it at process end.
#[derive(Debug)]
pub struct Database {
    pool: StorePool,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the template store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let pool = StorePool::new(&path).await?;
        Ok(Self { pool, path })
    }

    /// Run all pending database migrations.
    ///
    /// This should be called after creating a new database instance to ensure
    /// the schema is up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    ///
    /// Returns the highest applied migration version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    ///
    /// This allows direct access to the `SQLx` pool for the repository
    /// functions in this crate.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Path of the backing database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy the database file into `target_dir` with a timestamped name.
    ///
    /// Returns the path of the backup file.
    ///
    /// # Errors
    /// Returns `DatabaseError` for in-memory stores or if the copy fails.
    pub async fn backup_to(&self, target_dir: impl AsRef<Path>) -> Result<PathBuf> {
        if self.path.to_str() == Some(":memory:") {
            return Err(DatabaseError::Open(
                "cannot back up an in-memory database".to_string(),
            ));
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let backup_path = target_dir
            .as_ref()
            .join(format!("mailforge_backup_{timestamp}.db"));

        tokio::fs::copy(&self.path, &backup_path).await?;
        tracing::info!("Backed up database to {}", backup_path.display());
        Ok(backup_path)
    }

    /// Close the database connection gracefully.
    ///
    /// This ensures all connections are properly closed and resources are
    /// cleaned up.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
