//! Settings storage for application configuration.
//!
//! Provides key-value storage (language preference, last-backup-reminder
//! timestamp, and similar) using the settings table. Values are plain
//! strings with upsert semantics.

use crate::error::Result;
use sqlx::{Pool, Sqlite};

/// Set a setting, inserting or overwriting.
///
/// # Errors
/// Returns `DatabaseError` if the upsert fails.
pub async fn set_setting(pool: &Pool<Sqlite>, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a setting value, or `None` if the key is absent.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn get_setting(pool: &Pool<Sqlite>, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Delete a setting. Deleting an absent key is a no-op.
///
/// # Errors
/// Returns `DatabaseError` if the delete fails.
pub async fn delete_setting(pool: &Pool<Sqlite>, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}
