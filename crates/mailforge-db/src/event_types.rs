//! Event type operations.
//!
//! Event types are the named categories templates are grouped under.
//! Deleting an event type cascades to its templates and their variables.

use crate::error::Result;
use mailforge_core::EventType;
use sqlx::{Pool, Sqlite};

/// Add an event type, returning its id.
///
/// Adding a name that already exists returns the existing id instead of
/// failing, so the operation is safe to repeat.
///
/// # Errors
/// Returns `DatabaseError` if the insert or lookup fails.
pub async fn add_event_type(pool: &Pool<Sqlite>, name: &str) -> Result<i64> {
    sqlx::query("INSERT OR IGNORE INTO event_types (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM event_types WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(id)
}

/// Look up an event type id by name.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn event_type_id(pool: &Pool<Sqlite>, name: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM event_types WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(id)
}

/// List all event types in insertion order.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn list_event_types(pool: &Pool<Sqlite>) -> Result<Vec<EventType>> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM event_types ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| EventType { id, name })
        .collect())
}

/// Delete an event type, cascading to its templates and variables.
///
/// Deleting a nonexistent id is a no-op; the return value reports whether
/// a row was actually removed.
///
/// # Errors
/// Returns `DatabaseError` if the delete fails.
pub async fn delete_event_type(pool: &Pool<Sqlite>, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM event_types WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::debug!("Deleted event type {id} and its templates");
    }
    Ok(deleted)
}

/// Rename an event type in place, keeping template ids stable.
///
/// Returns `false` without changes when the new name is already taken or
/// the old name does not exist.
///
/// # Errors
/// Returns `DatabaseError` if the update fails.
pub async fn rename_event_type(pool: &Pool<Sqlite>, old_name: &str, new_name: &str) -> Result<bool> {
    if old_name == new_name {
        return Ok(true);
    }
    if event_type_id(pool, new_name).await?.is_some() {
        return Ok(false);
    }

    let result = sqlx::query("UPDATE event_types SET name = ? WHERE name = ?")
        .bind(new_name)
        .bind(old_name)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
