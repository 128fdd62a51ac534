//! Template operations.
//!
//! This module provides the CRUD surface of the template store. Saving a
//! template is an atomic upsert keyed by `(event_type_id, name)`: colliding
//! saves update in place and the declared variable set is always replaced
//! wholesale, never diffed.

use crate::error::Result;
use crate::event_types;
use mailforge_core::{Template, TemplateDraft};
use sqlx::{Pool, Row, Sqlite};

const TEMPLATE_COLUMNS: &str = "t.id, t.event_type_id, et.name AS event_type, t.name, \
     t.recipient, t.cc, t.subject, t.body, t.note, t.tag, t.sender";

/// Insert or update a template and replace its declared variable set.
///
/// The whole operation runs in one transaction on one connection: resolve
/// by `(event_type_id, name)`, update all fields or insert, delete every
/// old variable row, re-insert the new set. A failure rolls everything
/// back, leaving the prior state intact.
///
/// # Errors
/// Returns `DatabaseError::Validation` (before any mutation) if required
/// draft fields are blank, or `DatabaseError` if the transaction fails.
pub async fn upsert_template(
    pool: &Pool<Sqlite>,
    event_type_id: i64,
    draft: &TemplateDraft,
    variables: &[String],
) -> Result<i64> {
    draft.validate()?;

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM templates WHERE event_type_id = ? AND name = ?",
    )
    .bind(event_type_id)
    .bind(&draft.name)
    .fetch_optional(&mut *tx)
    .await?;

    let template_id = if let Some(id) = existing {
        sqlx::query(
            "UPDATE templates
             SET recipient = ?, cc = ?, subject = ?, body = ?, note = ?, tag = ?, sender = ?
             WHERE id = ?",
        )
        .bind(&draft.to)
        .bind(&draft.cc)
        .bind(&draft.subject)
        .bind(&draft.body)
        .bind(&draft.note)
        .bind(&draft.tag)
        .bind(&draft.sender)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM template_variables WHERE template_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        id
    } else {
        let result = sqlx::query(
            "INSERT INTO templates (event_type_id, name, recipient, cc, subject, body, note, tag, sender)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event_type_id)
        .bind(&draft.name)
        .bind(&draft.to)
        .bind(&draft.cc)
        .bind(&draft.subject)
        .bind(&draft.body)
        .bind(&draft.note)
        .bind(&draft.tag)
        .bind(&draft.sender)
        .execute(&mut *tx)
        .await?;

        result.last_insert_rowid()
    };

    for variable in variables {
        sqlx::query(
            "INSERT OR IGNORE INTO template_variables (template_id, variable_name) VALUES (?, ?)",
        )
        .bind(template_id)
        .bind(variable)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        "Saved template '{}' ({} declared variables)",
        draft.name,
        variables.len()
    );
    Ok(template_id)
}

/// Get a template by id, including its declared variables.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn template(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Template>> {
    let row = sqlx::query(&format!(
        "SELECT {TEMPLATE_COLUMNS}
         FROM templates t
         JOIN event_types et ON t.event_type_id = et.id
         WHERE t.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(hydrate_template(pool, &row).await?)),
        None => Ok(None),
    }
}

/// Get a template by event type and template name.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn template_by_name(
    pool: &Pool<Sqlite>,
    event_type: &str,
    name: &str,
) -> Result<Option<Template>> {
    let row = sqlx::query(&format!(
        "SELECT {TEMPLATE_COLUMNS}
         FROM templates t
         JOIN event_types et ON t.event_type_id = et.id
         WHERE et.name = ? AND t.name = ?"
    ))
    .bind(event_type)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(hydrate_template(pool, &row).await?)),
        None => Ok(None),
    }
}

/// List all templates for an event type, in insertion order.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn templates_for_event(pool: &Pool<Sqlite>, event_type: &str) -> Result<Vec<Template>> {
    let rows = sqlx::query(&format!(
        "SELECT {TEMPLATE_COLUMNS}
         FROM templates t
         JOIN event_types et ON t.event_type_id = et.id
         WHERE et.name = ?
         ORDER BY t.id"
    ))
    .bind(event_type)
    .fetch_all(pool)
    .await?;

    let mut templates = Vec::with_capacity(rows.len());
    for row in rows {
        templates.push(hydrate_template(pool, &row).await?);
    }
    Ok(templates)
}

/// List template names for an event type, in insertion order.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn template_names_for_event(
    pool: &Pool<Sqlite>,
    event_type: &str,
) -> Result<Vec<String>> {
    let names = sqlx::query_scalar::<_, String>(
        "SELECT t.name
         FROM templates t
         JOIN event_types et ON t.event_type_id = et.id
         WHERE et.name = ?
         ORDER BY t.id",
    )
    .bind(event_type)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Delete a template by id. Deleting a nonexistent id is a no-op.
///
/// # Errors
/// Returns `DatabaseError` if the delete fails.
pub async fn delete_template(pool: &Pool<Sqlite>, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM templates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a template by event type and name. Idempotent.
///
/// # Errors
/// Returns `DatabaseError` if the delete fails.
pub async fn delete_template_by_name(
    pool: &Pool<Sqlite>,
    event_type: &str,
    name: &str,
) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM templates
         WHERE event_type_id = (SELECT id FROM event_types WHERE name = ?)
           AND name = ?",
    )
    .bind(event_type)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Search templates by case-insensitive substring over name, subject, and
/// body. Each hit carries its event type name.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn search_templates(pool: &Pool<Sqlite>, keyword: &str) -> Result<Vec<Template>> {
    let pattern = format!("%{keyword}%");

    let rows = sqlx::query(&format!(
        "SELECT {TEMPLATE_COLUMNS}
         FROM templates t
         JOIN event_types et ON t.event_type_id = et.id
         WHERE t.name LIKE ? OR t.subject LIKE ? OR t.body LIKE ?
         ORDER BY t.id"
    ))
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    let mut hits = Vec::with_capacity(rows.len());
    for row in rows {
        hits.push(hydrate_template(pool, &row).await?);
    }
    Ok(hits)
}

/// Copy a template into another event type, creating the target event type
/// if needed. Returns `false` when the source template does not exist.
///
/// # Errors
/// Returns `DatabaseError` if any step fails.
pub async fn copy_template(
    pool: &Pool<Sqlite>,
    source_event: &str,
    target_event: &str,
    name: &str,
) -> Result<bool> {
    let Some(source) = template_by_name(pool, source_event, name).await? else {
        return Ok(false);
    };

    let target_id = event_types::add_event_type(pool, target_event).await?;
    let draft = draft_from(&source);
    upsert_template(pool, target_id, &draft, &source.variables).await?;
    Ok(true)
}

/// Move a template to another event type: copy, then delete the source.
///
/// The image side-store is keyed by template name, which a move does not
/// change, so no asset action is required.
///
/// # Errors
/// Returns `DatabaseError` if any step fails.
pub async fn move_template(
    pool: &Pool<Sqlite>,
    source_event: &str,
    target_event: &str,
    name: &str,
) -> Result<bool> {
    if !copy_template(pool, source_event, target_event, name).await? {
        return Ok(false);
    }
    delete_template_by_name(pool, source_event, name).await
}

/// Declared variables for a template, in declaration order.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn variables_for(pool: &Pool<Sqlite>, template_id: i64) -> Result<Vec<String>> {
    let variables = sqlx::query_scalar::<_, String>(
        "SELECT variable_name FROM template_variables WHERE template_id = ? ORDER BY rowid",
    )
    .bind(template_id)
    .fetch_all(pool)
    .await?;

    Ok(variables)
}

fn draft_from(template: &Template) -> TemplateDraft {
    TemplateDraft {
        name: template.name.clone(),
        to: template.to.clone(),
        cc: template.cc.clone(),
        subject: template.subject.clone(),
        body: template.body.clone(),
        sender: template.sender.clone(),
        note: template.note.clone(),
        tag: template.tag.clone(),
    }
}

async fn hydrate_template(pool: &Pool<Sqlite>, row: &sqlx::sqlite::SqliteRow) -> Result<Template> {
    let id: i64 = row.try_get("id")?;
    let variables = variables_for(pool, id).await?;

    Ok(Template {
        id,
        event_type_id: row.try_get("event_type_id")?,
        event_type: row.try_get("event_type")?,
        name: row.try_get("name")?,
        to: row.try_get("recipient")?,
        cc: row.try_get("cc")?,
        subject: row.try_get("subject")?,
        body: row.try_get("body")?,
        note: row.try_get("note")?,
        tag: row.try_get("tag")?,
        sender: row.try_get("sender")?,
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use mailforge_core::TemplateDraft;

    async fn create_test_db() -> Database {
        let db = Database::new(":memory:").await.expect("create test database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    fn outage_draft() -> TemplateDraft {
        TemplateDraft {
            name: "Storage Outage".to_string(),
            to: "team@example.com".to_string(),
            cc: "oncall@example.com".to_string(),
            subject: "Storage Outage Notification - {ID}".to_string(),
            body: "<p>Outage at {Location}, id {ID}.</p>".to_string(),
            sender: "ops@example.com".to_string(),
            note: "Initial notification".to_string(),
            tag: "outage".to_string(),
        }
    }

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_upsert_then_fetch() {
        let db = create_test_db().await;
        let pool = db.pool();

        let event_id = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");
        let id = upsert_template(pool, event_id, &outage_draft(), &vars(&["ID", "Location"]))
            .await
            .expect("upsert template");

        let fetched = template(pool, id)
            .await
            .expect("fetch")
            .expect("template exists");
        assert_eq!(fetched.event_type, "Storage Event");
        assert_eq!(fetched.name, "Storage Outage");
        assert_eq!(fetched.to, "team@example.com");
        assert_eq!(fetched.variables, vars(&["ID", "Location"]));

        let by_name = template_by_name(pool, "Storage Event", "Storage Outage")
            .await
            .expect("fetch by name")
            .expect("template exists");
        assert_eq!(by_name.id, id);
    }

    #[tokio::test]
    async fn test_upsert_is_update_in_place() {
        let db = create_test_db().await;
        let pool = db.pool();

        let event_id = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");
        let first = upsert_template(pool, event_id, &outage_draft(), &vars(&["ID", "Location"]))
            .await
            .expect("first save");

        let mut updated = outage_draft();
        updated.subject = "Resolved - {ID}".to_string();
        let second = upsert_template(pool, event_id, &updated, &vars(&["ID"]))
            .await
            .expect("second save");

        assert_eq!(first, second, "colliding key updates in place");

        let fetched = template(pool, first)
            .await
            .expect("fetch")
            .expect("template exists");
        assert_eq!(fetched.subject, "Resolved - {ID}");
        assert_eq!(fetched.variables, vars(&["ID"]), "variable set replaced");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(pool)
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_upsert_identical_is_idempotent() {
        let db = create_test_db().await;
        let pool = db.pool();

        let event_id = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");
        let variables = vars(&["ID", "Location"]);

        let id = upsert_template(pool, event_id, &outage_draft(), &variables)
            .await
            .expect("first save");
        let after_first = template(pool, id).await.expect("fetch").expect("exists");

        upsert_template(pool, event_id, &outage_draft(), &variables)
            .await
            .expect("identical re-save");
        let after_second = template(pool, id).await.expect("fetch").expect("exists");

        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid_draft_before_mutation() {
        let db = create_test_db().await;
        let pool = db.pool();

        let event_id = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");

        let mut draft = outage_draft();
        draft.sender = String::new();
        let err = upsert_template(pool, event_id, &draft, &[])
            .await
            .expect_err("blank sender rejected");
        assert!(err.to_string().contains("sender"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(pool)
            .await
            .expect("count");
        assert_eq!(count, 0, "no mutation happened");
    }

    #[tokio::test]
    async fn test_delete_event_type_cascades() {
        let db = create_test_db().await;
        let pool = db.pool();

        let storage = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");
        let network = event_types::add_event_type(pool, "Network Event")
            .await
            .expect("add event type");

        upsert_template(pool, storage, &outage_draft(), &vars(&["ID"]))
            .await
            .expect("save storage template");
        let mut other = outage_draft();
        other.name = "Link Down".to_string();
        upsert_template(pool, network, &other, &vars(&["ID"]))
            .await
            .expect("save network template");

        assert!(event_types::delete_event_type(pool, storage)
            .await
            .expect("delete"));

        let templates: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM templates")
            .fetch_one(pool)
            .await
            .expect("count templates");
        let variables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM template_variables")
            .fetch_one(pool)
            .await
            .expect("count variables");

        assert_eq!(templates, 1, "other event type untouched");
        assert_eq!(variables, 1);
        assert!(template_by_name(pool, "Network Event", "Link Down")
            .await
            .expect("fetch")
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_template_is_idempotent() {
        let db = create_test_db().await;
        let pool = db.pool();

        assert!(!delete_template(pool, 999).await.expect("delete missing"));
        assert!(
            !delete_template_by_name(pool, "Nope", "Nothing")
                .await
                .expect("delete missing by name")
        );
    }

    #[tokio::test]
    async fn test_search_matches_name_subject_body() {
        let db = create_test_db().await;
        let pool = db.pool();

        let event_id = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");
        upsert_template(pool, event_id, &outage_draft(), &vars(&["ID"]))
            .await
            .expect("save");

        // Case-insensitive over subject
        let hits = search_templates(pool, "outage notification")
            .await
            .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].event_type, "Storage Event");

        // Over body
        let hits = search_templates(pool, "{Location}").await.expect("search");
        assert_eq!(hits.len(), 1);

        // No match
        let hits = search_templates(pool, "unrelated").await.expect("search");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_copy_and_move_template() {
        let db = create_test_db().await;
        let pool = db.pool();

        let event_id = event_types::add_event_type(pool, "Storage Event")
            .await
            .expect("add event type");
        upsert_template(pool, event_id, &outage_draft(), &vars(&["ID"]))
            .await
            .expect("save");

        assert!(
            copy_template(pool, "Storage Event", "Archive", "Storage Outage")
                .await
                .expect("copy")
        );
        assert!(template_by_name(pool, "Archive", "Storage Outage")
            .await
            .expect("fetch")
            .is_some());
        assert!(template_by_name(pool, "Storage Event", "Storage Outage")
            .await
            .expect("fetch")
            .is_some());

        assert!(
            move_template(pool, "Storage Event", "Drafts", "Storage Outage")
                .await
                .expect("move")
        );
        assert!(template_by_name(pool, "Storage Event", "Storage Outage")
            .await
            .expect("fetch")
            .is_none());
        let moved = template_by_name(pool, "Drafts", "Storage Outage")
            .await
            .expect("fetch")
            .expect("moved template");
        assert_eq!(moved.variables, vars(&["ID"]));
    }

    #[tokio::test]
    async fn test_move_missing_template_reports_false() {
        let db = create_test_db().await;
        assert!(
            !move_template(db.pool(), "Nope", "Drafts", "Missing")
                .await
                .expect("move missing")
        );
    }
}
