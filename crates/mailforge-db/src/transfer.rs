//! Bulk export and import of the whole template store.
//!
//! Export produces an ordered tree of event types and their templates.
//! Import is a destructive replace: all existing template data is discarded
//! and the tree re-inserted inside one all-or-nothing transaction.

use crate::error::{DatabaseError, Result};
use crate::templates;
use mailforge_core::{EventTypeExport, ExportTree, TemplateExport};
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Export every event type with its templates and variables.
///
/// Order is insertion order (ascending rowid) at both levels, so a
/// round-trip through [`import_templates`] reproduces the tree exactly.
///
/// # Errors
/// Returns `DatabaseError` if any query fails.
pub async fn export_templates(pool: &Pool<Sqlite>) -> Result<ExportTree> {
    let event_rows =
        sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM event_types ORDER BY id")
            .fetch_all(pool)
            .await?;

    let mut tree = ExportTree::default();
    for (event_id, event_name) in event_rows {
        let template_rows = sqlx::query_as::<_, (i64, String, String, String, String, String, String, String, String)>(
            "SELECT id, name, recipient, cc, subject, body, note, tag, sender
             FROM templates
             WHERE event_type_id = ?
             ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        let mut exported = Vec::with_capacity(template_rows.len());
        for (id, name, to, cc, subject, body, note, tag, sender) in template_rows {
            let variables = templates::variables_for(pool, id).await?;
            exported.push(TemplateExport {
                name,
                to,
                cc,
                subject,
                body,
                variables,
                note,
                tag,
                sender,
            });
        }

        tree.event_types.push(EventTypeExport {
            name: event_name,
            templates: exported,
        });
    }

    Ok(tree)
}

/// Replace the entire template store with the given tree.
///
/// All existing event types, templates, and variables are deleted and the
/// tree inserted in order, inside one transaction. On any failure the
/// prior state is left intact.
///
/// # Errors
/// Returns `DatabaseError` if the transaction fails.
pub async fn import_templates(pool: &Pool<Sqlite>, tree: &ExportTree) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM template_variables")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM templates").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM event_types")
        .execute(&mut *tx)
        .await?;

    for event_type in &tree.event_types {
        let result = sqlx::query("INSERT INTO event_types (name) VALUES (?)")
            .bind(&event_type.name)
            .execute(&mut *tx)
            .await?;
        let event_type_id = result.last_insert_rowid();

        for template in &event_type.templates {
            let result = sqlx::query(
                "INSERT INTO templates (event_type_id, name, recipient, cc, subject, body, note, tag, sender)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(event_type_id)
            .bind(&template.name)
            .bind(&template.to)
            .bind(&template.cc)
            .bind(&template.subject)
            .bind(&template.body)
            .bind(&template.note)
            .bind(&template.tag)
            .bind(&template.sender)
            .execute(&mut *tx)
            .await?;
            let template_id = result.last_insert_rowid();

            for variable in &template.variables {
                sqlx::query(
                    "INSERT OR IGNORE INTO template_variables (template_id, variable_name) VALUES (?, ?)",
                )
                .bind(template_id)
                .bind(variable)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    tx.commit().await?;

    tracing::info!(
        "Imported {} event types, replacing all template data",
        tree.event_types.len()
    );
    Ok(())
}

/// Export the store to a JSON file.
///
/// # Errors
/// Returns `DatabaseError` if the export or write fails.
pub async fn export_to_file(pool: &Pool<Sqlite>, path: impl AsRef<Path>) -> Result<()> {
    let tree = export_templates(pool).await?;
    let json = serde_json::to_string_pretty(&tree)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
    tokio::fs::write(path.as_ref(), json).await?;
    Ok(())
}

/// Import the store from a JSON file produced by [`export_to_file`].
///
/// # Errors
/// Returns `DatabaseError::ImportRejected` for unreadable JSON, or
/// `DatabaseError` if the import transaction fails.
pub async fn import_from_file(pool: &Pool<Sqlite>, path: impl AsRef<Path>) -> Result<()> {
    let json = tokio::fs::read_to_string(path.as_ref()).await?;
    let tree: ExportTree = serde_json::from_str(&json)
        .map_err(|e| DatabaseError::ImportRejected(format!("invalid export tree: {e}")))?;
    import_templates(pool, &tree).await
}

/// Seed the sample event type and template on an empty store.
///
/// Returns `true` if seeding happened, `false` when the store already has
/// event types.
///
/// # Errors
/// Returns `DatabaseError` if any query fails.
pub async fn seed_defaults(pool: &Pool<Sqlite>) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_types")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    let event_id = crate::event_types::add_event_type(pool, "Storage Event").await?;
    let draft = mailforge_core::TemplateDraft {
        name: "Storage Outage".to_string(),
        to: "recipient1@example.com".to_string(),
        cc: "cc1@example.com, cc2@example.com".to_string(),
        subject: "Storage Outage Notification - {ID}".to_string(),
        body: "<html><body><p>Dear Team,</p>\
               <p>We are experiencing a storage outage at {Location}. \
               The issue has been identified with ID {ID}.</p>\
               <p>The affected company is {Company}.</p>\
               <p>We are working to resolve this issue and will provide updates as necessary.</p>\
               <p>Best regards,</p></body></html>"
            .to_string(),
        sender: "ops@example.com".to_string(),
        note: "This is a storage outage notification.".to_string(),
        tag: "outage".to_string(),
    };
    let variables = vec![
        "ID".to_string(),
        "Location".to_string(),
        "Company".to_string(),
    ];
    templates::upsert_template(pool, event_id, &draft, &variables).await?;

    tracing::info!("Seeded default event type and template");
    Ok(true)
}
