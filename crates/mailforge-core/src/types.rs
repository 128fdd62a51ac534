//! Shared types used across the Mailforge application.
//!
//! Templates and event types are explicit record types rather than loose
//! maps; optional fields are modeled as empty strings matching the storage
//! schema, never as absent keys.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// A named category grouping related templates (e.g., "Storage Outage").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    /// Database identifier
    pub id: i64,
    /// Unique event type name
    pub name: String,
}

/// A stored, parameterized email template belonging to one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Database identifier
    pub id: i64,
    /// Identifier of the owning event type
    pub event_type_id: i64,
    /// Name of the owning event type
    pub event_type: String,
    /// Template name, unique within the event type
    pub name: String,
    /// Recipient line, may contain `{name}` placeholders
    pub to: String,
    /// CC line, may contain `{name}` placeholders
    pub cc: String,
    /// Subject line, may contain `{name}` placeholders
    pub subject: String,
    /// Body text, HTML or plain; classification is inferred at render time
    pub body: String,
    /// Desired sender address for composed messages
    pub sender: String,
    /// Free-form operator note
    pub note: String,
    /// Free-form tag
    pub tag: String,
    /// Declared variable names, in declaration order
    pub variables: Vec<String>,
}

/// Fields for creating or updating a template.
///
/// Saving a draft whose `(event_type, name)` already exists is an
/// update-in-place, never a duplicate insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    /// Template name, unique within the event type
    pub name: String,
    /// Recipient line
    pub to: String,
    /// CC line
    #[serde(default)]
    pub cc: String,
    /// Subject line
    pub subject: String,
    /// Body text
    pub body: String,
    /// Desired sender address
    #[serde(default)]
    pub sender: String,
    /// Free-form operator note
    #[serde(default)]
    pub note: String,
    /// Free-form tag
    #[serde(default)]
    pub tag: String,
}

impl TemplateDraft {
    /// Validate required fields before any storage mutation.
    ///
    /// Name, recipient, subject, body, and sender must be non-blank.
    ///
    /// # Errors
    /// Returns `CoreError::Validation` naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("to", &self.to),
            ("subject", &self.subject),
            ("body", &self.body),
            ("sender", &self.sender),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "required field '{field}' is empty"
                )));
            }
        }
        Ok(())
    }
}

/// Bulk export/import tree: every event type with its templates.
///
/// Order is insertion order; import re-inserts in tree order so a
/// round-trip preserves the structure exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTree {
    /// Exported event types, in insertion order
    pub event_types: Vec<EventTypeExport>,
}

/// One event type in an export tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeExport {
    /// Event type name
    pub name: String,
    /// Templates belonging to this event type, in insertion order
    pub templates: Vec<TemplateExport>,
}

/// One template in an export tree; identifiers are not exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateExport {
    /// Template name
    pub name: String,
    /// Recipient line
    #[serde(default)]
    pub to: String,
    /// CC line
    #[serde(default)]
    pub cc: String,
    /// Subject line
    #[serde(default)]
    pub subject: String,
    /// Body text
    #[serde(default)]
    pub body: String,
    /// Declared variable names
    #[serde(default)]
    pub variables: Vec<String>,
    /// Free-form operator note
    #[serde(default)]
    pub note: String,
    /// Free-form tag
    #[serde(default)]
    pub tag: String,
    /// Desired sender address
    #[serde(default)]
    pub sender: String,
}
