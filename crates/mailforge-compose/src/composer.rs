//! Composition orchestrator.
//!
//! One call from template name to a fully resolved message: load the
//! stored template, render it against the operator's variable values,
//! collect the image attachments its body references, and resolve the
//! signature preference. The result is handed to a [`MailComposer`]
//! implementation; nothing here touches a concrete mail API.

use crate::error::{ComposeError, Result};
use crate::signature::{SignatureSelector, SignatureStore};
use mailforge_assets::AssetStore;
use mailforge_db::{templates, Database, DatabaseError};
use mailforge_render::render;
use std::collections::HashMap;
use std::path::PathBuf;

/// One file to attach, referenced from the body by its content-id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Path to the image file on disk.
    pub path: PathBuf,
    /// Content-id the body references it by; equal to the file name.
    pub content_id: String,
}

/// A fully resolved message, ready for an external mail client.
///
/// Long subject lines are passed through untruncated; how a client handles
/// them is client-dependent and not our concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    /// Resolved recipient line.
    pub to: String,
    /// Resolved CC line.
    pub cc: String,
    /// Resolved subject line.
    pub subject: String,
    /// Resolved body, signature fragment already appended when one applies.
    pub body: String,
    /// Whether `body` is HTML.
    pub body_is_html: bool,
    /// Desired sender address; empty when the template declares none.
    /// Assignment against the client runs through
    /// [`resolve_sender`](crate::sender::resolve_sender) and is non-fatal.
    pub sender_email: String,
    /// Effective signature preference after resolution. `Named` never
    /// survives here: a found fragment is inlined into `body` and the
    /// selector becomes `None` so the client skips its default too.
    pub signature: SignatureSelector,
    /// Image attachments whose content-ids the body references.
    pub attachments: Vec<Attachment>,
}

/// Destination for composed messages; the seam to a concrete mail client.
pub trait MailComposer {
    /// Hand the message to the client for display or sending.
    ///
    /// # Errors
    /// Returns a client-specific message on failure.
    fn deliver(&mut self, message: &ComposedMessage) -> std::result::Result<(), String>;
}

/// Orchestrates the store, renderer, asset store, and signature store.
#[derive(Debug)]
pub struct Composer<'a> {
    db: &'a Database,
    assets: &'a AssetStore,
    signatures: &'a SignatureStore,
}

impl<'a> Composer<'a> {
    /// Wire a composer over the shared component handles.
    #[must_use]
    pub fn new(db: &'a Database, assets: &'a AssetStore, signatures: &'a SignatureStore) -> Self {
        Self {
            db,
            assets,
            signatures,
        }
    }

    /// Compose the named template into a resolved message.
    ///
    /// # Errors
    /// Returns `ComposeError::Database` when the template does not exist or
    /// the store fails, `ComposeError::Asset` when the attachment listing
    /// fails. Sender and signature problems never fail composition.
    pub async fn compose(
        &self,
        event_type: &str,
        template_name: &str,
        values: &HashMap<String, String>,
        signature: SignatureSelector,
    ) -> Result<ComposedMessage> {
        let template = templates::template_by_name(self.db.pool(), event_type, template_name)
            .await?
            .ok_or_else(|| {
                ComposeError::Database(DatabaseError::NotFound(format!(
                    "template '{template_name}' under event type '{event_type}'"
                )))
            })?;

        let rendered = render(&template, values);

        let attachments = self.referenced_attachments(&template.name, &rendered.body)?;

        // Inlining a signature fragment always yields an HTML body: a plain
        // body gets the wrapping shell along with the fragment.
        let (body, body_is_html, signature) = match self.signatures.resolve(&signature) {
            Some(fragment) => (
                append_signature(&rendered.body, &fragment, rendered.body_is_html),
                true,
                SignatureSelector::None,
            ),
            None => (
                rendered.body,
                rendered.body_is_html,
                match signature {
                    SignatureSelector::Named(_) => SignatureSelector::None,
                    other => other,
                },
            ),
        };

        tracing::debug!(
            "Composed '{template_name}' ({} attachment(s))",
            attachments.len()
        );

        Ok(ComposedMessage {
            to: rendered.to,
            cc: rendered.cc,
            subject: rendered.subject,
            body,
            body_is_html,
            sender_email: template.sender,
            signature,
            attachments,
        })
    }

    /// Stored images whose content-id the rendered body actually references.
    fn referenced_attachments(&self, template_name: &str, body: &str) -> Result<Vec<Attachment>> {
        if !body.contains("cid:") {
            return Ok(Vec::new());
        }
        let attachments = self
            .assets
            .assets_for(template_name)?
            .into_iter()
            .filter_map(|path| {
                let content_id = path.file_name()?.to_str()?.to_string();
                body.contains(&format!("cid:{content_id}"))
                    .then_some(Attachment { path, content_id })
            })
            .collect();
        Ok(attachments)
    }
}

/// Insert the signature fragment before the closing `</body>` when the body
/// has one, otherwise append it. A plain-text body gets the HTML shell, so
/// the fragment's markup is never emitted into non-HTML content.
fn append_signature(body: &str, fragment: &str, body_is_html: bool) -> String {
    if let Some(idx) = body.rfind("</body>") {
        format!("{}{}{}", &body[..idx], fragment, &body[idx..])
    } else if body_is_html {
        format!("{body}\n{fragment}")
    } else {
        format!("<html><body>{body}\n{fragment}</body></html>")
    }
}
