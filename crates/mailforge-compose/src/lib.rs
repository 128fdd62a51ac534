//! Mailforge composition pipeline.
//!
//! Everything between "operator picked a template and filled the form" and
//! "a concrete mail client shows the message":
//!
//! - **Sender resolution**: a first-success chain of identity-assignment
//!   strategies behind the [`SenderSink`] seam; failure is non-fatal
//! - **Signature resolution**: named signature lookup from the per-user
//!   directory, with graceful degradation
//! - **Composer**: the orchestrator producing a [`ComposedMessage`] for a
//!   [`MailComposer`] implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod composer;
pub mod error;
pub mod sender;
pub mod signature;

pub use composer::{Attachment, ComposedMessage, Composer, MailComposer};
pub use error::{ComposeError, Result};
pub use sender::{resolve_sender, MailIdentity, SenderOutcome, SenderSink};
pub use signature::{SignatureSelector, SignatureStore};
