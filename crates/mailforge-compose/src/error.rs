//! Composition error types.

use thiserror::Error;

/// Errors from the composition pipeline.
///
/// Sender and signature resolution failures are deliberately absent: both
/// are non-fatal and surface as outcomes or warnings, never as errors.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Template store failure while loading the template.
    #[error(transparent)]
    Database(#[from] mailforge_db::DatabaseError),

    /// Asset store failure while listing attachments.
    #[error(transparent)]
    Asset(#[from] mailforge_assets::AssetError),

    /// I/O error during composition.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, ComposeError>;
