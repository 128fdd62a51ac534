//! Asset store error types.

use thiserror::Error;

/// Errors from the image side-store.
///
/// Per-image decode and write failures are logged and skipped rather than
/// surfaced here; these variants cover whole-operation failures only.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The per-template asset directory could not be created or moved.
    #[error("asset directory error: {0}")]
    Directory(String),

    /// I/O error during asset operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;
