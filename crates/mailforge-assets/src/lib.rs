//! Mailforge inline-image side-store.
//!
//! Rich-text template bodies arrive with images embedded as base64 data
//! URIs. Keeping those payloads in the database bloats every read, so this
//! crate extracts them into per-template directories on disk, rewrites the
//! markup to `cid:` references, and later hands the files back as
//! attachments at composition time.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod store;

pub use error::{AssetError, Result};
pub use store::AssetStore;
