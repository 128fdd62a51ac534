//! Mailforge rendering pipeline.
//!
//! Turns a stored template plus a variable map into resolved message text:
//!
//! - **Extraction**: deterministic, deduplicated variable ordering used to
//!   lay out the operator's input form
//! - **Rendering**: `{name}` placeholder substitution, the `@{name}` mention
//!   transform, photo-variable placeholders, and HTML/plain classification

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod extract;
pub mod render;

pub use extract::extraction_order;
pub use render::{is_html, render, render_field, Rendered, PHOTO_PLACEHOLDER, PHOTO_VARIABLE_PREFIX};
