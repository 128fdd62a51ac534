//! Mailforge core types and configuration.
//!
//! This crate provides the foundational pieces shared by every Mailforge
//! subsystem:
//!
//! - **Types**: explicit record types for event types, templates, drafts,
//!   and the bulk export/import tree
//! - **Configuration**: TOML config with XDG paths and env overrides
//! - **Errors**: `CoreError` for config, validation, and I/O concerns
//!   shared across crates
//!
//! # Design Principles
//!
//! - No global mutable state: every component receives explicit handles
//!   constructed once at process start
//! - Validation happens before any storage mutation
//! - Optional template fields are empty strings, never absent keys

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{ConfigError, CoreError, Result};
pub use types::{EventType, EventTypeExport, ExportTree, Template, TemplateDraft, TemplateExport};
