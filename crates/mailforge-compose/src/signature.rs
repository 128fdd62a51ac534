//! Signature selection and lookup.
//!
//! Named signatures live as `<name>.htm` / `<name>.html` files in a
//! per-user directory maintained by the mail client. We extract the body
//! fragment of the matching file so it can be appended to an HTML message
//! body. A name that resolves to nothing degrades to "no signature" with a
//! logged warning, never an error.

use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

fn body_fragment_regex() -> &'static Regex {
    static BODY: OnceLock<Regex> = OnceLock::new();
    BODY.get_or_init(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("valid regex"))
}

/// The operator's signature preference for one message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignatureSelector {
    /// Let the mail client apply its own default signature.
    #[default]
    Default,
    /// Suppress any signature.
    None,
    /// Append the named signature's body fragment; selecting one implies
    /// the client must not also apply its default.
    Named(String),
}

/// Read-only view over the per-user signature directory.
#[derive(Debug, Clone)]
pub struct SignatureStore {
    root: PathBuf,
}

impl SignatureStore {
    /// Create a store over the given signature directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a selector to the signature fragment to append, if any.
    ///
    /// `Default` and `None` resolve to no fragment. `Named` loads the file;
    /// a missing or unreadable file logs a warning and resolves to no
    /// fragment as well.
    #[must_use]
    pub fn resolve(&self, selector: &SignatureSelector) -> Option<String> {
        match selector {
            SignatureSelector::Default | SignatureSelector::None => None,
            SignatureSelector::Named(name) => {
                let fragment = self.load(name);
                if fragment.is_none() {
                    tracing::warn!("Signature '{name}' not found, sending without one");
                }
                fragment
            }
        }
    }

    /// Load a named signature's body fragment. `.htm` takes precedence over
    /// `.html`; a file without a `<body>` element is used whole.
    #[must_use]
    pub fn load(&self, name: &str) -> Option<String> {
        ["htm", "html"].iter().find_map(|ext| {
            let path = self.root.join(format!("{name}.{ext}"));
            let html = fs::read_to_string(&path).ok()?;
            Some(body_fragment(&html))
        })
    }

    /// Signature names available in the store, one per `.htm`/`.html` file,
    /// sorted and deduplicated.
    ///
    /// # Errors
    /// Returns the underlying I/O error if the directory cannot be listed.
    pub fn list(&self) -> std::io::Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_signature = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("htm") || ext.eq_ignore_ascii_case("html"));
            if is_signature {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

fn body_fragment(html: &str) -> String {
    body_fragment_regex()
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or_else(|| html.trim().to_string(), |m| m.as_str().trim().to_string())
}
