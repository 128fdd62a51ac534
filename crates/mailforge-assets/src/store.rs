//! Per-template image side-store.
//!
//! Authored HTML arrives with embedded base64 images. At save time those
//! payloads are extracted into files under one directory per template and
//! the markup rewritten to `cid:` references; composition later attaches
//! the files with matching content-ids. The store is keyed by template
//! name, so renaming a template requires an explicit directory move.

use crate::error::{AssetError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File extensions the store recognizes as attachable images.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

fn data_uri_regex() -> &'static Regex {
    static DATA_URI: OnceLock<Regex> = OnceLock::new();
    DATA_URI.get_or_init(|| {
        Regex::new(r#"<img [^>]*?src="(data:image/([^;]+);base64,([^"]+))"[^>]*?>"#)
            .expect("valid regex")
    })
}

fn cid_regex() -> &'static Regex {
    static CID: OnceLock<Regex> = OnceLock::new();
    CID.get_or_init(|| Regex::new(r#"<img [^>]*?src="cid:([^"]+)"[^>]*?>"#).expect("valid regex"))
}

/// Content-addressed image store rooted at a configurable directory.
///
/// Only this store mutates the directory tree; callers never touch the
/// files directly.
#[derive(Debug, Clone)]
pub struct AssetStore {
    images_root: PathBuf,
}

impl AssetStore {
    /// Create a store rooted at `images_root`. The root is created lazily.
    #[must_use]
    pub fn new(images_root: impl Into<PathBuf>) -> Self {
        Self {
            images_root: images_root.into(),
        }
    }

    /// Root directory of the side-store.
    #[must_use]
    pub fn images_root(&self) -> &Path {
        &self.images_root
    }

    /// Directory-safe form of a template name: every character outside
    /// `[A-Za-z0-9_-]` becomes `_`.
    #[must_use]
    pub fn sanitize_name(template_name: &str) -> String {
        template_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Extract embedded base64 images into files and rewrite their `src`
    /// attributes to `cid:` references.
    ///
    /// Each image gets a freshly generated random token plus its original
    /// format extension. Rewriting happens span by span at the matched
    /// attribute, so one data URI being a prefix of another never corrupts
    /// the longer one. Non-base64 images are untouched. Individual decode
    /// or write failures are logged and skipped; the rest of the document
    /// is still processed.
    ///
    /// # Errors
    /// Returns `AssetError` only if the template directory cannot be created.
    pub fn extract_and_store(&self, html: &str, template_name: &str) -> Result<String> {
        if !html.contains("data:image") {
            return Ok(html.to_string());
        }

        let template_dir = self.ensure_template_dir(template_name)?;
        let mut rewritten = String::with_capacity(html.len());
        let mut tail = 0;
        // One file serves every occurrence of the same payload; `None`
        // marks a payload that failed to decode or write.
        let mut stored: HashMap<&str, Option<String>> = HashMap::new();

        for capture in data_uri_regex().captures_iter(html) {
            let Some(uri) = capture.get(1) else { continue };
            let format = capture.get(2).map_or("png", |m| m.as_str());
            let payload = capture.get(3).map_or("", |m| m.as_str());

            let filename = stored
                .entry(uri.as_str())
                .or_insert_with(|| store_image(&template_dir, format, payload));
            let Some(filename) = filename else { continue };

            rewritten.push_str(&html[tail..uri.start()]);
            rewritten.push_str("cid:");
            rewritten.push_str(filename);
            tail = uri.end();
        }
        rewritten.push_str(&html[tail..]);

        Ok(rewritten)
    }

    /// Delete every file in the template's directory that the given HTML
    /// snapshot no longer references.
    ///
    /// The reference set and the deletions are both computed from the one
    /// `html` argument, so a referenced file is never deleted. Per-file
    /// delete failures are logged and skipped.
    ///
    /// # Errors
    /// Returns `AssetError` if the directory listing fails.
    pub fn cleanup_unused(&self, html: &str, template_name: &str) -> Result<()> {
        let template_dir = self.template_dir(template_name);
        if !template_dir.exists() {
            return Ok(());
        }

        let referenced: HashSet<String> = cid_regex()
            .captures_iter(html)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();

        for entry in fs::read_dir(&template_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if referenced.contains(&name) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!("Removed unreferenced image {}", path.display()),
                Err(e) => tracing::warn!("Failed to remove {}: {e}", path.display()),
            }
        }

        Ok(())
    }

    /// Move the asset directory when its template is renamed.
    ///
    /// A missing source directory is a successful no-op. An existing target
    /// directory is replaced, discarding its contents.
    ///
    /// # Errors
    /// Returns `AssetError` if the move itself fails.
    pub fn rename_template_dir(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_dir = self.template_dir(old_name);
        let new_dir = self.template_dir(new_name);

        if old_dir == new_dir || !old_dir.exists() {
            return Ok(());
        }

        if new_dir.exists() {
            fs::remove_dir_all(&new_dir).map_err(|e| {
                AssetError::Directory(format!(
                    "failed to clear target directory {}: {e}",
                    new_dir.display()
                ))
            })?;
        }

        fs::rename(&old_dir, &new_dir).map_err(|e| {
            AssetError::Directory(format!(
                "failed to move {} to {}: {e}",
                old_dir.display(),
                new_dir.display()
            ))
        })?;

        tracing::debug!(
            "Moved asset directory {} -> {}",
            old_dir.display(),
            new_dir.display()
        );
        Ok(())
    }

    /// List the template's image files (by extension allow-list), sorted by
    /// file name, for attachment purposes.
    ///
    /// # Errors
    /// Returns `AssetError` if the directory listing fails.
    pub fn assets_for(&self, template_name: &str) -> Result<Vec<PathBuf>> {
        let template_dir = self.template_dir(template_name);
        if !template_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&template_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| {
                    let ext = ext.to_lowercase();
                    IMAGE_EXTENSIONS.contains(&ext.as_str())
                });
            if is_image {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn template_dir(&self, template_name: &str) -> PathBuf {
        self.images_root.join(Self::sanitize_name(template_name))
    }

    fn ensure_template_dir(&self, template_name: &str) -> Result<PathBuf> {
        let dir = self.template_dir(template_name);
        fs::create_dir_all(&dir).map_err(|e| {
            AssetError::Directory(format!("failed to create {}: {e}", dir.display()))
        })?;
        Ok(dir)
    }
}

/// Decode one payload and write it under a fresh random file name.
/// Returns `None` (after logging) when the image cannot be stored.
fn store_image(dir: &Path, format: &str, payload: &str) -> Option<String> {
    let bytes = match STANDARD.decode(payload) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Skipping undecodable inline image: {e}");
            return None;
        }
    };

    let filename = format!("{}.{}", uuid::Uuid::new_v4(), format.to_lowercase());
    let path = dir.join(&filename);
    if let Err(e) = fs::write(&path, &bytes) {
        tracing::warn!("Skipping inline image, write failed: {e}");
        return None;
    }

    tracing::debug!("Stored inline image as {}", path.display());
    Some(filename)
}
