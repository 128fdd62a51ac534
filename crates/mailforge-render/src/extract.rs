//! Deterministic variable extraction from template text.
//!
//! The extraction order governs the order in which input fields are later
//! presented to the operator, so it must be stable and reproducible for
//! identical input.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("valid regex"))
}

/// Produce the ordered, deduplicated variable list for a template.
///
/// Policy, in order:
/// 1. Scan `subject` left-to-right; append each matched name the first time
///    it is seen, but only if it is in the declared set.
/// 2. Scan `body` the same way, skipping names already added.
/// 3. Append declared variables that never appeared textually, in their
///    declaration order.
#[must_use]
pub fn extraction_order(subject: &str, body: &str, declared: &[String]) -> Vec<String> {
    let declared_set: HashSet<&str> = declared.iter().map(String::as_str).collect();
    let mut ordered = Vec::with_capacity(declared.len());
    let mut seen: HashSet<&str> = HashSet::with_capacity(declared.len());

    let mut scan = |text: &str| {
        for capture in placeholder_regex().captures_iter(text) {
            let name = capture.get(1).map_or("", |m| m.as_str());
            if declared_set.contains(name) && !seen.contains(name) {
                // Borrow from the declared list so lifetimes outlive `text`
                let owned = declared
                    .iter()
                    .find(|d| d.as_str() == name)
                    .expect("name is in declared set");
                seen.insert(owned.as_str());
                ordered.push(owned.clone());
            }
        }
    };

    scan(subject);
    scan(body);

    for name in declared {
        if !seen.contains(name.as_str()) {
            seen.insert(name.as_str());
            ordered.push(name.clone());
        }
    }

    ordered
}
