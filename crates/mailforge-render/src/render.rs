//! Placeholder substitution and message rendering.
//!
//! Substitution is a single scan per field: every `{name}` token is replaced
//! by its mapped value, and unresolved tokens are left verbatim so a
//! half-filled form never silently drops text. The mention transform
//! (`@{name}` to `@Display Name`) runs before ordinary substitution.

use mailforge_core::Template;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Variable names beginning with this prefix carry image content, never
/// text; their placeholders are handled by the image pipeline.
pub const PHOTO_VARIABLE_PREFIX: &str = "photo_";

/// Literal stand-in for a photo variable outside resolved HTML image markup.
pub const PHOTO_PLACEHOLDER: &str = "[image]";

/// Structural tags that mark a body as HTML even without an `<html>` tag.
const HTML_STRUCTURAL_TAGS: [&str; 6] = ["<p>", "<div>", "<span>", "<table>", "<br", "<img"];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("valid regex"))
}

fn mention_regex() -> &'static Regex {
    static MENTION: OnceLock<Regex> = OnceLock::new();
    MENTION.get_or_init(|| Regex::new(r"@\{([^{}]+)\}").expect("valid regex"))
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

/// A fully rendered message body plus resolved header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Resolved recipient line
    pub to: String,
    /// Resolved CC line
    pub cc: String,
    /// Resolved subject line
    pub subject: String,
    /// Resolved body; wrapped in an HTML shell when structural tags require it
    pub body: String,
    /// Whether the body should be handed to the client as HTML
    pub body_is_html: bool,
}

/// How photo-prefixed placeholders are treated during substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhotoMode {
    /// Replace with [`PHOTO_PLACEHOLDER`] (plain text, subject, to/cc)
    Placeholder,
    /// Leave the token untouched; the image pipeline already produced markup
    Skip,
}

/// Render a template against a variable map.
///
/// Substitution applies independently to `to`, `cc`, `subject`, and `body`.
/// Unresolved `{name}` tokens are left verbatim. The body is classified as
/// HTML or plain text; plain text wrapped for an HTML-capable client is
/// enclosed in exactly one `<html><body>` shell, never double-wrapped.
#[must_use]
pub fn render(template: &Template, values: &HashMap<String, String>) -> Rendered {
    let to = render_field(&template.to, values);
    let cc = render_field(&template.cc, values);
    let subject = render_field(&template.subject, values);

    let raw_is_html = is_html(&template.body);
    let photo_mode = if raw_is_html && template.body.contains("cid:") {
        PhotoMode::Skip
    } else {
        PhotoMode::Placeholder
    };

    let body = apply_mentions(&template.body, values);
    let body = substitute(&body, values, photo_mode);

    let (body, body_is_html) = classify_body(body);

    Rendered {
        to,
        cc,
        subject,
        body,
        body_is_html,
    }
}

/// Render one header-style field: mentions first, then substitution with
/// photo placeholders resolved to [`PHOTO_PLACEHOLDER`].
#[must_use]
pub fn render_field(text: &str, values: &HashMap<String, String>) -> String {
    let text = apply_mentions(text, values);
    substitute(&text, values, PhotoMode::Placeholder)
}

/// True when the text should be treated as HTML: an `<html>` tag or any
/// structural tag, case-insensitive.
#[must_use]
pub fn is_html(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("<html>") || HTML_STRUCTURAL_TAGS.iter().any(|tag| lower.contains(tag))
}

fn substitute(text: &str, values: &HashMap<String, String>, photo_mode: PhotoMode) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            if name.starts_with(PHOTO_VARIABLE_PREFIX) {
                return match photo_mode {
                    PhotoMode::Placeholder => PHOTO_PLACEHOLDER.to_string(),
                    PhotoMode::Skip => caps[0].to_string(),
                };
            }
            match values.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn apply_mentions(text: &str, values: &HashMap<String, String>) -> String {
    mention_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            match values.get(name) {
                Some(value) if email_regex().is_match(value) => {
                    format!("@{}", display_name(value))
                }
                // Not an address (or unresolved): leave the token for
                // ordinary substitution
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Derive a display name from the local part of an email address:
/// separators become spaces and each word is capitalized.
fn display_name(address: &str) -> String {
    let local = address.split('@').next().unwrap_or(address);
    local
        .split('.')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify the substituted body and wrap plain-structural HTML exactly once.
fn classify_body(body: String) -> (String, bool) {
    let lower = body.to_lowercase();
    if lower.contains("<html>") {
        return (body, true);
    }
    if HTML_STRUCTURAL_TAGS.iter().any(|tag| lower.contains(tag)) {
        return (format!("<html><body>{body}</body></html>"), true);
    }
    (body, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(subject: &str, body: &str) -> Template {
        Template {
            id: 1,
            event_type_id: 1,
            event_type: "Storage Event".to_string(),
            name: "Storage Outage".to_string(),
            to: "team@example.com".to_string(),
            cc: String::new(),
            subject: subject.to_string(),
            body: body.to_string(),
            sender: "ops@example.com".to_string(),
            note: String::new(),
            tag: String::new(),
            variables: vec![],
        }
    }

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_basic_substitution() {
        let rendered = render(
            &template("Outage {ID}", "At {Location}, id {ID}."),
            &values(&[("ID", "INC-7"), ("Location", "DC-West")]),
        );
        assert_eq!(rendered.subject, "Outage INC-7");
        assert_eq!(rendered.body, "At DC-West, id INC-7.");
        assert!(!rendered.body_is_html);
    }

    #[test]
    fn test_unresolved_placeholder_left_verbatim() {
        let rendered = render(&template("s", "Hi {name}"), &HashMap::new());
        assert_eq!(rendered.body, "Hi {name}");
    }

    #[test]
    fn test_recipient_lines_are_substituted() {
        let mut t = template("s", "b");
        t.to = "{primary}".to_string();
        t.cc = "{secondary}, static@example.com".to_string();
        let rendered = render(
            &t,
            &values(&[
                ("primary", "a@example.com"),
                ("secondary", "b@example.com"),
            ]),
        );
        assert_eq!(rendered.to, "a@example.com");
        assert_eq!(rendered.cc, "b@example.com, static@example.com");
    }

    #[test]
    fn test_mention_transform_produces_display_name() {
        let rendered = render(
            &template("s", "cc @{contact}"),
            &values(&[("contact", "john.doe@example.com")]),
        );
        assert_eq!(rendered.body, "cc @John Doe");
    }

    #[test]
    fn test_mention_unresolved_left_unchanged() {
        let rendered = render(&template("s", "ping @{nobody}"), &HashMap::new());
        assert_eq!(rendered.body, "ping @{nobody}");
    }

    #[test]
    fn test_mention_non_address_falls_through_to_substitution() {
        let rendered = render(
            &template("s", "ping @{handle}"),
            &values(&[("handle", "frontdesk")]),
        );
        assert_eq!(rendered.body, "ping @frontdesk");
    }

    #[test]
    fn test_mention_runs_before_ordinary_substitution() {
        // Ordinary substitution alone would produce "@john.doe@example.com"
        let rendered = render(
            &template("s", "escalate to @{contact} ({contact})"),
            &values(&[("contact", "mary.anne@example.com")]),
        );
        assert_eq!(rendered.body, "escalate to @Mary Anne (mary.anne@example.com)");
    }

    #[test]
    fn test_photo_variable_resolves_to_placeholder_in_text() {
        let rendered = render(
            &template("See {photo_site}", "Attached: {photo_site}"),
            &values(&[("photo_site", "ignored")]),
        );
        assert_eq!(rendered.subject, "See [image]");
        assert_eq!(rendered.body, "Attached: [image]");
    }

    #[test]
    fn test_photo_variable_skipped_in_resolved_html_body() {
        let body = r#"<p>Before {photo_site}</p><img src="cid:abc123.png">"#;
        let rendered = render(&template("s", body), &values(&[("photo_site", "x")]));
        assert!(rendered.body.contains("{photo_site}"), "token left untouched");
        assert!(rendered.body_is_html);
    }

    #[test]
    fn test_full_html_body_not_wrapped() {
        let rendered = render(
            &template("s", "<html><body><p>Hi {name}</p></body></html>"),
            &values(&[("name", "Ana")]),
        );
        assert_eq!(rendered.body, "<html><body><p>Hi Ana</p></body></html>");
        assert!(rendered.body_is_html);
    }

    #[test]
    fn test_structural_html_wrapped_exactly_once() {
        let rendered = render(&template("s", "<p>Hello</p>"), &HashMap::new());
        assert_eq!(rendered.body, "<html><body><p>Hello</p></body></html>");
        assert!(rendered.body_is_html);

        // A second render of already-wrapped output must not wrap again
        let rewrapped = classify_body(rendered.body.clone());
        assert_eq!(rewrapped.0, rendered.body);
    }

    #[test]
    fn test_plain_text_stays_plain() {
        let rendered = render(&template("s", "Just words, no markup."), &HashMap::new());
        assert_eq!(rendered.body, "Just words, no markup.");
        assert!(!rendered.body_is_html);
    }

    #[test]
    fn test_html_detection_is_case_insensitive() {
        assert!(is_html("<HTML><body>x</body></HTML>"));
        assert!(is_html("line<BR>break"));
        assert!(!is_html("a < b and b > c"));
    }

    #[test]
    fn test_display_name_capitalization() {
        assert_eq!(display_name("john.doe@example.com"), "John Doe");
        assert_eq!(display_name("mary.ANNE@example.com"), "Mary Anne");
        assert_eq!(display_name("solo@example.com"), "Solo");
    }
}
