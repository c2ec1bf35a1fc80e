//! Markup defense for user-visible text.
//!
//! Every string that reaches the result pane or the history log goes through
//! [`sanitize_text`] first; outbound selections go through
//! [`validate_selection`] instead so the model sees the literal text.
//! Sanitizing is deterministic and idempotent: running already-sanitized text
//! through again is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static RE_JS_URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript\s*:").unwrap());
static RE_EVENT_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bon\w+\s*=").unwrap());

/// Entities emitted by [`escape_html`]. An ampersand opening one of these is
/// left alone so that escaping stays idempotent.
const KNOWN_ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"];

/// Strip script blocks and inline handler patterns, then entity-escape the
/// five reserved HTML characters.
pub fn sanitize_text(text: &str) -> String {
    let mut stripped = text.to_string();
    // Removal can splice surrounding characters into a new match
    // ("<scr<script>..</script>ipt>"), so repeat until stable.
    loop {
        let pass = RE_SCRIPT_BLOCK.replace_all(&stripped, "");
        let pass = RE_JS_URI.replace_all(&pass, "");
        let pass = RE_EVENT_ATTR.replace_all(&pass, "").into_owned();
        if pass == stripped {
            break;
        }
        stripped = pass;
    }
    escape_html(&stripped)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' => {
                if KNOWN_ENTITIES.iter().any(|e| text[idx..].starts_with(e)) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Outcome of validating a selection before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub error: Option<String>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn reject(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Check length and content constraints on text submitted for translation.
/// A rejection means no request may be issued.
pub fn validate_selection(text: &str, max_chars: usize) -> ValidationReport {
    if text.trim().is_empty() {
        return ValidationReport::reject("Nothing selected.");
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return ValidationReport::reject(format!(
            "Selection is too long ({chars} characters; the limit is {max_chars})."
        ));
    }
    if RE_SCRIPT_BLOCK.is_match(text) {
        return ValidationReport::reject("Selection contains unsafe markup.");
    }
    ValidationReport::ok()
}
