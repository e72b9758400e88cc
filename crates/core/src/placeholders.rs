//! `{{field_name}}` placeholder extraction, syntax checking and rendering.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A field name: letter or underscore first, then letters, digits, underscores.
pub const FIELD_NAME_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

/// A well-formed placeholder. Capture group 1 is the field name.
pub const PLACEHOLDER_PATTERN: &str = r"\{\{([a-zA-Z_][a-zA-Z0-9_]*)\}\}";

/// Any `{{...}}` pair, well-formed or not. Used for syntax checking.
const BRACE_PAIR_PATTERN: &str = r"\{\{([^}]+)\}\}";

/// Replacement text for placeholders without a value under [`UnfilledPolicy::Marker`].
pub const UNFILLED_MARKER: &str = "[not filled]";

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FIELD_NAME_PATTERN).expect("valid regex"));

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

static BRACE_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BRACE_PAIR_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Whether `name` is usable as a template field name.
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME_RE.is_match(name)
}

/// Build the literal placeholder token for a field name.
pub fn placeholder_for(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Extract the unique field names referenced by well-formed placeholders.
///
/// The result is sorted and de-duplicated. Malformed `{{...}}` pairs are
/// ignored here; see [`find_invalid_placeholders`].
pub fn extract_field_names(content: &str) -> Vec<String> {
    let mut names: Vec<String> = PLACEHOLDER_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Return the trimmed inner text of every `{{...}}` pair whose content is
/// not a valid field name, in order of first appearance.
pub fn find_invalid_placeholders(content: &str) -> Vec<String> {
    let mut invalid: Vec<String> = Vec::new();
    for caps in BRACE_PAIR_RE.captures_iter(content) {
        let inner = caps[1].trim();
        if !is_valid_field_name(inner) && !invalid.iter().any(|s| s == inner) {
            invalid.push(inner.to_string());
        }
    }
    invalid
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// What to emit for a placeholder that has no (non-blank) value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnfilledPolicy {
    /// Leave `{{name}}` in the output.
    #[default]
    Keep,
    /// Replace with [`UNFILLED_MARKER`].
    Marker,
}

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedContent {
    pub text: String,
    /// Field names that had no value, in order of first appearance.
    pub unfilled_fields: Vec<String>,
}

/// Substitute field values into `content`.
///
/// Values are inserted in a single pass, so a value that itself contains
/// `{{other}}` is emitted verbatim. Whitespace-only values count as unfilled.
pub fn render(
    content: &str,
    values: &HashMap<String, String>,
    policy: UnfilledPolicy,
) -> RenderedContent {
    let mut unfilled: Vec<String> = Vec::new();
    let text = PLACEHOLDER_RE
        .replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match values.get(name) {
                Some(value) if !value.trim().is_empty() => value.clone(),
                _ => {
                    if !unfilled.iter().any(|n| n == name) {
                        unfilled.push(name.to_string());
                    }
                    match policy {
                        UnfilledPolicy::Keep => caps[0].to_string(),
                        UnfilledPolicy::Marker => UNFILLED_MARKER.to_string(),
                    }
                }
            }
        })
        .into_owned();

    RenderedContent {
        text,
        unfilled_fields: unfilled,
    }
}
