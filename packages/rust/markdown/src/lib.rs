//! Markdown rendering engine: name normalization, wikification, and the
//! field-rendering strategy table.
//!
//! Everything in this crate is pure string transformation — no I/O. The
//! `record` module renders whole documents (entities, placeholders, indexes);
//! this module provides the building blocks.

pub mod record;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub use record::{
    PlaceholderKind, RenderedRecord, render_index, render_placeholder, render_record,
};

/// Fields whose string-array values render as `[[...]]` cross-link bullets.
const CROSS_LINK_FIELDS: &[&str] = &["country", "observed-countries", "observed-sectors", "tools"];

/// Fields whose object-array values render as dated event bullets.
const EVENT_FIELDS: &[&str] = &["operations", "counter-operations", "activity"];

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

/// Remove every `[` and `]` from a display name.
///
/// Upstream data embeds stray bracket syntax in names; titles and link
/// targets must be free of it or the wiki-link syntax breaks.
pub fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| *c != '[' && *c != ']').collect()
}

/// Normalize a name, then replace filesystem-unsafe characters with `_`.
///
/// The same sanitization is applied wherever a name becomes a filename or a
/// cross-link target, so links generated in one document resolve to the file
/// generated for the same logical name elsewhere.
pub fn sanitize_for_filename(name: &str) -> String {
    normalize_name(name)
        .chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Wikification
// ---------------------------------------------------------------------------

/// Rewrite `{{...}}` references in free text to `[[...]]` wiki-links.
///
/// Unterminated or empty braces are left untouched. Applied only to
/// free-text fields; cross-link fields are sanitized and linked directly.
pub fn wikify_text(text: &str) -> String {
    static BRACE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex"));

    BRACE_RE.replace_all(text, "[[$1]]").into_owned()
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Textual form of a JSON value: strings verbatim, everything else via the
/// compact JSON representation.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether a field value is worth rendering. Falsy values (null, empty
/// string/array/object, zero, false) are skipped entirely — no empty
/// sections are emitted.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Python-style title case: the first letter of each word uppercased, the
/// rest lowercased. Word boundaries are any non-alphabetic character.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

/// Section header text for a field: `-` and `_` become spaces, then title case.
fn header_text(key: &str) -> String {
    title_case(&key.replace(['-', '_'], " "))
}

// ---------------------------------------------------------------------------
// Field rendering strategy
// ---------------------------------------------------------------------------

/// How a field's value is shaped into Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// String array where each item becomes a `- [[sanitized]]` bullet.
    CrossLinkList,
    /// String array rendered as plain wikified bullets.
    PlainList,
    /// Object array rendered as `- **date:** activity` bullets.
    EventList,
    /// Object array rendered as a Markdown table (columns from first row).
    Table,
    /// Anything else: a single wikified text line.
    Scalar,
}

/// Pick the rendering strategy for a field.
///
/// Known reference-like and event-like field names get their explicit
/// strategies; otherwise the strategy is inferred from the value's shape.
pub fn style_for(key: &str, value: &Value) -> FieldStyle {
    match value {
        Value::Array(items) if items.iter().all(Value::is_string) => {
            if CROSS_LINK_FIELDS.contains(&key) {
                FieldStyle::CrossLinkList
            } else {
                FieldStyle::PlainList
            }
        }
        Value::Array(items) if items.iter().all(Value::is_object) => {
            if EVENT_FIELDS.contains(&key) {
                FieldStyle::EventList
            } else {
                FieldStyle::Table
            }
        }
        // Mixed arrays fall back to plain bullets over coerced text.
        Value::Array(_) => FieldStyle::PlainList,
        _ => FieldStyle::Scalar,
    }
}

// ---------------------------------------------------------------------------
// Field rendering
// ---------------------------------------------------------------------------

/// Render one field as a `## Header` section followed by its shaped body.
///
/// Falsy values produce nothing. The fragment always ends with a blank line
/// so consecutive sections stay separated.
pub fn render_field(out: &mut String, key: &str, value: &Value) {
    if !is_truthy(value) {
        return;
    }

    out.push_str("## ");
    out.push_str(&header_text(key));
    out.push('\n');

    match style_for(key, value) {
        FieldStyle::CrossLinkList => {
            for item in value.as_array().into_iter().flatten() {
                let name = value_text(item);
                out.push_str(&format!("- [[{}]]\n", sanitize_for_filename(&name)));
            }
        }
        FieldStyle::PlainList => {
            for item in value.as_array().into_iter().flatten() {
                out.push_str(&format!("- {}\n", wikify_text(&value_text(item))));
            }
        }
        FieldStyle::EventList => {
            for item in value.as_array().into_iter().flatten() {
                let date = item
                    .get("date")
                    .and_then(Value::as_str)
                    .unwrap_or("N/A");
                let activity = item
                    .get("activity")
                    .map(value_text)
                    .unwrap_or_default();
                out.push_str(&format!("- **{date}:** {}\n", wikify_text(&activity)));
            }
        }
        FieldStyle::Table => render_table(out, value),
        FieldStyle::Scalar => {
            out.push_str(&wikify_text(&value_text(value)));
            out.push('\n');
        }
    }

    out.push('\n');
}

/// Render an object array as a Markdown table.
///
/// Column set comes from the sorted keys of the first row; values under keys
/// that only appear in later rows are dropped. Legacy behavior, kept as is.
fn render_table(out: &mut String, value: &Value) {
    let Some(items) = value.as_array() else {
        return;
    };
    let Some(first) = items.first().and_then(Value::as_object) else {
        return;
    };

    let mut headers: Vec<&str> = first.keys().map(String::as_str).collect();
    headers.sort_unstable();

    let header_row: Vec<String> = headers.iter().map(|h| title_case(h)).collect();
    out.push_str(&format!("| {} |\n", header_row.join(" | ")));
    out.push('|');
    for _ in &headers {
        out.push_str("---|");
    }
    out.push('\n');

    for item in items {
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                item.get(*h)
                    .map(|cell| wikify_text(&value_text(cell)))
                    .unwrap_or_default()
            })
            .collect();
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
