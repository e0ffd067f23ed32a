//! Whole-document rendering: entity records, placeholder stubs, and index pages.
//!
//! Rendering is pure — these functions return Markdown strings and never touch
//! the filesystem. Writing and cross-reference accumulation live in
//! `threatvault-core`.

use serde_json::Value;
use tracing::trace;

use threatvault_shared::{Record, RecordKind};

use crate::{is_truthy, normalize_name, render_field, sanitize_for_filename, value_text};

/// Field order for the main body of an entity document. Anything else lands
/// under `## Other Information` in source order.
const PREFERRED_ORDER: &[&str] = &[
    "description",
    "names",
    "country",
    "sponsor",
    "motivation",
    "first-seen",
    "category",
    "type",
    "observed-sectors",
    "observed-countries",
    "tools",
    "operations",
    "activity",
    "counter-operations",
    "information",
    "mitre-attack",
    "malpedia",
    "alienvault-otx",
    "playbook",
];

/// A fully rendered entity document.
#[derive(Debug, Clone)]
pub struct RenderedRecord {
    /// The document text, frontmatter included.
    pub markdown: String,
    /// Sanitized primary name — the document's filename stem and link target.
    pub sanitized_name: String,
    /// Normalized display title.
    pub title: String,
}

// ---------------------------------------------------------------------------
// Entity documents
// ---------------------------------------------------------------------------

/// Render one entity record into a complete Markdown document.
///
/// Document order: frontmatter (`title`, `data-scraped`, `type`, optional
/// `aliases` and `country`), a level-1 heading, the preferred fields, then
/// residual fields under one `## Other Information` header.
pub fn render_record(record: &Record, kind: RecordKind, scraped_date: &str) -> RenderedRecord {
    let primary = record
        .get(kind.primary_field())
        .map(value_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| kind.default_name().to_string());

    let title = normalize_name(&primary);
    let sanitized_name = sanitize_for_filename(&primary);

    trace!(name = %sanitized_name, %kind, "rendering record");

    let mut out = String::new();

    // Frontmatter
    out.push_str("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_yaml_string(&title)));
    out.push_str(&format!("data-scraped: {scraped_date}\n"));
    out.push_str(&format!("type: {kind}\n"));

    let aliases = collect_aliases(record, &primary);
    if !aliases.is_empty() {
        out.push_str("aliases:\n");
        for alias in &aliases {
            out.push_str(&format!("  - \"{}\"\n", escape_yaml_string(alias)));
        }
    }

    if let Some(countries) = record.get("country").filter(|v| is_truthy(v)) {
        out.push_str("country:\n");
        for item in string_items(countries) {
            out.push_str(&format!("  - \"[[{}]]\"\n", sanitize_for_filename(&item)));
        }
    }

    out.push_str("---\n\n");

    // Body
    out.push_str(&format!("# {title}\n\n"));

    for key in PREFERRED_ORDER {
        if let Some(value) = record.get(*key) {
            render_field(&mut out, key, value);
        }
    }

    // Residual fields, grouped under a single header written at most once.
    let mut other_header_written = false;
    for (key, value) in record {
        if key.as_str() == kind.primary_field() || PREFERRED_ORDER.contains(&key.as_str()) {
            continue;
        }
        if !is_truthy(value) {
            continue;
        }
        if !other_header_written {
            out.push_str("## Other Information\n");
            other_header_written = true;
        }
        render_field(&mut out, key, value);
    }

    RenderedRecord {
        markdown: out,
        sanitized_name,
        title,
    }
}

/// Aliases: entries of the `names` list whose `name` differs from the primary.
fn collect_aliases(record: &Record, primary: &str) -> Vec<String> {
    let Some(names) = record.get("names").and_then(Value::as_array) else {
        return Vec::new();
    };

    names
        .iter()
        .filter_map(|entry| entry.get("name").and_then(Value::as_str))
        .filter(|name| !name.is_empty() && *name != primary)
        .map(normalize_name)
        .collect()
}

/// Items of a field expected to be a string array; a lone scalar string is
/// treated as a single-item list.
fn string_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_text).collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Escape special characters in a YAML double-quoted string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ---------------------------------------------------------------------------
// Placeholder documents
// ---------------------------------------------------------------------------

/// Kinds of bare-name stub documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    Sector,
    Country,
}

impl PlaceholderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sector => "sector",
            Self::Country => "country",
        }
    }
}

impl std::fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a stub document for a name referenced by other documents but never
/// itself a full record.
pub fn render_placeholder(name: &str, kind: PlaceholderKind, scraped_date: &str) -> String {
    let title = normalize_name(name);

    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_yaml_string(&title)));
    out.push_str(&format!("data-scraped: {scraped_date}\n"));
    out.push_str(&format!("type: {kind}\n"));
    out.push_str("---\n\n");
    out.push_str(&format!("# {title}\n\n"));
    out.push_str(&format!("A page for the {kind} [[{title}]].\n"));
    out
}

// ---------------------------------------------------------------------------
// Index documents
// ---------------------------------------------------------------------------

/// Render an index page: a heading plus one cross-link bullet per item,
/// sorted lexicographically by sanitized form.
pub fn render_index<'a>(title: &str, items: impl IntoIterator<Item = &'a str>) -> String {
    let mut links: Vec<String> = items.into_iter().map(sanitize_for_filename).collect();
    links.sort_unstable();

    let mut out = String::new();
    out.push_str(&format!("# {title}\n\n"));
    for link in links {
        out.push_str(&format!("- [[{link}]]\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
