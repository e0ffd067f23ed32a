//! Core domain types for ThreatVault vaults.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single threat-intelligence record: a free-form JSON object.
///
/// Records carry no fixed schema; field values are scalars, arrays of
/// strings, or arrays of nested objects (e.g. `{date, activity}` entries).
/// Field order is preserved by `serde_json`'s `preserve_order` feature so
/// residual fields render in source order.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// The two kinds of entity record the vault is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A malware/utility record; primary name lives in the `tool` field.
    Tool,
    /// A threat-actor record; primary name lives in the `actor` field.
    Group,
}

impl RecordKind {
    /// The field holding the record's primary name.
    pub fn primary_field(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Group => "actor",
        }
    }

    /// Fallback display name for records missing their primary field.
    pub fn default_name(self) -> &'static str {
        match self {
            Self::Tool => "Unnamed Tool",
            Self::Group => "Unnamed Group",
        }
    }

    /// Lowercase literal used in frontmatter `type:` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Envelope shape of an input collection file: `{"values": [ <record>, ... ]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    /// The records in this collection. Missing `values` parses as empty.
    #[serde(default)]
    pub values: Vec<Record>,
}

// ---------------------------------------------------------------------------
// CorpusSets
// ---------------------------------------------------------------------------

/// Cross-reference names accumulated over the whole corpus.
///
/// Threaded explicitly through the pipeline by `&mut` and inspected once at
/// finalize for placeholder and index generation. `BTreeSet` keeps index
/// output deterministically sorted.
#[derive(Debug, Clone, Default)]
pub struct CorpusSets {
    /// Sanitized primary names of every tool record.
    pub tools: BTreeSet<String>,
    /// Sanitized primary names of every group record.
    pub groups: BTreeSet<String>,
    /// Normalized sector names referenced by group records.
    pub sectors: BTreeSet<String>,
    /// Normalized country names referenced by group records.
    pub countries: BTreeSet<String>,
}

impl CorpusSets {
    pub fn new() -> Self {
        Self::default()
    }
}
