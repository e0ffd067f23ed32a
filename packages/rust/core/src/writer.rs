//! Vault document writer.
//!
//! Renders records through `threatvault-markdown` and writes the resulting
//! documents into the output directory, folding referenced names into the
//! corpus accumulator as it goes. Also emits placeholder stubs and index
//! pages at finalize time.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use threatvault_markdown::{
    PlaceholderKind, normalize_name, render_index, render_placeholder, render_record,
    sanitize_for_filename,
};
use threatvault_shared::{CorpusSets, Record, RecordKind, Result, ThreatVaultError};

/// Group fields whose entries feed the global sector/country sets.
const SECTOR_FIELD: &str = "observed-sectors";
const COUNTRY_FIELDS: &[&str] = &["observed-countries", "country"];

// ---------------------------------------------------------------------------
// Entity documents
// ---------------------------------------------------------------------------

/// Render one record and write `<sanitized-name>.md` into the output dir.
///
/// The sanitized primary name is registered in the accumulator before the
/// write, and for group records every referenced sector and country is folded
/// in as well. A later record sharing a sanitized name silently overwrites
/// the earlier document.
pub fn write_record(
    output_dir: &Path,
    record: &Record,
    kind: RecordKind,
    scraped_date: &str,
    sets: &mut CorpusSets,
) -> Result<PathBuf> {
    let doc = render_record(record, kind, scraped_date);

    match kind {
        RecordKind::Tool => {
            sets.tools.insert(doc.sanitized_name.clone());
        }
        RecordKind::Group => {
            sets.groups.insert(doc.sanitized_name.clone());

            for sector in field_names(record, SECTOR_FIELD) {
                sets.sectors.insert(normalize_name(&sector));
            }
            for field in COUNTRY_FIELDS {
                for country in field_names(record, field) {
                    sets.countries.insert(normalize_name(&country));
                }
            }
        }
    }

    let path = output_dir.join(format!("{}.md", doc.sanitized_name));
    std::fs::write(&path, &doc.markdown).map_err(|e| ThreatVaultError::io(&path, e))?;

    debug!(path = %path.display(), %kind, "wrote entity document");
    Ok(path)
}

/// String entries of a field expected to hold a list of names.
fn field_names(record: &Record, field: &str) -> Vec<String> {
    record
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

/// Write stub documents for names that never got a full document.
///
/// First-writer-wins: a name whose sanitized filename already exists is
/// skipped, so entity documents are never clobbered by stubs. Returns the
/// number of stubs written; individual write failures are logged and do not
/// abort the pass.
pub fn write_placeholders<'a>(
    output_dir: &Path,
    names: impl IntoIterator<Item = &'a str>,
    kind: PlaceholderKind,
    scraped_date: &str,
) -> usize {
    let mut written = 0;

    for name in names {
        let clean = normalize_name(name);
        let path = output_dir.join(format!("{}.md", sanitize_for_filename(&clean)));
        if path.exists() {
            continue;
        }

        let doc = render_placeholder(name, kind, scraped_date);
        match std::fs::write(&path, doc) {
            Ok(()) => {
                debug!(path = %path.display(), %kind, "wrote placeholder");
                written += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "placeholder write failed, skipping");
            }
        }
    }

    written
}

// ---------------------------------------------------------------------------
// Indexes
// ---------------------------------------------------------------------------

/// Write one index page listing every item of a category as a cross-link.
pub fn write_index<'a>(
    output_dir: &Path,
    title: &str,
    items: impl IntoIterator<Item = &'a str>,
) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}.md", sanitize_for_filename(title)));
    let doc = render_index(title, items);
    std::fs::write(&path, doc).map_err(|e| ThreatVaultError::io(&path, e))?;

    debug!(path = %path.display(), "wrote index");
    Ok(path)
}
