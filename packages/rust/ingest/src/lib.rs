//! Input collection loading with a best-effort repair fallback.
//!
//! Collections arrive as `{"values": [ <record>, ... ]}` JSON files. Real
//! exports are occasionally malformed in two specific ways: a bare URL pasted
//! on its own line, and trailing commas before `]` or `}`. When a direct parse
//! fails, [`load_collection`] runs two textual repair passes and re-parses.
//! The repair is a heuristic patch, not a JSONC parser — failure after repair
//! means the collection is skipped by the caller.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use threatvault_shared::{Collection, Result, ThreatVaultError};

/// Load a collection file, repairing the text if the direct parse fails.
///
/// Missing file and malformed JSON both route through the repair path; if
/// the repaired text still fails to parse, the error is
/// [`ThreatVaultError::Repair`] and the caller decides whether to continue.
pub fn load_collection(path: &Path) -> Result<Collection> {
    let content = std::fs::read_to_string(path).map_err(|e| ThreatVaultError::io(path, e))?;

    match serde_json::from_str::<Collection>(&content) {
        Ok(collection) => {
            debug!(path = %path.display(), records = collection.values.len(), "collection parsed");
            Ok(collection)
        }
        Err(parse_err) => {
            warn!(
                path = %path.display(),
                error = %parse_err,
                "direct parse failed, attempting repair"
            );
            repair_and_parse(path, &content)
        }
    }
}

/// Re-parse after the textual repair passes.
fn repair_and_parse(path: &Path, content: &str) -> Result<Collection> {
    let repaired = repair_json_text(content);

    match serde_json::from_str::<Collection>(&repaired) {
        Ok(collection) => {
            info!(
                path = %path.display(),
                records = collection.values.len(),
                "successfully parsed repaired JSON"
            );
            Ok(collection)
        }
        Err(e) => Err(ThreatVaultError::Repair(format!(
            "{}: {e}",
            path.display()
        ))),
    }
}

/// Apply the two repair passes to raw JSON text.
///
/// 1. A line consisting solely of a bare `http(s)://…` URL (optionally
///    surrounded by whitespace) becomes a quoted JSON string followed by a
///    comma, preserving indentation.
/// 2. A trailing comma immediately before `]` or `}` is removed.
pub fn repair_json_text(content: &str) -> String {
    static URL_LINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?m)^(\s*)(https?://[^\s",]+)\s*$"#).expect("valid regex"));
    static TRAILING_COMMA_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m),\s*([\]\}])").expect("valid regex"));

    let quoted = URL_LINE_RE.replace_all(content, "$1\"$2\",");
    TRAILING_COMMA_RE.replace_all(&quoted, "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_quotes_bare_url_lines() {
        let input = "[\n  \"a\",\n  https://example.com/report\n]";
        let repaired = repair_json_text(input);
        assert!(repaired.contains("\"https://example.com/report\""));
        let parsed: Vec<String> = serde_json::from_str(&repaired).expect("repaired parses");
        assert_eq!(parsed, vec!["a", "https://example.com/report"]);
    }

    #[test]
    fn repair_preserves_indentation() {
        let input = "    https://example.com/x";
        assert_eq!(repair_json_text(input), "    \"https://example.com/x\",");
    }

    #[test]
    fn repair_strips_trailing_commas() {
        assert_eq!(repair_json_text("[1, 2,]"), "[1, 2]");
        assert_eq!(repair_json_text("{\"a\": 1,\n}"), "{\"a\": 1\n}");
    }

    #[test]
    fn repair_leaves_quoted_urls_alone() {
        let input = "[\"https://example.com/ok\"]";
        assert_eq!(repair_json_text(input), input);
    }

    #[test]
    fn repair_handles_both_defects_together() {
        let input = concat!(
            "{\"values\": [\n",
            "  {\"tool\": \"X\", \"links\": [\n",
            "    https://example.com/a\n",
            "  ]},\n",
            "]}"
        );
        let repaired = repair_json_text(input);
        let collection: Collection =
            serde_json::from_str(&repaired).expect("repaired collection parses");
        assert_eq!(collection.values.len(), 1);
    }

    #[test]
    fn load_collection_missing_file_is_io_error() {
        let err = load_collection(Path::new("/nonexistent/collection.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ThreatVaultError::Io { .. }));
    }

    #[test]
    fn load_collection_repairs_malformed_input() {
        let dir = std::env::temp_dir().join(format!("tv-ingest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("malformed.json");
        std::fs::write(
            &path,
            "{\"values\": [\n  {\"tool\": \"Mimikatz\"},\n]}",
        )
        .expect("write fixture");

        let collection = load_collection(&path).expect("repairable input loads");
        assert_eq!(collection.values.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_collection_unrepairable_is_repair_error() {
        let dir = std::env::temp_dir().join(format!("tv-ingest-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("hopeless.json");
        std::fs::write(&path, "{\"values\": [ this is not json ]}").expect("write fixture");

        let err = load_collection(&path).expect_err("unrepairable input must fail");
        assert!(matches!(err, ThreatVaultError::Repair(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
