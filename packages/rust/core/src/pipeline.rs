//! End-to-end vault build: load collections → render records → write
//! documents → emit placeholders and indexes.
//!
//! The run is strictly sequential. A collection that cannot be loaded (even
//! after repair) is skipped with a warning; a record whose document cannot be
//! written is skipped with a warning. Only failure to create the output
//! directory aborts the run.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use threatvault_markdown::PlaceholderKind;
use threatvault_shared::{CorpusSets, RecordKind, Result, ThreatVaultError};

use crate::writer;

/// Configuration for a vault build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Path of the tools collection JSON file.
    pub tools_path: PathBuf,
    /// Path of the groups collection JSON file.
    pub groups_path: PathBuf,
    /// Directory the Markdown vault is written into.
    pub output_dir: PathBuf,
    /// ISO `YYYY-MM-DD` stamp written into every document's frontmatter.
    pub scraped_date: String,
}

/// Result of a vault build.
#[derive(Debug)]
pub struct BuildResult {
    /// Directory the vault was written into.
    pub output_dir: PathBuf,
    /// Tool documents written.
    pub tools_written: usize,
    /// Group documents written.
    pub groups_written: usize,
    /// Records skipped because their document could not be written.
    pub records_failed: usize,
    /// Placeholder stubs written for bare sector/country names.
    pub placeholders_written: usize,
    /// Index pages written (tools, groups, sectors, countries).
    pub indexes_written: usize,
    /// Collections skipped because neither parse nor repair succeeded.
    pub skipped_collections: Vec<String>,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each entity document is written.
    fn record_written(&self, name: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record_written(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full vault build.
///
/// 1. Create the output directory
/// 2. Process the tools collection, then the groups collection
/// 3. Write placeholder stubs for referenced sectors and countries
/// 4. Write the four index pages
pub fn build_vault(config: &BuildConfig, progress: &dyn ProgressReporter) -> Result<BuildResult> {
    let start = Instant::now();

    info!(output = %config.output_dir.display(), "starting vault build");

    // Only failure in the whole run that is allowed to be fatal.
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| ThreatVaultError::io(&config.output_dir, e))?;

    let mut sets = CorpusSets::new();
    let mut tools_written = 0;
    let mut groups_written = 0;
    let mut records_failed = 0;
    let mut skipped_collections = Vec::new();

    let phases: [(&PathBuf, RecordKind, &str); 2] = [
        (&config.tools_path, RecordKind::Tool, "Processing tools"),
        (&config.groups_path, RecordKind::Group, "Processing groups"),
    ];

    for (path, kind, phase_name) in phases {
        progress.phase(phase_name);

        let collection = match threatvault_ingest::load_collection(path) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping collection");
                skipped_collections.push(path.display().to_string());
                continue;
            }
        };

        let total = collection.values.len();
        for (i, record) in collection.values.iter().enumerate() {
            match writer::write_record(
                &config.output_dir,
                record,
                kind,
                &config.scraped_date,
                &mut sets,
            ) {
                Ok(path) => {
                    let name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    progress.record_written(&name, i + 1, total);
                    match kind {
                        RecordKind::Tool => tools_written += 1,
                        RecordKind::Group => groups_written += 1,
                    }
                }
                Err(e) => {
                    // One unwritable record must not abort the collection.
                    warn!(%kind, index = i, error = %e, "record write failed, skipping");
                    records_failed += 1;
                }
            }
        }

        info!(
            %kind,
            records = total,
            "collection processed"
        );
    }

    // Finalize: stubs for names referenced but never documented, then indexes.
    progress.phase("Writing placeholders");
    let mut placeholders_written = 0;
    placeholders_written += writer::write_placeholders(
        &config.output_dir,
        sets.sectors.iter().map(String::as_str),
        PlaceholderKind::Sector,
        &config.scraped_date,
    );
    placeholders_written += writer::write_placeholders(
        &config.output_dir,
        sets.countries.iter().map(String::as_str),
        PlaceholderKind::Country,
        &config.scraped_date,
    );

    progress.phase("Writing indexes");
    let indexes: [(&str, &std::collections::BTreeSet<String>); 4] = [
        ("index-tools", &sets.tools),
        ("index-groups", &sets.groups),
        ("index-sectors", &sets.sectors),
        ("index-countries", &sets.countries),
    ];
    let mut indexes_written = 0;
    for (title, items) in indexes {
        writer::write_index(&config.output_dir, title, items.iter().map(String::as_str))?;
        indexes_written += 1;
    }

    let result = BuildResult {
        output_dir: config.output_dir.clone(),
        tools_written,
        groups_written,
        records_failed,
        placeholders_written,
        indexes_written,
        skipped_collections,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        tools = result.tools_written,
        groups = result.groups_written,
        placeholders = result.placeholders_written,
        failed = result.records_failed,
        skipped = result.skipped_collections.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "vault build complete"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct TestVault {
        root: PathBuf,
    }

    impl TestVault {
        fn new(tag: &str) -> Self {
            let root =
                std::env::temp_dir().join(format!("tv-pipeline-{tag}-{}", std::process::id()));
            let _ = std::fs::remove_dir_all(&root);
            std::fs::create_dir_all(root.join("inputs")).expect("create inputs dir");
            Self { root }
        }

        fn write_input(&self, name: &str, content: &str) -> PathBuf {
            let path = self.root.join("inputs").join(name);
            std::fs::write(&path, content).expect("write input");
            path
        }

        fn config(&self, tools: &str, groups: &str) -> BuildConfig {
            BuildConfig {
                tools_path: self.root.join("inputs").join(tools),
                groups_path: self.root.join("inputs").join(groups),
                output_dir: self.root.join("output"),
                scraped_date: "2026-08-25".into(),
            }
        }

        fn read(&self, name: &str) -> String {
            std::fs::read_to_string(self.root.join("output").join(name))
                .unwrap_or_else(|e| panic!("read output {name}: {e}"))
        }
    }

    impl Drop for TestVault {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }

    fn exists(vault: &TestVault, name: &str) -> bool {
        Path::new(&vault.root).join("output").join(name).exists()
    }

    #[test]
    fn end_to_end_build() {
        let vault = TestVault::new("e2e");
        vault.write_input(
            "tools.json",
            r#"{"values": [{"tool": "Cobalt Strike", "description": "A {{framework}}."}]}"#,
        );
        vault.write_input(
            "groups.json",
            r#"{"values": [{"actor": "APT1", "tools": ["Cobalt Strike"]}]}"#,
        );

        let result = build_vault(&vault.config("tools.json", "groups.json"), &SilentProgress)
            .expect("build succeeds");

        assert_eq!(result.tools_written, 1);
        assert_eq!(result.groups_written, 1);
        assert_eq!(result.placeholders_written, 0);
        assert_eq!(result.indexes_written, 4);
        assert!(result.skipped_collections.is_empty());

        assert!(vault.read("Cobalt Strike.md").contains("A [[framework]]."));
        assert!(vault.read("APT1.md").contains("- [[Cobalt Strike]]"));
        assert!(vault.read("index-tools.md").contains("- [[Cobalt Strike]]"));
        assert!(vault.read("index-groups.md").contains("- [[APT1]]"));
        // No sectors or countries referenced, so the indexes are bare headings.
        assert_eq!(vault.read("index-sectors.md"), "# index-sectors\n\n");
    }

    #[test]
    fn group_references_produce_placeholders() {
        let vault = TestVault::new("placeholders");
        vault.write_input("tools.json", r#"{"values": []}"#);
        vault.write_input(
            "groups.json",
            r#"{"values": [{
                "actor": "APT1",
                "country": ["China"],
                "observed-sectors": ["Aerospace"],
                "observed-countries": ["United States"]
            }]}"#,
        );

        let result = build_vault(&vault.config("tools.json", "groups.json"), &SilentProgress)
            .expect("build succeeds");

        assert_eq!(result.placeholders_written, 3);
        assert!(vault.read("China.md").contains("type: country"));
        assert!(vault.read("Aerospace.md").contains("A page for the sector [[Aerospace]]."));
        assert!(vault.read("index-countries.md").contains("- [[China]]"));
        assert!(vault.read("index-countries.md").contains("- [[United States]]"));
    }

    #[test]
    fn placeholder_never_overwrites_entity_document() {
        let vault = TestVault::new("first-writer");
        // "China" is both a full group record and a referenced country.
        vault.write_input("tools.json", r#"{"values": []}"#);
        vault.write_input(
            "groups.json",
            r#"{"values": [
                {"actor": "China", "description": "full record"},
                {"actor": "APT1", "country": ["China"]}
            ]}"#,
        );

        build_vault(&vault.config("tools.json", "groups.json"), &SilentProgress)
            .expect("build succeeds");

        let china = vault.read("China.md");
        assert!(china.contains("full record"));
        assert!(!china.contains("A page for the country"));
    }

    #[test]
    fn missing_collection_is_skipped_not_fatal() {
        let vault = TestVault::new("missing");
        vault.write_input(
            "groups.json",
            r#"{"values": [{"actor": "APT1"}]}"#,
        );

        let result = build_vault(&vault.config("absent.json", "groups.json"), &SilentProgress)
            .expect("build survives a missing collection");

        assert_eq!(result.tools_written, 0);
        assert_eq!(result.groups_written, 1);
        assert_eq!(result.skipped_collections.len(), 1);
        assert!(exists(&vault, "APT1.md"));
        assert!(exists(&vault, "index-tools.md"));
    }

    #[test]
    fn malformed_collection_is_repaired() {
        let vault = TestVault::new("repair");
        // Bare URL line plus trailing comma — both repairable defects.
        vault.write_input(
            "tools.json",
            concat!(
                "{\"values\": [\n",
                "  {\"tool\": \"Mimikatz\", \"information\": [\n",
                "    https://example.com/mimikatz\n",
                "  ]},\n",
                "]}"
            ),
        );
        vault.write_input("groups.json", r#"{"values": []}"#);

        let result = build_vault(&vault.config("tools.json", "groups.json"), &SilentProgress)
            .expect("build succeeds after repair");

        assert_eq!(result.tools_written, 1);
        assert!(result.skipped_collections.is_empty());
        assert!(vault.read("Mimikatz.md").contains("https://example.com/mimikatz"));
    }

    #[test]
    fn unrepairable_collection_skipped_other_continues() {
        let vault = TestVault::new("unrepairable");
        vault.write_input("tools.json", "{\"values\": [ not json at all ]}");
        vault.write_input(
            "groups.json",
            r#"{"values": [{"actor": "APT1"}]}"#,
        );

        let result = build_vault(&vault.config("tools.json", "groups.json"), &SilentProgress)
            .expect("build survives an unrepairable collection");

        assert_eq!(result.skipped_collections.len(), 1);
        assert_eq!(result.groups_written, 1);
    }

    #[test]
    fn unwritable_record_does_not_abort_collection() {
        let vault = TestVault::new("isolation");
        // A name that sanitizes to empty-ish path is still writable, so use a
        // record whose sanitized name collides with a directory instead.
        vault.write_input(
            "tools.json",
            r#"{"values": [{"tool": "blocked"}, {"tool": "Mimikatz"}]}"#,
        );
        vault.write_input("groups.json", r#"{"values": []}"#);

        let config = vault.config("tools.json", "groups.json");
        // Pre-create a directory where "blocked.md" would go so the write fails.
        std::fs::create_dir_all(config.output_dir.join("blocked.md"))
            .expect("create blocking dir");

        let result = build_vault(&config, &SilentProgress).expect("build continues");

        assert_eq!(result.records_failed, 1);
        assert_eq!(result.tools_written, 1);
        assert!(exists(&vault, "Mimikatz.md"));
    }
}
