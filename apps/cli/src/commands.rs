//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use threatvault_core::{BuildConfig, BuildResult, ProgressReporter};
use threatvault_shared::{AppConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ThreatVault — turn threat-intelligence JSON into a cross-linked vault.
#[derive(Parser)]
#[command(
    name = "threatvault",
    version,
    about = "Convert threat-intelligence JSON records into a cross-linked Markdown vault.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build the Markdown vault from the input collections.
    Build {
        /// Directory holding the input JSON collections.
        #[arg(short, long)]
        inputs: Option<String>,

        /// Output directory for the vault.
        #[arg(short, long)]
        out: Option<String>,

        /// Path of the tools collection (overrides --inputs).
        #[arg(long)]
        tools: Option<String>,

        /// Path of the groups collection (overrides --inputs).
        #[arg(long)]
        groups: Option<String>,

        /// Date stamp for frontmatter, YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "threatvault=info",
        1 => "threatvault=debug",
        _ => "threatvault=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            inputs,
            out,
            tools,
            groups,
            date,
        } => cmd_build(
            inputs.as_deref(),
            out.as_deref(),
            tools.as_deref(),
            groups.as_deref(),
            date.as_deref(),
        ),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

fn cmd_build(
    inputs: Option<&str>,
    out: Option<&str>,
    tools: Option<&str>,
    groups: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let mut config = load_config()?;

    // Flags override config file values.
    if let Some(dir) = inputs {
        config.inputs.dir = dir.to_string();
    }
    if let Some(dir) = out {
        config.output.dir = dir.to_string();
    }

    let tools_path = tools
        .map(PathBuf::from)
        .unwrap_or_else(|| config.tools_path());
    let groups_path = groups
        .map(PathBuf::from)
        .unwrap_or_else(|| config.groups_path());

    let scraped_date = match date {
        Some(d) => {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| eyre!("invalid --date '{d}': {e} (expected YYYY-MM-DD)"))?;
            d.to_string()
        }
        None => chrono::Local::now().format("%Y-%m-%d").to_string(),
    };

    let build_config = BuildConfig {
        tools_path,
        groups_path,
        output_dir: PathBuf::from(&config.output.dir),
        scraped_date: scraped_date.clone(),
    };

    info!(
        tools = %build_config.tools_path.display(),
        groups = %build_config.groups_path.display(),
        out = %build_config.output_dir.display(),
        date = %scraped_date,
        "building vault"
    );

    let reporter = CliProgress::new();
    let result = threatvault_core::build_vault(&build_config, &reporter)?;

    // Print summary
    println!();
    println!("  Vault built successfully!");
    println!("  Tools:        {}", result.tools_written);
    println!("  Groups:       {}", result.groups_written);
    println!("  Placeholders: {}", result.placeholders_written);
    println!("  Indexes:      {}", result.indexes_written);
    if result.records_failed > 0 {
        println!("  Failed:       {} record(s) skipped", result.records_failed);
    }
    for skipped in &result.skipped_collections {
        println!("  Skipped:      {skipped} (could not be loaded)");
    }
    println!("  Path:         {}", result.output_dir.display());
    println!("  Time:         {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record_written(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Writing [{current}/{total}] {name}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
