//! ThreatVault CLI — threat-intelligence vault builder.
//!
//! Converts threat-intelligence JSON collections (tools and groups) into a
//! cross-linked Markdown vault for Obsidian-style knowledge bases.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
