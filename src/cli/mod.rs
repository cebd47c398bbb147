//! CLI command definitions and handlers

mod compile;
mod init;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Threatdeck - Threat model compilation
///
/// 100% LOCAL - No account needed. No data leaves your machine.
#[derive(Parser, Debug)]
#[command(name = "threatdeck")]
#[command(
    version,
    about = "Compile STRIDE threat findings from multiple analysis sources into one ranked, deduplicated threat model",
    long_about = "Threatdeck aggregates raw threat findings produced by independent analysis \
sources (STRIDE expert agents, knowledge bases, manual review) into a single \
compiled threat model: criticality-scored, deduplicated, with per-component \
risk rollups and critical attack paths.\n\n\
100% LOCAL — scoring is deterministic and runs entirely offline.",
    after_help = "\
Examples:
  threatdeck compile --threats findings.json                    Compile without graph context
  threatdeck compile --threats findings.json --arch arch.json   Score against the architecture
  threatdeck compile --threats findings.json --format json      JSON output for scripting
  threatdeck compile --threats findings.json --format md -o threat-model.md
  threatdeck init                                               Write a starter threatdeck.toml

Documentation: https://github.com/threatdeck/threatdeck"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a threat model from per-source threat batches
    #[command(after_help = "\
The --threats file is a JSON array of source batches:

  [
    {\"source\": \"SpoofingExpert\", \"threats\": [ ... ]},
    {\"source\": \"KnowledgeBase\", \"threat_model\": [ ... ]}
  ]

Both the \"threats\" and the legacy \"threat_model\" container keys are
accepted. A malformed batch contributes zero threats; it never fails the
run.")]
    Compile {
        /// JSON file with one batch of threat records per source
        #[arg(long, value_name = "FILE")]
        threats: PathBuf,

        /// JSON file with the architecture graph (components + relationships)
        #[arg(long, value_name = "FILE")]
        arch: Option<PathBuf>,

        /// Scoring config (threatdeck.toml); defaults to stock weights
        #[arg(long, value_name = "FILE", env = "THREATDECK_CONFIG")]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown
        #[arg(long, short, default_value = "text")]
        format: String,

        /// Write output to a file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Initialize a threatdeck.toml config file with the default weights
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

/// Dispatch the parsed CLI to its command handler
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compile {
            threats,
            arch,
            config,
            format,
            output,
        } => compile::run(&threats, arch.as_deref(), config.as_deref(), &format, output.as_deref()),
        Commands::Init { path } => init::run(&path),
    }
}
