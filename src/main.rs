//! Threatdeck - Threat model compiler CLI
//!
//! A fast, local-first tool that aggregates STRIDE threat findings from
//! multiple analysis sources into one ranked, deduplicated threat model.

use anyhow::Result;
use clap::Parser;
use threatdeck::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse first so --log-level can seed the filter
    let cli = cli::Cli::parse();

    // Initialize logging; RUST_LOG wins over --log-level when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    cli::run(cli)
}
