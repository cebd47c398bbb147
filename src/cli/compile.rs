//! Compile command - load inputs, run the pipeline, render the model

use crate::compiler::ThreatModelCompiler;
use crate::config;
use crate::graph::ArchitectureGraph;
use crate::reporters;
use crate::sources::SourceBatch;
use anyhow::{Context, Result};
use console::style;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Run the compile command
pub fn run(
    threats_path: &Path,
    arch_path: Option<&Path>,
    config_path: Option<&Path>,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let batches = load_batches(threats_path)?;
    let graph = match arch_path {
        Some(path) => load_graph(path)?,
        None => {
            info!("no architecture graph supplied; graph factors stay neutral");
            ArchitectureGraph::default()
        }
    };
    let scoring_config = config::load_or_default(config_path);

    let model = ThreatModelCompiler::with_config(scoring_config).compile(&batches, &graph);
    let rendered = reporters::report(&model, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Wrote {} threats to {}",
                style("✓").green(),
                model.threats.len(),
                style(path.display()).cyan()
            );
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Load per-source batches from a JSON file.
///
/// Accepts an array of batch objects (each with a `source` tag and a threat
/// container) or a single batch object. Batches that fail to adapt degrade
/// to zero threats; only an unreadable or unparseable file is an error.
fn load_batches(path: &Path) -> Result<Vec<SourceBatch>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read threats file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Threats file {} is not valid JSON", path.display()))?;

    let entries: Vec<Value> = match value {
        Value::Array(entries) => entries,
        single @ Value::Object(_) => vec![single],
        _ => anyhow::bail!(
            "Threats file {} must be a JSON array of source batches",
            path.display()
        ),
    };

    let batches = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let source = entry
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("source-{}", i + 1));
            SourceBatch::from_json(&source, entry)
        })
        .collect();
    Ok(batches)
}

/// Load the architecture graph from a JSON file.
fn load_graph(path: &Path) -> Result<ArchitectureGraph> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read architecture file {}", path.display()))?;
    let graph: ArchitectureGraph = serde_json::from_str(&content)
        .with_context(|| format!("Architecture file {} is not valid JSON", path.display()))?;
    Ok(graph)
}
