//! Init command - write a starter scoring config

use crate::config::{CONFIG_FILE_NAME, STARTER_CONFIG};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let dir = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    println!(
        "\nEdit the component weights to match your architecture, then run:\n  \
         threatdeck compile --threats findings.json --config {}",
        CONFIG_FILE_NAME
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_parseable_starter() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        assert!(config_path.exists());
        let config = crate::config::load_scoring_config(&config_path).unwrap();
        assert_eq!(config.component_weight("api_gateway"), 1.4);

        // Second run is a no-op, not an error
        run(dir.path()).unwrap();
    }
}
