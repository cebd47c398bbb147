//! JSON reporter
//!
//! Outputs the full CompiledThreatModel as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::CompiledThreatModel;
use anyhow::Result;

/// Render model as JSON
pub fn render(model: &CompiledThreatModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Render model as compact JSON (single line)
#[allow(dead_code)] // Public API helper
pub fn render_compact(model: &CompiledThreatModel) -> Result<String> {
    Ok(serde_json::to_string(model)?)
}
