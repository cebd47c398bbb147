//! Text (terminal) reporter with colors and formatting

use crate::models::{CompiledThreatModel, RiskLevel};
use anyhow::Result;

/// Risk level colors (ANSI escape codes)
fn level_color(level: &RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "\x1b[31m", // Red
        RiskLevel::High => "\x1b[91m",     // Light red
        RiskLevel::Medium => "\x1b[33m",   // Yellow
        RiskLevel::Low => "\x1b[34m",      // Blue
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Risk level tag
fn level_tag(level: &RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "[C]",
        RiskLevel::High => "[H]",
        RiskLevel::Medium => "[M]",
        RiskLevel::Low => "[L]",
    }
}

/// Render model as formatted terminal output
pub fn render(model: &CompiledThreatModel) -> Result<String> {
    let mut out = String::new();

    let dist = &model.risk_summary.risk_distribution;
    out.push_str(&format!("\n{BOLD}Threatdeck Threat Model{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Threats: {BOLD}{}{RESET}  Components: {}  Critical paths: {}\n",
        model.risk_summary.total_threats,
        model.risk_summary.affected_components,
        model.critical_paths.len()
    ));
    out.push_str(&format!(
        "Severity: {}{} critical{RESET}  {}{} high{RESET}  {}{} medium{RESET}  {}{} low{RESET}\n\n",
        level_color(&RiskLevel::Critical),
        dist.critical,
        level_color(&RiskLevel::High),
        dist.high,
        level_color(&RiskLevel::Medium),
        dist.medium,
        level_color(&RiskLevel::Low),
        dist.low,
    ));

    if model.threats.is_empty() {
        out.push_str("No threats were compiled from the provided sources.\n");
        return Ok(out);
    }

    out.push_str(&format!("{BOLD}Threats{RESET}\n"));
    for threat in &model.threats {
        let color = level_color(&threat.risk_level);
        out.push_str(&format!(
            "  {color}{}{RESET} {} {DIM}{}{RESET} {} ({:.2})\n",
            level_tag(&threat.risk_level),
            threat.threat_id,
            threat.threat_type,
            threat.component_name,
            threat.criticality_score,
        ));
        out.push_str(&format!("      {}\n", threat.scenario));
    }

    if !model.critical_paths.is_empty() {
        out.push_str(&format!("\n{BOLD}Critical Paths{RESET}\n"));
        for path in &model.critical_paths {
            let color = level_color(&path.risk_level);
            out.push_str(&format!(
                "  {color}{}{RESET} {}\n",
                level_tag(&path.risk_level),
                path.description
            ));
        }
    }

    if !model.improvement_suggestions.is_empty() {
        out.push_str(&format!("\n{BOLD}Suggestions{RESET}\n"));
        for suggestion in &model.improvement_suggestions {
            out.push_str(&format!("  - {suggestion}\n"));
        }
    }

    out.push_str(&format!(
        "\n{DIM}{} sources, {} records received, {} rejected, {} merged{RESET}\n",
        model.stats.sources,
        model.stats.threats_received,
        model.stats.threats_rejected,
        model.stats.threats_merged
    ));

    Ok(out)
}
