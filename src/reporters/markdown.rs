//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Security review documents
//! - Pull request comments
//! - Wikis and runbooks

use crate::models::{CompiledThreat, CompiledThreatModel};
use anyhow::Result;
use chrono::Local;

/// Render model as GitHub-flavored Markdown
pub fn render(model: &CompiledThreatModel) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(model));
    md.push('\n');
    md.push_str(&render_risk_summary(model));
    md.push('\n');
    md.push_str(&render_threat_table(model));
    md.push('\n');
    md.push_str(&render_component_risks(model));
    md.push('\n');
    md.push_str(&render_critical_paths(model));
    md.push('\n');
    md.push_str(&render_suggestions(model));

    Ok(md)
}

fn render_header(model: &CompiledThreatModel) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!(
        r#"# Threat Model Report

**{} threats** across **{} components** | {} critical path(s)

Generated: {}
"#,
        model.risk_summary.total_threats,
        model.risk_summary.affected_components,
        model.critical_paths.len(),
        timestamp
    )
}

fn render_risk_summary(model: &CompiledThreatModel) -> String {
    let dist = &model.risk_summary.risk_distribution;
    let mut md = String::from(
        "## Risk Summary\n\n\
         | Critical | High | Medium | Low |\n\
         |----------|------|--------|-----|\n",
    );
    md.push_str(&format!(
        "| {} | {} | {} | {} |\n",
        dist.critical, dist.high, dist.medium, dist.low
    ));

    if !model.risk_summary.threat_distribution.is_empty() {
        md.push_str("\n**By STRIDE category:**\n\n");
        for (category, count) in &model.risk_summary.threat_distribution {
            md.push_str(&format!("- {category}: {count}\n"));
        }
    }
    md
}

fn render_threat_table(model: &CompiledThreatModel) -> String {
    let mut md = String::from("## Threat Model\n\n");
    if model.threats.is_empty() {
        md.push_str("No threats were compiled from the provided sources.\n");
        return md;
    }

    md.push_str(
        "| ID | Threat Type | Component | Scenario | Potential Impact | Score | Level |\n\
         |----|-------------|-----------|----------|------------------|-------|-------|\n",
    );
    for threat in &model.threats {
        md.push_str(&render_threat_row(threat));
    }
    md
}

fn render_threat_row(threat: &CompiledThreat) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {:.2} | {} |\n",
        threat.threat_id,
        threat.threat_type,
        threat.component_name,
        escape_cell(&threat.scenario),
        escape_cell(&threat.impact),
        threat.criticality_score,
        threat.risk_level
    )
}

fn render_component_risks(model: &CompiledThreatModel) -> String {
    let mut md = String::from("## Component Risk Levels\n\n");
    if model.component_risk_levels.is_empty() {
        md.push_str("No component risk data available.\n");
        return md;
    }
    md.push_str(
        "| Component | Level | Max Score | Threats | Threat Types |\n\
         |-----------|-------|-----------|---------|--------------|\n",
    );
    for (name, risk) in &model.component_risk_levels {
        let types: Vec<&str> = risk.threat_types.iter().map(String::as_str).collect();
        md.push_str(&format!(
            "| {} | {} | {:.2} | {} | {} |\n",
            name,
            risk.level,
            risk.score,
            risk.threat_count,
            types.join(", ")
        ));
    }
    md
}

fn render_critical_paths(model: &CompiledThreatModel) -> String {
    let mut md = String::from("## Critical Paths\n\n");
    if model.critical_paths.is_empty() {
        md.push_str("No critical attack paths identified.\n");
        return md;
    }
    for path in &model.critical_paths {
        md.push_str(&format!("- **{}**: {}\n", path.risk_level, path.description));
    }
    md
}

fn render_suggestions(model: &CompiledThreatModel) -> String {
    let mut md = String::from("## Improvement Suggestions\n\n");
    if model.improvement_suggestions.is_empty() {
        md.push_str("No suggestions generated.\n");
        return md;
    }
    for suggestion in &model.improvement_suggestions {
        md.push_str(&format!("- {suggestion}\n"));
    }
    md
}

/// Keep cell text from breaking the table
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_model;

    #[test]
    fn test_markdown_has_all_sections() {
        let md = render(&test_model()).expect("render markdown");
        assert!(md.contains("# Threat Model Report"));
        assert!(md.contains("## Risk Summary"));
        assert!(md.contains("## Threat Model"));
        assert!(md.contains("## Component Risk Levels"));
        assert!(md.contains("## Critical Paths"));
        assert!(md.contains("## Improvement Suggestions"));
    }

    #[test]
    fn test_markdown_threat_row() {
        let md = render(&test_model()).expect("render markdown");
        assert!(md.contains("| THREAT-001 | Spoofing | AuthService |"));
        assert!(md.contains("Attacker forges a session token"));
    }

    #[test]
    fn test_markdown_empty_model() {
        let md = render(&CompiledThreatModel::empty()).expect("render markdown");
        assert!(md.contains("No threats were compiled"));
        assert!(md.contains("No critical attack paths identified."));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("line\nbreak"), "line break");
    }
}
