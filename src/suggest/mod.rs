//! Improvement suggestions
//!
//! Deterministic, rule-based hardening advice derived from the compiled
//! threats and the architecture graph:
//! - components carrying high-risk threat clusters
//! - relationships whose data flow mentions sensitive material
//! - missing perimeter components (WAF, API gateway)
//!
//! Output is a sorted, deduplicated list so identical inputs always render
//! identical reports.

use crate::graph::ArchitectureGraph;
use crate::models::Threat;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// A component's threat is "high-risk" for suggestion purposes at this
/// criticality.
const HIGH_RISK_SCORE: f64 = 7.0;

/// Data-flow terms that call for an encrypted channel.
const SENSITIVE_FLOW_TERMS: &[&str] = &["sensitive", "credential", "token"];

/// Derive improvement suggestions, sorted and deduplicated.
pub fn improvement_suggestions(threats: &[Threat], graph: &ArchitectureGraph) -> Vec<String> {
    let mut suggestions: BTreeSet<String> = BTreeSet::new();

    component_suggestions(threats, &mut suggestions);
    architecture_suggestions(graph, &mut suggestions);

    suggestions.into_iter().collect()
}

/// Hardening advice for components with high-risk threat clusters.
fn component_suggestions(threats: &[Threat], suggestions: &mut BTreeSet<String>) {
    let mut high_risk_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for threat in threats {
        if threat.criticality() >= HIGH_RISK_SCORE {
            *high_risk_counts
                .entry(threat.component_name.as_str())
                .or_insert(0) += 1;
        }
    }
    for (component, count) in high_risk_counts {
        suggestions.insert(format!(
            "Prioritize security hardening for {component} due to {count} high-risk threats"
        ));
    }
}

/// Architecture-level advice: sensitive flows and missing perimeter
/// components.
fn architecture_suggestions(graph: &ArchitectureGraph, suggestions: &mut BTreeSet<String>) {
    for rel in &graph.relationships {
        let data_flow = rel.data_flow.to_lowercase();
        if SENSITIVE_FLOW_TERMS.iter().any(|term| data_flow.contains(term)) {
            suggestions.insert(format!(
                "Implement encrypted communication channel between {} and {}",
                rel.source, rel.target
            ));
        }
    }

    if graph.is_empty() {
        // No architecture context: perimeter advice would be guesswork
        return;
    }
    let names: Vec<String> = graph
        .components
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();
    if !names.iter().any(|name| name.contains("waf")) {
        suggestions.insert("Consider implementing a Web Application Firewall (WAF)".to_string());
    }
    if !names.iter().any(|name| name.contains("gateway")) {
        suggestions.insert(
            "Consider implementing an API Gateway for centralized security controls".to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Component, Relationship};
    use std::collections::BTreeSet;

    fn threat(component: &str, score: f64) -> Threat {
        Threat {
            id: "THREAT-001".into(),
            threat_type: "Spoofing".into(),
            component_name: component.to_string(),
            component_type: "backend".into(),
            scenario: "s".into(),
            attack_vectors: BTreeSet::new(),
            affected_components: BTreeSet::new(),
            impact: String::new(),
            base_score: 5.0,
            criticality_score: Some(score),
            mitigations: BTreeSet::new(),
            provenance: BTreeSet::new(),
        }
    }

    fn component(name: &str) -> Component {
        Component {
            name: name.to_string(),
            component_type: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn test_high_risk_component_hardening() {
        let graph = ArchitectureGraph::default();
        let suggestions = improvement_suggestions(
            &[threat("AuthService", 8.2), threat("AuthService", 7.0), threat("Cache", 3.0)],
            &graph,
        );
        assert_eq!(
            suggestions,
            vec!["Prioritize security hardening for AuthService due to 2 high-risk threats"]
        );
    }

    #[test]
    fn test_sensitive_flow_gets_encryption_advice() {
        let graph = ArchitectureGraph::new(
            vec![component("WebWAF"), component("PaymentGateway")],
            vec![Relationship {
                source: "WebWAF".into(),
                target: "PaymentGateway".into(),
                data_flow: "Credential forwarding".into(),
            }],
        );
        let suggestions = improvement_suggestions(&[], &graph);
        assert_eq!(
            suggestions,
            vec!["Implement encrypted communication channel between WebWAF and PaymentGateway"]
        );
    }

    #[test]
    fn test_missing_perimeter_components() {
        let graph = ArchitectureGraph::new(vec![component("Web"), component("DB")], vec![]);
        let suggestions = improvement_suggestions(&[], &graph);
        assert!(suggestions
            .iter()
            .any(|s| s.contains("Web Application Firewall")));
        assert!(suggestions.iter().any(|s| s.contains("API Gateway")));
    }

    #[test]
    fn test_empty_inputs_give_no_advice() {
        let graph = ArchitectureGraph::default();
        assert!(improvement_suggestions(&[], &graph).is_empty());
    }

    #[test]
    fn test_output_sorted_and_deduplicated() {
        let graph = ArchitectureGraph::new(
            vec![component("Zulu"), component("Alpha")],
            vec![
                Relationship {
                    source: "Zulu".into(),
                    target: "Alpha".into(),
                    data_flow: "token exchange".into(),
                },
                Relationship {
                    source: "Zulu".into(),
                    target: "Alpha".into(),
                    data_flow: "sensitive records".into(),
                },
            ],
        );
        let suggestions = improvement_suggestions(&[], &graph);
        // Two sensitive flows between the same pair suggest one channel
        let channel_count = suggestions
            .iter()
            .filter(|s| s.contains("encrypted communication"))
            .count();
        assert_eq!(channel_count, 1);
        let mut sorted = suggestions.clone();
        sorted.sort();
        assert_eq!(suggestions, sorted);
    }
}
