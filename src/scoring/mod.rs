//! Graph-Aware Criticality Scoring
//!
//! This module turns source-reported base scores into criticality scores
//! using the architecture graph, not just the threat record itself.
//!
//! # Scoring Formula
//!
//! ```text
//! criticality = base_score × component_weight × connectivity × sensitivity
//!
//! component_weight: per-type lookup table (auth services, gateways and
//!                   databases above generic components; unknown → 1.0)
//! connectivity:     min(1.5, 0.8 + 0.1 × distinct_neighbors)
//! sensitivity:      min(2.0, 1.0 + 0.2 × indicator_matches)
//! ```
//!
//! The result is rounded to 2 decimal places. With an empty architecture
//! graph both graph factors are neutral 1.0, so the score degrades to
//! `base_score × component_weight`.
//!
//! # Example
//!
//! A threat with base score 8.0 on an `authentication_service` (weight 1.5)
//! connected to 3 components (factor 1.1) whose description mentions
//! "credential" (factor 1.2):
//!
//! 8.0 × 1.5 × 1.1 × 1.2 = 15.84
//!
//! Scores are deterministic for a given (threat, graph) pair — no
//! randomness, no wall-clock dependence.

use crate::config::ScoringConfig;
use crate::graph::{ArchitectureGraph, GraphIndex};
use crate::models::Threat;
use tracing::debug;

/// Computes and assigns criticality scores; see module docs.
#[derive(Debug, Clone, Default)]
pub struct CriticalityScorer {
    config: ScoringConfig,
}

impl CriticalityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score every threat and return the sequence sorted by descending
    /// criticality. The sort is stable, so equal scores keep normalization
    /// order.
    pub fn score(&self, mut threats: Vec<Threat>, graph: &ArchitectureGraph) -> Vec<Threat> {
        let index = GraphIndex::new(graph);
        let graph_is_empty = graph.is_empty();

        for threat in &mut threats {
            let component_weight = self.config.component_weight(&threat.component_type);
            let connectivity = self.connectivity_factor(&index, graph_is_empty, &threat.component_name);
            let sensitivity = self.sensitivity_factor(graph, graph_is_empty, &threat.component_name);

            let score = round2(threat.base_score * component_weight * connectivity * sensitivity);
            debug!(
                threat = threat.id.as_str(),
                component = threat.component_name.as_str(),
                base = threat.base_score,
                component_weight,
                connectivity,
                sensitivity,
                score,
                "scored threat"
            );
            threat.criticality_score = Some(score);
        }

        threats.sort_by(|a, b| {
            b.criticality()
                .partial_cmp(&a.criticality())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        threats
    }

    /// More connections, more risk — capped so hubs cannot dominate
    /// unboundedly. An empty graph is absence of evidence and stays
    /// neutral; an isolated node in a real graph keeps the sub-1.0 floor.
    fn connectivity_factor(&self, index: &GraphIndex<'_>, graph_is_empty: bool, component: &str) -> f64 {
        if graph_is_empty {
            return 1.0;
        }
        let connections = index.connection_count(component) as f64;
        let c = &self.config.connectivity;
        (c.base + connections * c.per_connection).min(c.cap)
    }

    /// Indicator keywords matched against the component's description,
    /// capped. Unknown components and empty graphs stay neutral.
    fn sensitivity_factor(&self, graph: &ArchitectureGraph, graph_is_empty: bool, component: &str) -> f64 {
        if graph_is_empty {
            return 1.0;
        }
        let Some(component) = graph.component(component) else {
            return 1.0;
        };
        let description = component.description.to_lowercase();
        let s = &self.config.sensitivity;
        let matches = s
            .indicators
            .iter()
            .filter(|indicator| description.contains(indicator.as_str()))
            .count() as f64;
        (1.0 + matches * s.per_match).min(s.cap)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Component, Relationship};
    use std::collections::BTreeSet;

    fn threat(id: &str, component: &str, component_type: &str, base: f64) -> Threat {
        Threat {
            id: id.to_string(),
            threat_type: "Spoofing".into(),
            component_name: component.to_string(),
            component_type: component_type.to_string(),
            scenario: format!("scenario for {id}"),
            attack_vectors: BTreeSet::new(),
            affected_components: BTreeSet::new(),
            impact: String::new(),
            base_score: base,
            criticality_score: None,
            mitigations: BTreeSet::new(),
            provenance: BTreeSet::new(),
        }
    }

    fn auth_graph() -> ArchitectureGraph {
        ArchitectureGraph::new(
            vec![Component {
                name: "AuthService".into(),
                component_type: "authentication_service".into(),
                description: "Validates user credential material".into(),
            }],
            vec![
                Relationship {
                    source: "Web".into(),
                    target: "AuthService".into(),
                    data_flow: "logins".into(),
                },
                Relationship {
                    source: "AuthService".into(),
                    target: "DB".into(),
                    data_flow: "lookups".into(),
                },
                Relationship {
                    source: "AuthService".into(),
                    target: "Sessions".into(),
                    data_flow: "session writes".into(),
                },
            ],
        )
    }

    #[test]
    fn test_empty_graph_neutrality() {
        let scorer = CriticalityScorer::new();
        let graph = ArchitectureGraph::default();
        let scored = scorer.score(vec![threat("THREAT-001", "API", "api_gateway", 6.0)], &graph);
        // base 6.0 × weight 1.4 × 1.0 × 1.0
        assert_eq!(scored[0].criticality_score, Some(8.4));
    }

    #[test]
    fn test_full_formula_with_graph_context() {
        let scorer = CriticalityScorer::new();
        let scored = scorer.score(
            vec![threat("THREAT-001", "AuthService", "authentication_service", 8.0)],
            &auth_graph(),
        );
        // 8.0 × 1.5 (auth) × 1.1 (3 neighbors) × 1.2 (credential) = 15.84
        assert_eq!(scored[0].criticality_score, Some(15.84));
    }

    #[test]
    fn test_connectivity_capped() {
        let relationships = (0..10)
            .map(|i| Relationship {
                source: "Hub".into(),
                target: format!("Service{i}"),
                data_flow: String::new(),
            })
            .collect();
        let graph = ArchitectureGraph::new(vec![], relationships);
        let scorer = CriticalityScorer::new();
        let scored = scorer.score(vec![threat("THREAT-001", "Hub", "backend", 5.0)], &graph);
        // connectivity min(1.5, 0.8 + 1.0) = 1.5; no component entry → sensitivity 1.0
        assert_eq!(scored[0].criticality_score, Some(5.0 * 1.2 * 1.5));
    }

    #[test]
    fn test_isolated_component_in_real_graph_gets_floor() {
        let graph = ArchitectureGraph::new(
            vec![Component {
                name: "Batch".into(),
                component_type: "backend".into(),
                description: String::new(),
            }],
            vec![Relationship {
                source: "A".into(),
                target: "B".into(),
                data_flow: String::new(),
            }],
        );
        let scorer = CriticalityScorer::new();
        let scored = scorer.score(vec![threat("THREAT-001", "Batch", "backend", 5.0)], &graph);
        // 5.0 × 1.2 × 0.8 × 1.0
        assert_eq!(scored[0].criticality_score, Some(4.8));
    }

    #[test]
    fn test_sensitivity_capped() {
        let graph = ArchitectureGraph::new(
            vec![Component {
                name: "Vault".into(),
                component_type: "database".into(),
                description: "pii personal sensitive credential payment financial".into(),
            }],
            vec![Relationship {
                source: "API".into(),
                target: "Vault".into(),
                data_flow: String::new(),
            }],
        );
        let scorer = CriticalityScorer::new();
        let scored = scorer.score(vec![threat("THREAT-001", "Vault", "database", 5.0)], &graph);
        // 6 matches would give 2.2; capped at 2.0. connectivity 0.9 (1 neighbor)
        assert_eq!(scored[0].criticality_score, Some(round2(5.0 * 1.3 * 0.9 * 2.0)));
    }

    #[test]
    fn test_sorted_descending_with_stable_ties() {
        let scorer = CriticalityScorer::new();
        let graph = ArchitectureGraph::default();
        let scored = scorer.score(
            vec![
                threat("THREAT-001", "A", "frontend", 4.0),
                threat("THREAT-002", "B", "frontend", 9.0),
                threat("THREAT-003", "C", "frontend", 4.0),
            ],
            &graph,
        );
        let ids: Vec<&str> = scored.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["THREAT-002", "THREAT-001", "THREAT-003"]);
    }

    #[test]
    fn test_scores_rounded_to_two_decimals() {
        let graph = ArchitectureGraph::new(
            vec![],
            vec![Relationship {
                source: "X".into(),
                target: "Y".into(),
                data_flow: String::new(),
            }],
        );
        let scorer = CriticalityScorer::new();
        let scored = scorer.score(vec![threat("THREAT-001", "X", "database", 3.33)], &graph);
        // 3.33 × 1.3 × 0.9 = 3.8961 → 3.9
        assert_eq!(scored[0].criticality_score, Some(3.9));
    }
}
