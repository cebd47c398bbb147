//! Risk aggregation
//!
//! Rolls scored, deduplicated threats up into the summary views of the
//! compiled model:
//! - component → threat-id mapping
//! - per-component risk levels (band of the worst threat naming the
//!   component as primary or affected)
//! - the global risk summary: band distribution, STRIDE distribution,
//!   top-5 highest risks, and an alphabetical most-affected list
//!
//! All outputs are deterministic: BTree-ordered maps, input-order threat
//! ids, alphabetical component lists.

use crate::models::{
    AffectedComponent, ComponentRisk, HighestRisk, RiskDistribution, RiskLevel, RiskSummary, Threat,
};
use std::collections::{BTreeMap, BTreeSet};

/// How many threats the summary's `highest_risks` keeps.
const HIGHEST_RISKS_LIMIT: usize = 5;

/// Derives rollups and summaries; see module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskAggregator;

impl RiskAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Component name → ids of threats naming it (primary or affected),
    /// in threat order.
    pub fn component_mapping(&self, threats: &[Threat]) -> BTreeMap<String, Vec<String>> {
        let mut mapping: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for threat in threats {
            mapping
                .entry(threat.component_name.clone())
                .or_default()
                .push(threat.id.clone());
            for component in &threat.affected_components {
                // A threat listing its primary component as affected too
                // still maps once
                if component != &threat.component_name {
                    mapping
                        .entry(component.clone())
                        .or_default()
                        .push(threat.id.clone());
                }
            }
        }
        mapping
    }

    /// Per-component rollup over every threat naming the component.
    pub fn component_risk_levels(&self, threats: &[Threat]) -> BTreeMap<String, ComponentRisk> {
        let mut rollups: BTreeMap<String, ComponentRisk> = BTreeMap::new();

        for threat in threats {
            let mut named: BTreeSet<&str> = BTreeSet::new();
            named.insert(threat.component_name.as_str());
            named.extend(threat.affected_components.iter().map(String::as_str));

            for component in named {
                let rollup = rollups.entry(component.to_string()).or_insert(ComponentRisk {
                    level: RiskLevel::Low,
                    score: 0.0,
                    threat_count: 0,
                    threat_types: BTreeSet::new(),
                });
                rollup.score = rollup.score.max(threat.criticality());
                rollup.threat_count += 1;
                rollup.threat_types.insert(threat.threat_type.clone());
            }
        }

        for rollup in rollups.values_mut() {
            rollup.level = RiskLevel::from_score(rollup.score);
        }
        rollups
    }

    /// Global risk summary. Expects threats already sorted descending by
    /// criticality, as the scorer leaves them.
    pub fn summary(&self, threats: &[Threat]) -> RiskSummary {
        let mut distribution = RiskDistribution::default();
        let mut threat_distribution: BTreeMap<String, usize> = BTreeMap::new();
        let mut named_components: BTreeMap<String, usize> = BTreeMap::new();

        for threat in threats {
            distribution.add(threat.risk_level());
            *threat_distribution
                .entry(threat.threat_type.clone())
                .or_insert(0) += 1;

            let mut named: BTreeSet<&str> = BTreeSet::new();
            named.insert(threat.component_name.as_str());
            named.extend(threat.affected_components.iter().map(String::as_str));
            for component in named {
                *named_components.entry(component.to_string()).or_insert(0) += 1;
            }
        }

        let highest_risks = threats
            .iter()
            .take(HIGHEST_RISKS_LIMIT)
            .map(|threat| HighestRisk {
                threat_id: threat.id.clone(),
                component: threat.component_name.clone(),
                score: threat.criticality(),
                threat_type: threat.threat_type.clone(),
            })
            .collect();

        // BTreeMap iteration is already alphabetical
        let most_affected_components = named_components
            .into_iter()
            .map(|(component, threat_count)| AffectedComponent {
                component,
                threat_count,
            })
            .collect::<Vec<_>>();

        RiskSummary {
            risk_distribution: distribution,
            threat_distribution,
            total_threats: threats.len(),
            affected_components: most_affected_components.len(),
            highest_risks,
            most_affected_components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threat(id: &str, component: &str, threat_type: &str, score: f64, affected: &[&str]) -> Threat {
        Threat {
            id: id.to_string(),
            threat_type: threat_type.to_string(),
            component_name: component.to_string(),
            component_type: "backend".into(),
            scenario: format!("scenario {id}"),
            attack_vectors: BTreeSet::new(),
            affected_components: affected.iter().map(|s| s.to_string()).collect(),
            impact: String::new(),
            base_score: 5.0,
            criticality_score: Some(score),
            mitigations: BTreeSet::new(),
            provenance: BTreeSet::new(),
        }
    }

    #[test]
    fn test_component_mapping_includes_affected() {
        let aggregator = RiskAggregator::new();
        let mapping = aggregator.component_mapping(&[
            threat("THREAT-001", "API", "Spoofing", 9.0, &["DB", "Cache"]),
            threat("THREAT-002", "DB", "Tampering", 5.0, &[]),
        ]);
        assert_eq!(mapping["API"], vec!["THREAT-001"]);
        assert_eq!(mapping["DB"], vec!["THREAT-001", "THREAT-002"]);
        assert_eq!(mapping["Cache"], vec!["THREAT-001"]);
    }

    #[test]
    fn test_component_level_uses_affected_threats_too() {
        let aggregator = RiskAggregator::new();
        // DB is only "affected" by the critical threat, but its level must
        // still reflect it
        let rollups = aggregator.component_risk_levels(&[
            threat("THREAT-001", "API", "Spoofing", 8.5, &["DB"]),
            threat("THREAT-002", "DB", "Tampering", 3.0, &[]),
        ]);
        let db = &rollups["DB"];
        assert_eq!(db.level, RiskLevel::Critical);
        assert_eq!(db.score, 8.5);
        assert_eq!(db.threat_count, 2);
        assert!(db.threat_types.contains("Spoofing"));
        assert!(db.threat_types.contains("Tampering"));
    }

    #[test]
    fn test_band_boundaries_in_rollup() {
        let aggregator = RiskAggregator::new();
        let rollups = aggregator.component_risk_levels(&[
            threat("THREAT-001", "A", "Spoofing", 8.0, &[]),
            threat("THREAT-002", "B", "Spoofing", 7.99, &[]),
            threat("THREAT-003", "C", "Spoofing", 4.0, &[]),
            threat("THREAT-004", "D", "Spoofing", 3.99, &[]),
        ]);
        assert_eq!(rollups["A"].level, RiskLevel::Critical);
        assert_eq!(rollups["B"].level, RiskLevel::High);
        assert_eq!(rollups["C"].level, RiskLevel::Medium);
        assert_eq!(rollups["D"].level, RiskLevel::Low);
    }

    #[test]
    fn test_summary_distributions() {
        let aggregator = RiskAggregator::new();
        let summary = aggregator.summary(&[
            threat("THREAT-001", "A", "Spoofing", 9.0, &["B"]),
            threat("THREAT-002", "B", "Spoofing", 6.5, &[]),
            threat("THREAT-003", "C", "Denial of Service", 2.0, &[]),
        ]);
        assert_eq!(summary.total_threats, 3);
        assert_eq!(summary.risk_distribution.critical, 1);
        assert_eq!(summary.risk_distribution.high, 1);
        assert_eq!(summary.risk_distribution.low, 1);
        assert_eq!(summary.threat_distribution["Spoofing"], 2);
        assert_eq!(summary.threat_distribution["Denial of Service"], 1);
        assert_eq!(summary.affected_components, 3);
    }

    #[test]
    fn test_highest_risks_top_five_in_order() {
        let aggregator = RiskAggregator::new();
        let threats: Vec<Threat> = (0..7)
            .map(|i| {
                threat(
                    &format!("THREAT-{:03}", i + 1),
                    "A",
                    "Spoofing",
                    9.0 - i as f64,
                    &[],
                )
            })
            .collect();
        let summary = aggregator.summary(&threats);
        assert_eq!(summary.highest_risks.len(), 5);
        assert_eq!(summary.highest_risks[0].threat_id, "THREAT-001");
        assert_eq!(summary.highest_risks[4].threat_id, "THREAT-005");
    }

    #[test]
    fn test_most_affected_alphabetical() {
        let aggregator = RiskAggregator::new();
        let summary = aggregator.summary(&[
            threat("THREAT-001", "Zeta", "Spoofing", 5.0, &["Alpha"]),
            threat("THREAT-002", "Midway", "Spoofing", 5.0, &[]),
        ]);
        let names: Vec<&str> = summary
            .most_affected_components
            .iter()
            .map(|c| c.component.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Midway", "Zeta"]);
    }
}
