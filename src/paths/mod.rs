//! Critical attack path detection
//!
//! Walks every direct relationship edge and flags the ones connecting
//! components that carry high-criticality threats. Only the threat's
//! primary component counts toward an edge; only single-hop edges are
//! evaluated — multi-hop chains are a deliberate scope limit, not an
//! oversight (see DESIGN.md).

use crate::graph::ArchitectureGraph;
use crate::models::{CriticalPath, RiskLevel, Threat};
use rustc_hash::FxHashMap;
use tracing::debug;

/// An edge is critical when either endpoint's worst primary threat reaches
/// this score. Fixed contract, not configurable per run.
pub const CRITICAL_PATH_THRESHOLD: f64 = 7.0;

/// Flags relationship edges between high-criticality components.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalPathDetector;

impl CriticalPathDetector {
    pub fn new() -> Self {
        Self
    }

    /// One finding per qualifying edge, in relationship order.
    pub fn find_critical_paths(
        &self,
        threats: &[Threat],
        graph: &ArchitectureGraph,
    ) -> Vec<CriticalPath> {
        // Worst primary-threat score per component
        let mut max_by_component: FxHashMap<&str, f64> = FxHashMap::default();
        for threat in threats {
            let entry = max_by_component
                .entry(threat.component_name.as_str())
                .or_insert(0.0);
            *entry = entry.max(threat.criticality());
        }

        let mut paths = Vec::new();
        for rel in &graph.relationships {
            let source_max = max_by_component.get(rel.source.as_str()).copied();
            let target_max = max_by_component.get(rel.target.as_str()).copied();
            let path_criticality = source_max.unwrap_or(0.0).max(target_max.unwrap_or(0.0));

            if path_criticality >= CRITICAL_PATH_THRESHOLD {
                paths.push(CriticalPath {
                    path: vec![rel.source.clone(), rel.target.clone()],
                    risk_level: RiskLevel::from_score(path_criticality),
                    description: format!(
                        "Critical path between {} and {} with risk score {:.1}",
                        rel.source, rel.target, path_criticality
                    ),
                });
            }
        }
        debug!(count = paths.len(), "identified critical paths");
        paths
    }
}
