//! Threat model compilation pipeline
//!
//! Orchestrates the full compilation pipeline:
//! 1. Flatten source batches (a failed source contributes zero threats)
//! 2. Normalize raw records into canonical threats
//! 3. Score criticality against the architecture graph
//! 4. Merge duplicate scenarios
//! 5. Aggregate rollups, critical paths, and suggestions
//!
//! The pipeline is a pure function of (raw threats, architecture graph):
//! single-threaded, no shared state between stages, no I/O. Re-running on
//! identical inputs yields identical output ordering and scores. It never
//! fails — worst case is an empty model with zeroed stats.

use crate::aggregate::RiskAggregator;
use crate::config::ScoringConfig;
use crate::dedup::Deduplicator;
use crate::graph::ArchitectureGraph;
use crate::models::{CompileStats, CompiledThreat, CompiledThreatModel, RawThreat};
use crate::normalize::Normalizer;
use crate::paths::CriticalPathDetector;
use crate::scoring::CriticalityScorer;
use crate::sources::SourceBatch;
use crate::suggest::improvement_suggestions;
use tracing::{debug, info};

/// Compile a threat model with default scoring configuration.
///
/// This is the single entry point; the stages it drives are exported only
/// so they stay independently unit-testable.
pub fn compile(batches: &[SourceBatch], graph: &ArchitectureGraph) -> CompiledThreatModel {
    ThreatModelCompiler::new().compile(batches, graph)
}

/// Full compilation pipeline.
#[derive(Debug, Clone, Default)]
pub struct ThreatModelCompiler {
    scorer: CriticalityScorer,
}

impl ThreatModelCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a tuned scoring configuration.
    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            scorer: CriticalityScorer::with_config(config),
        }
    }

    /// Run the pipeline over all source batches.
    pub fn compile(
        &self,
        batches: &[SourceBatch],
        graph: &ArchitectureGraph,
    ) -> CompiledThreatModel {
        info!(
            sources = batches.len(),
            components = graph.components.len(),
            relationships = graph.relationships.len(),
            "starting threat model compilation"
        );

        let raw_threats = flatten_batches(batches);
        let received = raw_threats.len();

        let outcome = Normalizer::new().normalize(&raw_threats);
        let rejected = outcome.rejections.len();

        let scored = self.scorer.score(outcome.threats, graph);
        let scored_count = scored.len();

        let threats = Deduplicator::new().deduplicate(scored);
        let merged = scored_count - threats.len();

        let aggregator = RiskAggregator::new();
        let component_mapping = aggregator.component_mapping(&threats);
        let component_risk_levels = aggregator.component_risk_levels(&threats);
        let risk_summary = aggregator.summary(&threats);
        let critical_paths = CriticalPathDetector::new().find_critical_paths(&threats, graph);
        let suggestions = improvement_suggestions(&threats, graph);

        let stats = CompileStats {
            sources: batches.len(),
            threats_received: received,
            threats_rejected: rejected,
            threats_merged: merged,
        };
        info!(
            threats = threats.len(),
            rejected, merged, critical_paths = critical_paths.len(),
            "threat model compilation complete"
        );

        CompiledThreatModel {
            threats: threats.iter().map(CompiledThreat::from_threat).collect(),
            component_mapping,
            component_risk_levels,
            critical_paths,
            improvement_suggestions: suggestions,
            risk_summary,
            stats,
        }
    }
}

/// Flatten batches into the normalizer's input sequence, preserving batch
/// order. Empty batches (failed sources) contribute nothing but are still
/// visible in the stats.
fn flatten_batches(batches: &[SourceBatch]) -> Vec<RawThreat> {
    let mut raw_threats = Vec::new();
    for batch in batches {
        if batch.threats.is_empty() {
            debug!(source = batch.source.as_str(), "source contributed no threats");
        }
        raw_threats.extend(batch.threats.iter().cloned());
    }
    raw_threats
}
