//! Source batch adapters
//!
//! The collaborator-facing boundary: each independent analysis source hands
//! over one JSON batch of threat-shaped records. Batches arrive under either
//! of two legacy container keys (`"threats"` or `"threat_model"`), and the
//! records themselves use one of two known shapes:
//!
//! - analysis-agent shape: `"Threat Type"` / `"Scenario"` / `"Potential
//!   Impact"` keys alongside snake_case component fields
//! - knowledge-base shape: `"category"` / `"description"` / `"impact"` keys
//!
//! Each shape gets an explicit adapter into [`RawThreat`] — no speculative
//! multi-key lookups downstream. A malformed batch degrades to zero threats
//! from that source; it never fails the run.

use crate::models::RawThreat;
use serde_json::Value;
use tracing::{debug, warn};

/// Scenario-like fields, in priority order, for the agent shape.
const AGENT_SCENARIO_KEYS: &[&str] = &["Scenario", "scenario"];

/// Scenario-like fields, in priority order, for the knowledge-base shape.
const KB_SCENARIO_KEYS: &[&str] = &["description", "Description"];

/// One source's contribution to a compilation run.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    /// Source tag, carried into every threat's provenance.
    pub source: String,
    pub threats: Vec<RawThreat>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>, threats: Vec<RawThreat>) -> Self {
        Self {
            source: source.into(),
            threats,
        }
    }

    /// A failed or silent source: zero threats, still counted as a source.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, Vec::new())
    }

    /// Adapt one source's JSON output.
    ///
    /// Accepts `{"threats": [...]}`, the legacy `{"threat_model": [...]}`,
    /// or a bare top-level array. Anything else yields an empty batch.
    pub fn from_json(source: &str, value: &Value) -> Self {
        let records = match container_records(value) {
            Some(records) => records,
            None => {
                warn!(
                    source,
                    "batch has no recognizable threat container; treating as empty"
                );
                return Self::empty(source);
            }
        };

        let threats: Vec<RawThreat> = records
            .iter()
            .filter_map(|record| adapt_record(source, record))
            .collect();
        debug!(source, count = threats.len(), "adapted source batch");
        Self::new(source, threats)
    }
}

/// Reconcile the two legacy container keys (and the bare-array form) into
/// one flat record list.
fn container_records(value: &Value) -> Option<&Vec<Value>> {
    if let Some(records) = value.as_array() {
        return Some(records);
    }
    value
        .get("threats")
        .or_else(|| value.get("threat_model"))
        .and_then(Value::as_array)
}

/// Dispatch a record to the adapter for its shape.
fn adapt_record(source: &str, record: &Value) -> Option<RawThreat> {
    if !record.is_object() {
        warn!(source, "skipping non-object threat record");
        return None;
    }
    if record.get("Scenario").is_some()
        || record.get("Threat Type").is_some()
        || record.get("scenario").is_some()
    {
        Some(from_agent_record(source, record))
    } else {
        // Knowledge-base records have no Scenario key at all; records that
        // match neither shape still go through this adapter and get
        // rejected at normalization for lacking scenario text.
        Some(from_knowledge_base_record(source, record))
    }
}

/// Adapter for the analysis-agent record shape.
fn from_agent_record(source: &str, record: &Value) -> RawThreat {
    RawThreat {
        source: source.to_string(),
        threat_type: str_field(record, &["Threat Type", "threat_type"]),
        component_name: str_field(record, &["component_name"]),
        component_type: str_field(record, &["component_type"]),
        scenario: str_field(record, AGENT_SCENARIO_KEYS),
        attack_vectors: list_field(record, "attack_vectors"),
        affected_components: list_field(record, "affected_components"),
        impact: str_field(record, &["Potential Impact", "impact"]),
        risk_score: record.get("risk_score").cloned(),
        mitigations: list_field(record, "mitigations"),
    }
}

/// Adapter for the knowledge-base record shape.
fn from_knowledge_base_record(source: &str, record: &Value) -> RawThreat {
    RawThreat {
        source: source.to_string(),
        threat_type: str_field(record, &["category"]),
        component_name: str_field(record, &["component_name"]),
        component_type: str_field(record, &["component_type"]),
        scenario: str_field(record, KB_SCENARIO_KEYS),
        attack_vectors: list_field(record, "attack_vectors"),
        affected_components: list_field(record, "affected_components"),
        impact: str_field(record, &["impact_description", "impact"]),
        risk_score: record
            .get("severity_score")
            .or_else(|| record.get("risk_score"))
            .cloned(),
        mitigations: list_field(record, "mitigations"),
    }
}

/// First present string field from a prioritized key list.
fn str_field(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(|v| v.as_str())
        .map(str::to_string)
}

/// String-array field; non-string entries are dropped.
fn list_field(record: &Value, key: &str) -> Vec<String> {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
