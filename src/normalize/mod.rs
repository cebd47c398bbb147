//! Threat normalizer
//!
//! Converts as-received [`RawThreat`] records into canonical [`Threat`]s:
//! - assigns sequential `THREAT-NNN` ids in input order
//! - rejects records with no scenario text (recorded, never a crash)
//! - coerces source-reported risk scores to [0, 10], defaulting to 5.0
//! - fills canonical defaults (`"System"` component, `"Unknown"` type)
//!
//! Pure transform: no state survives between calls.

use crate::models::{RawThreat, StrideCategory, Threat};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Neutral midpoint used when a source-reported score cannot be parsed.
pub const DEFAULT_BASE_SCORE: f64 = 5.0;

/// Why a raw record was dropped at normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// No scenario-like field carried any non-blank text.
    #[error("no usable scenario text")]
    MissingScenario,
}

/// One dropped record, with enough context to explain the drop.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// Source tag of the offending record.
    pub source: String,
    /// Position of the record in the flattened input sequence.
    pub index: usize,
    pub reason: RejectReason,
}

/// Output of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub threats: Vec<Threat>,
    pub rejections: Vec<Rejection>,
}

/// Stateless normalizer; see module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a flat sequence of raw records.
    ///
    /// Ids are assigned sequentially over accepted threats only, so output
    /// ids are always dense (`THREAT-001`, `THREAT-002`, ...). Input order
    /// is part of the contract — it seeds every downstream tie-break.
    pub fn normalize(&self, raw_threats: &[RawThreat]) -> NormalizeOutcome {
        let mut outcome = NormalizeOutcome::default();
        let mut counter = 1usize;

        for (index, raw) in raw_threats.iter().enumerate() {
            let scenario = match usable_scenario(raw) {
                Some(scenario) => scenario,
                None => {
                    warn!(
                        source = raw.source.as_str(),
                        index, "rejecting threat record: no usable scenario text"
                    );
                    outcome.rejections.push(Rejection {
                        source: raw.source.clone(),
                        index,
                        reason: RejectReason::MissingScenario,
                    });
                    continue;
                }
            };

            let id = format!("THREAT-{counter:03}");
            counter += 1;

            let threat_type = raw
                .threat_type
                .as_deref()
                .map(StrideCategory::from_label)
                .unwrap_or(StrideCategory::Unknown);

            let mut provenance = BTreeSet::new();
            provenance.insert(raw.source.clone());

            outcome.threats.push(Threat {
                id,
                threat_type: threat_type.label().to_string(),
                component_name: field_or(&raw.component_name, "System"),
                component_type: field_or(&raw.component_type, "Unknown"),
                scenario,
                attack_vectors: clean_set(&raw.attack_vectors),
                affected_components: clean_set(&raw.affected_components),
                impact: raw.impact.clone().unwrap_or_default(),
                base_score: parse_base_score(raw.risk_score.as_ref()),
                criticality_score: None,
                mitigations: clean_set(&raw.mitigations),
                provenance,
            });
        }

        debug!(
            accepted = outcome.threats.len(),
            rejected = outcome.rejections.len(),
            "normalization complete"
        );
        outcome
    }
}

/// Trimmed scenario text, or `None` when the record carries nothing usable.
fn usable_scenario(raw: &RawThreat) -> Option<String> {
    raw.scenario
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn field_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Non-blank, trimmed entries as a set.
fn clean_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerce a source-reported score into [0, 10].
///
/// Accepts numbers, numeric strings, and `"N/M"` fractions (rescaled to
/// out-of-10). Anything unparseable defaults to [`DEFAULT_BASE_SCORE`] —
/// one bad score never fails the batch.
pub fn parse_base_score(value: Option<&Value>) -> f64 {
    let score = match value {
        None => DEFAULT_BASE_SCORE,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(DEFAULT_BASE_SCORE),
        Some(Value::String(s)) => parse_score_string(s),
        Some(_) => DEFAULT_BASE_SCORE,
    };
    score.clamp(0.0, 10.0)
}

fn parse_score_string(s: &str) -> f64 {
    if let Some((numerator, denominator)) = s.split_once('/') {
        let numerator: Option<f64> = numerator.trim().parse().ok();
        let denominator: Option<f64> = denominator.trim().parse().ok();
        return match (numerator, denominator) {
            (Some(n), Some(d)) if d != 0.0 => (n / d) * 10.0,
            _ => DEFAULT_BASE_SCORE,
        };
    }
    s.trim().parse().unwrap_or(DEFAULT_BASE_SCORE)
}
