//! Threat deduplication and merging
//!
//! Multiple sources routinely report the same underlying scenario in
//! slightly different words. Two threats are duplicates when their scenario
//! text reduces to the same bag-of-words key: lowercased, `\w+` tokenized,
//! sorted, deduplicated. Deliberately coarse and explainable — merges are
//! predictable from literal word-set equality, not fuzzy similarity.
//!
//! On merge the evidence sets union, the criticality keeps the maximum (a
//! severe assessment from one source is never diluted by a milder one), and
//! the earliest-seen threat keeps its id and position.

use crate::models::Threat;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tracing::debug;

static WORD_PATTERN: OnceLock<Regex> = OnceLock::new();

fn word_pattern() -> &'static Regex {
    WORD_PATTERN.get_or_init(|| Regex::new(r"\w+").expect("valid word regex"))
}

/// Normalized bag-of-words key for a scenario.
pub fn scenario_key(scenario: &str) -> String {
    let lowered = scenario.to_lowercase();
    let words: BTreeSet<&str> = word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();
    words.into_iter().collect::<Vec<_>>().join(" ")
}

/// Collapses near-duplicate threats; see module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    /// Merge duplicates, preserving first-seen order.
    pub fn deduplicate(&self, threats: Vec<Threat>) -> Vec<Threat> {
        let mut unique: Vec<Threat> = Vec::with_capacity(threats.len());
        let mut seen: FxHashMap<String, usize> = FxHashMap::default();

        for threat in threats {
            let key = scenario_key(&threat.scenario);
            match seen.get(&key) {
                Some(&index) => {
                    debug!(
                        kept = unique[index].id.as_str(),
                        merged = threat.id.as_str(),
                        "merging duplicate scenario"
                    );
                    merge_into(&mut unique[index], threat);
                }
                None => {
                    seen.insert(key, unique.len());
                    unique.push(threat);
                }
            }
        }
        unique
    }
}

/// Fold `other` into the first-seen `kept` record.
///
/// Scalar fields stay with the first-seen threat; only the evidence sets
/// union and the criticality takes the maximum.
fn merge_into(kept: &mut Threat, other: Threat) {
    kept.attack_vectors.extend(other.attack_vectors);
    kept.affected_components.extend(other.affected_components);
    kept.mitigations.extend(other.mitigations);
    kept.provenance.extend(other.provenance);

    match (kept.criticality_score, other.criticality_score) {
        (Some(a), Some(b)) => kept.criticality_score = Some(a.max(b)),
        (None, Some(b)) => kept.criticality_score = Some(b),
        _ => {}
    }
}
