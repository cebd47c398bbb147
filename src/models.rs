//! Core data models for Threatdeck
//!
//! These models are used throughout the codebase for representing
//! threats, risk rollups, and the compiled threat model artifact.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Risk bands over criticality scores.
///
/// Thresholds are a public contract shared by component rollups, the risk
/// summary, and critical-path findings: critical >= 8.0, high >= 6.0,
/// medium >= 4.0, low below that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band a criticality score.
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            RiskLevel::Critical
        } else if score >= 6.0 {
            RiskLevel::High
        } else if score >= 4.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// The six STRIDE categories plus a fallback for labels no source agreed on.
///
/// Threats with an unrecognized category are kept and tagged `Unknown`,
/// never dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrideCategory {
    Spoofing,
    Tampering,
    Repudiation,
    InformationDisclosure,
    DenialOfService,
    ElevationOfPrivilege,
    Unknown,
}

impl StrideCategory {
    /// Canonical display label, as it appears in compiled output.
    pub fn label(&self) -> &'static str {
        match self {
            StrideCategory::Spoofing => "Spoofing",
            StrideCategory::Tampering => "Tampering",
            StrideCategory::Repudiation => "Repudiation",
            StrideCategory::InformationDisclosure => "Information Disclosure",
            StrideCategory::DenialOfService => "Denial of Service",
            StrideCategory::ElevationOfPrivilege => "Elevation of Privilege",
            StrideCategory::Unknown => "Unknown",
        }
    }

    /// Parse a source-reported category label.
    ///
    /// Case-insensitive; underscores and hyphens are treated as spaces so
    /// `information_disclosure` and `Information Disclosure` both match.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "spoofing" => StrideCategory::Spoofing,
            "tampering" => StrideCategory::Tampering,
            "repudiation" => StrideCategory::Repudiation,
            "information disclosure" => StrideCategory::InformationDisclosure,
            "denial of service" => StrideCategory::DenialOfService,
            "elevation of privilege" => StrideCategory::ElevationOfPrivilege,
            _ => StrideCategory::Unknown,
        }
    }
}

impl std::fmt::Display for StrideCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An as-received candidate threat from one analysis source.
///
/// Field variance across sources is absorbed by the adapters in
/// `crate::sources`; everything here is already keyed canonically, but all
/// fields except `source` remain optional until normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawThreat {
    /// Tag of the analysis source that produced this record (provenance only,
    /// never used for scoring).
    pub source: String,
    #[serde(default)]
    pub threat_type: Option<String>,
    #[serde(default)]
    pub component_name: Option<String>,
    #[serde(default)]
    pub component_type: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub attack_vectors: Vec<String>,
    #[serde(default)]
    pub affected_components: Vec<String>,
    #[serde(default)]
    pub impact: Option<String>,
    /// Source-reported risk estimate, still in whatever shape the source
    /// used (number, numeric string, or `"7/10"` fraction).
    #[serde(default)]
    pub risk_score: Option<serde_json::Value>,
    #[serde(default)]
    pub mitigations: Vec<String>,
}

/// A canonical threat, the unit the pipeline operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    /// Stable id (`THREAT-NNN`), unique within one compilation run.
    pub id: String,
    /// Canonical STRIDE label, or `"Unknown"`.
    pub threat_type: String,
    /// Primary affected component (`"System"` when the source left it out).
    pub component_name: String,
    /// Best-effort type tag, used only for weighting.
    pub component_type: String,
    /// Attack narrative. Never empty: scenario-less records are rejected at
    /// normalization.
    pub scenario: String,
    pub attack_vectors: BTreeSet<String>,
    /// Components affected beyond the primary one.
    pub affected_components: BTreeSet<String>,
    pub impact: String,
    /// Source-reported risk estimate, normalized to [0, 10].
    pub base_score: f64,
    /// Computed by the scorer; `None` until then, set exactly once.
    pub criticality_score: Option<f64>,
    pub mitigations: BTreeSet<String>,
    /// Source tags that contributed to this threat; grows under merging.
    pub provenance: BTreeSet<String>,
}

impl Threat {
    /// Criticality, treating an unscored threat as 0.0.
    pub fn criticality(&self) -> f64 {
        self.criticality_score.unwrap_or(0.0)
    }

    /// Risk band of the computed criticality.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.criticality())
    }

    /// Whether this threat names `component` as primary or affected.
    pub fn names_component(&self, component: &str) -> bool {
        self.component_name == component || self.affected_components.contains(component)
    }
}

/// One threat as it appears in the compiled artifact: scored, banded, and
/// reduced to plain serializable data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledThreat {
    pub threat_id: String,
    pub threat_type: String,
    pub component_name: String,
    pub component_type: String,
    pub scenario: String,
    pub attack_vectors: Vec<String>,
    pub affected_components: Vec<String>,
    pub impact: String,
    pub base_score: f64,
    pub criticality_score: f64,
    pub risk_level: RiskLevel,
    pub mitigations: Vec<String>,
    pub provenance: Vec<String>,
}

impl CompiledThreat {
    pub fn from_threat(threat: &Threat) -> Self {
        Self {
            threat_id: threat.id.clone(),
            threat_type: threat.threat_type.clone(),
            component_name: threat.component_name.clone(),
            component_type: threat.component_type.clone(),
            scenario: threat.scenario.clone(),
            attack_vectors: threat.attack_vectors.iter().cloned().collect(),
            affected_components: threat.affected_components.iter().cloned().collect(),
            impact: threat.impact.clone(),
            base_score: threat.base_score,
            criticality_score: threat.criticality(),
            risk_level: threat.risk_level(),
            mitigations: threat.mitigations.iter().cloned().collect(),
            provenance: threat.provenance.iter().cloned().collect(),
        }
    }
}

/// Per-component risk rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRisk {
    /// Band of the component's worst threat.
    pub level: RiskLevel,
    /// Highest criticality among threats naming this component.
    pub score: f64,
    pub threat_count: usize,
    /// STRIDE labels seen on this component's threats.
    pub threat_types: BTreeSet<String>,
}

/// A direct relationship edge whose endpoints carry high-criticality threats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalPath {
    /// `[source, target]` component names.
    pub path: Vec<String>,
    pub risk_level: RiskLevel,
    pub description: String,
}

/// Severity distribution across all compiled threats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskDistribution {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// One of the top-N highest-scoring threats, summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighestRisk {
    pub threat_id: String,
    pub component: String,
    pub score: f64,
    pub threat_type: String,
}

/// A component together with how many threats name it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedComponent {
    pub component: String,
    pub threat_count: usize,
}

/// Overall risk summary for one compilation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskSummary {
    pub risk_distribution: RiskDistribution,
    /// Threat counts per STRIDE label.
    pub threat_distribution: BTreeMap<String, usize>,
    pub total_threats: usize,
    /// Count of distinct components named by any threat.
    pub affected_components: usize,
    /// Top 5 threats by criticality (ties keep normalization order).
    pub highest_risks: Vec<HighestRisk>,
    /// Every component named by any threat, alphabetical.
    pub most_affected_components: Vec<AffectedComponent>,
}

/// Bookkeeping counters for one compilation run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CompileStats {
    /// Source batches received, including empty/failed ones.
    pub sources: usize,
    /// Raw threat records received across all batches.
    pub threats_received: usize,
    /// Records rejected at normalization (no scenario text).
    pub threats_rejected: usize,
    /// Threats collapsed into an earlier duplicate.
    pub threats_merged: usize,
}

/// The pipeline's sole output. Plain maps/sequences/strings/numbers only,
/// so any downstream renderer can consume it. Never mutated after return.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompiledThreatModel {
    /// All threats, descending by criticality score.
    pub threats: Vec<CompiledThreat>,
    /// Component name -> ids of threats naming it (primary or affected).
    pub component_mapping: BTreeMap<String, Vec<String>>,
    pub component_risk_levels: BTreeMap<String, ComponentRisk>,
    pub critical_paths: Vec<CriticalPath>,
    pub improvement_suggestions: Vec<String>,
    pub risk_summary: RiskSummary,
    pub stats: CompileStats,
}

impl CompiledThreatModel {
    /// Empty model, returned when no usable threats survive compilation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.threats.is_empty()
    }
}
