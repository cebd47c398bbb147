//! Configuration module for Threatdeck
//!
//! This module handles:
//! - Scoring configuration (threatdeck.toml)
//! - Component-type weight overrides
//! - Connectivity / sensitivity factor tuning
//!
//! The severity bands (8/6/4) and the critical-path threshold (7.0) are a
//! public contract and deliberately NOT configurable here.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Config file name looked up next to the input files.
pub const CONFIG_FILE_NAME: &str = "threatdeck.toml";

/// Component types whose weight must stay at or above the generic 1.0 —
/// high-trust / high-blast-radius components never score below default.
const PRIVILEGED_COMPONENT_TYPES: &[&str] = &["authentication_service", "api_gateway", "database"];

/// Scoring configuration for criticality calculation.
///
/// ```toml
/// # threatdeck.toml
///
/// [scoring.component_weights]
/// authentication_service = 1.5
/// message_queue = 1.1
///
/// [scoring.connectivity]
/// base = 0.8
/// per_connection = 0.1
/// cap = 1.5
///
/// [scoring.sensitivity]
/// per_match = 0.2
/// cap = 2.0
/// indicators = ["pii", "credential", "payment"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Weight per component type, matched case-insensitively.
    #[serde(default = "default_component_weights")]
    pub component_weights: BTreeMap<String, f64>,

    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    #[serde(default)]
    pub sensitivity: SensitivityConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            component_weights: default_component_weights(),
            connectivity: ConnectivityConfig::default(),
            sensitivity: SensitivityConfig::default(),
        }
    }
}

fn default_component_weights() -> BTreeMap<String, f64> {
    [
        ("authentication_service", 1.5),
        ("api_gateway", 1.4),
        ("database", 1.3),
        ("backend", 1.2),
        ("frontend", 1.0),
        ("cache", 0.9),
        ("static_content", 0.8),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Connectivity factor: `min(cap, base + per_connection * neighbors)`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default = "default_connectivity_base")]
    pub base: f64,
    #[serde(default = "default_connectivity_per_connection")]
    pub per_connection: f64,
    #[serde(default = "default_connectivity_cap")]
    pub cap: f64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            base: default_connectivity_base(),
            per_connection: default_connectivity_per_connection(),
            cap: default_connectivity_cap(),
        }
    }
}

fn default_connectivity_base() -> f64 {
    0.8
}
fn default_connectivity_per_connection() -> f64 {
    0.1
}
fn default_connectivity_cap() -> f64 {
    1.5
}

/// Sensitivity factor: `min(cap, 1.0 + per_match * indicator_matches)`.
#[derive(Debug, Clone, Deserialize)]
pub struct SensitivityConfig {
    #[serde(default = "default_sensitivity_per_match")]
    pub per_match: f64,
    #[serde(default = "default_sensitivity_cap")]
    pub cap: f64,
    /// Keywords matched as substrings of the component description.
    #[serde(default = "default_sensitivity_indicators")]
    pub indicators: Vec<String>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            per_match: default_sensitivity_per_match(),
            cap: default_sensitivity_cap(),
            indicators: default_sensitivity_indicators(),
        }
    }
}

fn default_sensitivity_per_match() -> f64 {
    0.2
}
fn default_sensitivity_cap() -> f64 {
    2.0
}
fn default_sensitivity_indicators() -> Vec<String> {
    [
        "pii",
        "personal",
        "sensitive",
        "credential",
        "payment",
        "financial",
        "health",
        "password",
        "secret",
        "key",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl ScoringConfig {
    /// Weight for a component type; unknown types weight 1.0.
    pub fn component_weight(&self, component_type: &str) -> f64 {
        self.component_weights
            .get(&component_type.to_lowercase())
            .copied()
            .unwrap_or(1.0)
    }

    /// Warnings for overrides that break scoring monotonicity.
    ///
    /// High-trust component types scoring below generic components inverts
    /// the ranking the bands were calibrated for; loading such a config
    /// warns but does not fail.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for privileged in PRIVILEGED_COMPONENT_TYPES {
            if let Some(&weight) = self.component_weights.get(*privileged) {
                if weight < 1.0 {
                    warnings.push(format!(
                        "component weight for '{privileged}' is {weight} — high-trust \
                         components should not weight below the generic 1.0"
                    ));
                }
            }
        }
        if self.connectivity.per_connection < 0.0 {
            warnings.push("connectivity.per_connection is negative; factor is no longer monotonic".into());
        }
        if self.sensitivity.per_match < 0.0 {
            warnings.push("sensitivity.per_match is negative; factor is no longer monotonic".into());
        }
        warnings
    }
}

/// Wrapper matching the `[scoring]` table in `threatdeck.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    scoring: ScoringConfig,
}

/// Load scoring config from a TOML file.
pub fn load_scoring_config(path: &Path) -> anyhow::Result<ScoringConfig> {
    let content = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&content)?;
    Ok(file.scoring)
}

/// Load from an optional path, falling back to defaults.
///
/// A missing or unreadable file is logged and degraded, never fatal: the
/// compiler must keep working with stock weights.
pub fn load_or_default(path: Option<&Path>) -> ScoringConfig {
    let Some(path) = path else {
        debug!("no config path given, using default scoring config");
        return ScoringConfig::default();
    };
    match load_scoring_config(path) {
        Ok(config) => {
            debug!("loaded scoring config from {}", path.display());
            for warning in config.validate() {
                warn!("{}", warning);
            }
            config
        }
        Err(e) => {
            warn!("failed to load {}: {}; using defaults", path.display(), e);
            ScoringConfig::default()
        }
    }
}

/// Starter config written by `threatdeck init`.
pub const STARTER_CONFIG: &str = r#"# Threatdeck Configuration
#
# Scoring weights and factor tuning. Severity bands (critical >= 8.0,
# high >= 6.0, medium >= 4.0) and the critical-path threshold (7.0) are
# fixed and not configurable.

[scoring.component_weights]
authentication_service = 1.5
api_gateway = 1.4
database = 1.3
backend = 1.2
frontend = 1.0
cache = 0.9
static_content = 0.8

[scoring.connectivity]
base = 0.8
per_connection = 0.1
cap = 1.5

[scoring.sensitivity]
per_match = 0.2
cap = 2.0
indicators = [
    "pii", "personal", "sensitive", "credential", "payment",
    "financial", "health", "password", "secret", "key",
]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights_case_insensitive() {
        let config = ScoringConfig::default();
        assert_eq!(config.component_weight("authentication_service"), 1.5);
        assert_eq!(config.component_weight("Authentication_Service"), 1.5);
        assert_eq!(config.component_weight("API_GATEWAY"), 1.4);
        assert_eq!(config.component_weight("blockchain_oracle"), 1.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConfigFile = toml::from_str(
            r#"
            [scoring.component_weights]
            message_queue = 1.1
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.component_weight("message_queue"), 1.1);
        // Untouched sections fall back to defaults
        assert_eq!(config.scoring.connectivity.cap, 1.5);
        assert_eq!(config.scoring.sensitivity.cap, 2.0);
    }

    #[test]
    fn test_validate_flags_downweighted_privileged_types() {
        let mut config = ScoringConfig::default();
        config
            .component_weights
            .insert("authentication_service".into(), 0.5);
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("authentication_service"));

        assert!(ScoringConfig::default().validate().is_empty());
    }

    #[test]
    fn test_load_from_file_and_starter_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STARTER_CONFIG.as_bytes()).unwrap();
        let config = load_scoring_config(file.path()).unwrap();
        assert_eq!(config.component_weight("cache"), 0.9);
        assert_eq!(config.sensitivity.indicators.len(), 10);
    }

    #[test]
    fn test_load_or_default_degrades() {
        let config = load_or_default(Some(Path::new("/nonexistent/threatdeck.toml")));
        assert_eq!(config.component_weight("database"), 1.3);
        let config = load_or_default(None);
        assert_eq!(config.connectivity.base, 0.8);
    }
}
