//! Configuration for the analysis core.
//!
//! Loaded from `insight.json` and `scenarios.json` in the Agora config
//! directory, deep-merged in that order, then overridden from the
//! environment:
//!
//! - `AGORA_LOG_LEVEL` / `AGORA_LOG_FORMAT` → observability
//! - `AGORA_CLUSTER_SEED` → clustering.seed
//! - `AGORA_TOP_K` → tradeoffs.top_k
//!
//! Every section has defaults, so an empty directory yields the UBI pilot
//! configuration.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::modeling::presets;
use crate::modeling::projection::{Horizon, HorizonYears};
use crate::modeling::scenario::{ParameterRange, ScenarioDefinition, TrackedDimension};
use crate::processing::lexicon::Lexicon;
use agora_common::validation::{check_range, check_range_exclusive_min, collect_errors};
use agora_common::{load_modular_config, ObservabilityConfig, Validate, ValidationError, ValidationResult};

/// Files merged, in order, to build the configuration.
pub const CONFIG_FILES: &[&str] = &["insight.json", "scenarios.json"];

// ============================================================================
// Root
// ============================================================================

/// Complete configuration of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Policy question the opinions address
    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default)]
    pub duplicates: DuplicateConfig,

    #[serde(default)]
    pub bias: BiasConfig,

    #[serde(default)]
    pub lexicon: Lexicon,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub demographics: DemographicsConfig,

    #[serde(default)]
    pub modeling: ModelingConfig,

    #[serde(default)]
    pub tradeoffs: TradeoffConfig,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            observability: ObservabilityConfig::default(),
            topic: default_topic(),
            duplicates: DuplicateConfig::default(),
            bias: BiasConfig::default(),
            lexicon: Lexicon::default(),
            embedding: EmbeddingConfig::default(),
            clustering: ClusteringConfig::default(),
            demographics: DemographicsConfig::default(),
            modeling: ModelingConfig::default(),
            tradeoffs: TradeoffConfig::default(),
        }
    }
}

fn default_topic() -> String {
    presets::UBI_TOPIC.to_string()
}

impl InsightConfig {
    /// Load from a config directory (default `~/.agora`) and apply
    /// environment overrides.
    pub fn load(dir: Option<PathBuf>) -> agora_common::Result<Self> {
        let value = load_modular_config(dir, CONFIG_FILES)?;
        let mut config: InsightConfig = serde_json::from_value(value)?;
        config.apply_env_overrides_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `AGORA_*` overrides from a variable lookup.
    pub fn apply_env_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> agora_common::Result<()> {
        if let Some(level) = lookup("AGORA_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("AGORA_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(seed) = lookup("AGORA_CLUSTER_SEED") {
            self.clustering.seed = seed.trim().parse().map_err(|_| {
                agora_common::Error::Config(format!("AGORA_CLUSTER_SEED is not a u64: {seed}"))
            })?;
        }
        if let Some(top_k) = lookup("AGORA_TOP_K") {
            self.tradeoffs.top_k = top_k.trim().parse().map_err(|_| {
                agora_common::Error::Config(format!("AGORA_TOP_K is not a count: {top_k}"))
            })?;
        }
        Ok(())
    }
}

impl Validate for InsightConfig {
    fn validate(&self) -> ValidationResult<()> {
        let sections: [&dyn Validate; 9] = [
            &self.observability,
            &self.lexicon,
            &self.duplicates,
            &self.bias,
            &self.embedding,
            &self.clustering,
            &self.demographics,
            &self.modeling,
            &self.tradeoffs,
        ];
        let mut errors = Vec::new();
        for section in sections {
            match section.validate() {
                Ok(()) => {}
                Err(ValidationError::Multiple(nested)) => errors.extend(nested),
                Err(e) => errors.push(e),
            }
        }
        collect_errors(errors)
    }
}

// ============================================================================
// Data Quality
// ============================================================================

/// Duplicate detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateConfig {
    /// Ratio at or above which the duplicate warning fires
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            warning_threshold: default_warning_threshold(),
        }
    }
}

fn default_warning_threshold() -> f64 {
    0.30
}

impl Validate for DuplicateConfig {
    fn validate(&self) -> ValidationResult<()> {
        check_range("duplicates.warning_threshold", self.warning_threshold, 0.0, 1.0)
    }
}

/// Sampling-bias thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasConfig {
    /// Opinion count below which results are flagged as unrepresentative
    #[serde(default = "default_min_opinions")]
    pub min_opinions: usize,

    /// Share above which a single source is flagged as dominant
    #[serde(default = "default_source_dominance_threshold")]
    pub source_dominance_threshold: f64,

    /// Share of opinions with demographics below which coverage is flagged
    #[serde(default = "default_demographic_coverage_threshold")]
    pub demographic_coverage_threshold: f64,

    /// Timestamped opinions needed before timing is checked
    #[serde(default = "default_temporal_min_opinions")]
    pub temporal_min_opinions: usize,

    /// Share of timestamped opinions that counts as a burst
    #[serde(default = "default_burst_share")]
    pub burst_share: f64,

    /// Burst window, as a fraction of the total submission span
    #[serde(default = "default_burst_window_fraction")]
    pub burst_window_fraction: f64,

    /// Share of opinions sharing one exact timestamp that is flagged
    #[serde(default = "default_identical_timestamp_share")]
    pub identical_timestamp_share: f64,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            min_opinions: default_min_opinions(),
            source_dominance_threshold: default_source_dominance_threshold(),
            demographic_coverage_threshold: default_demographic_coverage_threshold(),
            temporal_min_opinions: default_temporal_min_opinions(),
            burst_share: default_burst_share(),
            burst_window_fraction: default_burst_window_fraction(),
            identical_timestamp_share: default_identical_timestamp_share(),
        }
    }
}

fn default_min_opinions() -> usize {
    30
}

fn default_source_dominance_threshold() -> f64 {
    0.80
}

fn default_demographic_coverage_threshold() -> f64 {
    0.10
}

fn default_temporal_min_opinions() -> usize {
    10
}

fn default_burst_share() -> f64 {
    0.5
}

fn default_burst_window_fraction() -> f64 {
    0.05
}

fn default_identical_timestamp_share() -> f64 {
    0.5
}

impl Validate for BiasConfig {
    fn validate(&self) -> ValidationResult<()> {
        collect_errors(
            [
                check_range(
                    "bias.source_dominance_threshold",
                    self.source_dominance_threshold,
                    0.0,
                    1.0,
                ),
                check_range(
                    "bias.demographic_coverage_threshold",
                    self.demographic_coverage_threshold,
                    0.0,
                    1.0,
                ),
                check_range_exclusive_min("bias.burst_share", self.burst_share, 0.0, 1.0),
                check_range_exclusive_min(
                    "bias.burst_window_fraction",
                    self.burst_window_fraction,
                    0.0,
                    1.0,
                ),
                check_range_exclusive_min(
                    "bias.identical_timestamp_share",
                    self.identical_timestamp_share,
                    0.0,
                    1.0,
                ),
            ]
            .into_iter()
            .filter_map(Result::err)
            .collect(),
        )
    }
}

// ============================================================================
// Embedding & Clustering
// ============================================================================

/// Per-component weights applied to the sentiment part of a feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeights {
    #[serde(default = "default_stance_weight")]
    pub stance: f64,
    #[serde(default = "default_secondary_weight")]
    pub urgency: f64,
    #[serde(default = "default_secondary_weight")]
    pub certainty: f64,
    #[serde(default = "default_secondary_weight")]
    pub intensity: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            stance: default_stance_weight(),
            urgency: default_secondary_weight(),
            certainty: default_secondary_weight(),
            intensity: default_secondary_weight(),
        }
    }
}

fn default_stance_weight() -> f64 {
    1.0
}

fn default_secondary_weight() -> f64 {
    0.5
}

/// How opinions become feature vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Stance score above which an opinion is labeled support
    #[serde(default = "default_stance_threshold")]
    pub support_threshold: f64,

    /// Stance score below the negation of which an opinion is labeled oppose
    #[serde(default = "default_stance_threshold")]
    pub oppose_threshold: f64,

    /// Use the declared stance instead of thresholding when present
    #[serde(default = "default_true")]
    pub prefer_declared_stance: bool,

    /// Weight of the one-hot stance label components
    #[serde(default = "default_stance_label_weight")]
    pub stance_label_weight: f64,

    #[serde(default)]
    pub feature_weights: FeatureWeights,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            support_threshold: default_stance_threshold(),
            oppose_threshold: default_stance_threshold(),
            prefer_declared_stance: default_true(),
            stance_label_weight: default_stance_label_weight(),
            feature_weights: FeatureWeights::default(),
        }
    }
}

fn default_stance_threshold() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_stance_label_weight() -> f64 {
    0.5
}

impl Validate for EmbeddingConfig {
    fn validate(&self) -> ValidationResult<()> {
        let w = &self.feature_weights;
        collect_errors(
            [
                check_range("embedding.support_threshold", self.support_threshold, 0.0, 1.0),
                check_range("embedding.oppose_threshold", self.oppose_threshold, 0.0, 1.0),
                check_range("embedding.stance_label_weight", self.stance_label_weight, 0.0, 10.0),
                check_range("embedding.feature_weights.stance", w.stance, 0.0, 10.0),
                check_range("embedding.feature_weights.urgency", w.urgency, 0.0, 10.0),
                check_range("embedding.feature_weights.certainty", w.certainty, 0.0, 10.0),
                check_range("embedding.feature_weights.intensity", w.intensity, 0.0, 10.0),
            ]
            .into_iter()
            .filter_map(Result::err)
            .collect(),
        )
    }
}

/// Requested number of clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClusterCount {
    /// Exactly `k` clusters when enough opinions are available
    Fixed { k: usize },
    /// The k in `[min, max]` with the best mean silhouette
    Auto { min: usize, max: usize },
}

impl Default for ClusterCount {
    fn default() -> Self {
        Self::Fixed { k: 4 }
    }
}

impl std::fmt::Display for ClusterCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed { k } => write!(f, "fixed k={k}"),
            Self::Auto { min, max } => write!(f, "auto k in [{min}, {max}]"),
        }
    }
}

/// Clustering engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub count: ClusterCount,

    /// Opinions required per requested cluster before falling back to one
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Independent k-means runs; the lowest inertia wins
    #[serde(default = "default_restarts")]
    pub restarts: usize,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_representative_quotes")]
    pub representative_quotes: usize,

    #[serde(default = "default_quote_max_chars")]
    pub quote_max_chars: usize,

    /// Decimal places of stance percentages
    #[serde(default = "default_percent_precision")]
    pub percent_precision: u32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            count: ClusterCount::default(),
            min_cluster_size: default_min_cluster_size(),
            seed: default_seed(),
            restarts: default_restarts(),
            max_iterations: default_max_iterations(),
            representative_quotes: default_representative_quotes(),
            quote_max_chars: default_quote_max_chars(),
            percent_precision: default_percent_precision(),
        }
    }
}

fn default_min_cluster_size() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_restarts() -> usize {
    10
}

fn default_max_iterations() -> usize {
    100
}

fn default_representative_quotes() -> usize {
    3
}

fn default_quote_max_chars() -> usize {
    200
}

fn default_percent_precision() -> u32 {
    1
}

impl Validate for ClusteringConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        match self.count {
            ClusterCount::Fixed { k } if k == 0 => errors.push(ValidationError::InvalidValue {
                field: "clustering.count.k".into(),
                reason: "must be at least 1".into(),
            }),
            ClusterCount::Auto { min, max } if min < 2 || max < min => {
                errors.push(ValidationError::Conflict {
                    reason: format!("clustering.count auto bounds must satisfy 2 <= min <= max (got {min}, {max})"),
                })
            }
            _ => {}
        }
        for (field, value) in [
            ("clustering.min_cluster_size", self.min_cluster_size),
            ("clustering.restarts", self.restarts),
            ("clustering.max_iterations", self.max_iterations),
            ("clustering.quote_max_chars", self.quote_max_chars),
        ] {
            if value == 0 {
                errors.push(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "must be at least 1".into(),
                });
            }
        }
        if self.percent_precision > 4 {
            errors.push(ValidationError::OutOfRange {
                field: "clustering.percent_precision".into(),
                value: f64::from(self.percent_precision),
                min: 0.0,
                max: 4.0,
            });
        }
        collect_errors(errors)
    }
}

// ============================================================================
// Demographics
// ============================================================================

/// Demographic aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemographicsConfig {
    /// Dimensions always reported, even when no opinion carries them
    #[serde(default = "default_recognized_dimensions")]
    pub recognized_dimensions: Vec<String>,
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        Self {
            recognized_dimensions: default_recognized_dimensions(),
        }
    }
}

fn default_recognized_dimensions() -> Vec<String> {
    ["age_range", "region", "employment_status", "income_bracket"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Validate for DemographicsConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.recognized_dimensions.iter().any(|d| d.trim().is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: "demographics.recognized_dimensions".into(),
                reason: "dimension names must not be blank".into(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Modeling
// ============================================================================

/// Scenario projection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelingConfig {
    #[serde(default)]
    pub horizons: HorizonYears,

    /// Fractional confidence lost per year past the short horizon
    #[serde(default = "default_confidence_decay")]
    pub confidence_decay_per_year: f64,

    #[serde(default = "presets::ubi_tracked_dimensions")]
    pub tracked_dimensions: Vec<TrackedDimension>,

    #[serde(default = "presets::ubi_parameter_ranges")]
    pub parameter_ranges: BTreeMap<String, ParameterRange>,

    #[serde(default = "presets::ubi_scenarios")]
    pub scenarios: Vec<ScenarioDefinition>,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            horizons: HorizonYears::default(),
            confidence_decay_per_year: default_confidence_decay(),
            tracked_dimensions: presets::ubi_tracked_dimensions(),
            parameter_ranges: presets::ubi_parameter_ranges(),
            scenarios: presets::ubi_scenarios(),
        }
    }
}

fn default_confidence_decay() -> f64 {
    0.05
}

impl Validate for ModelingConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        match self.horizons.validate() {
            Ok(()) => {}
            Err(ValidationError::Multiple(nested)) => errors.extend(nested),
            Err(e) => errors.push(e),
        }
        // Decay of exactly 1 would zero every confidence past the short horizon.
        if let Err(e) = check_range(
            "modeling.confidence_decay_per_year",
            self.confidence_decay_per_year,
            0.0,
            0.99,
        ) {
            errors.push(e);
        }
        if self.tracked_dimensions.is_empty() {
            errors.push(ValidationError::MissingField {
                field: "modeling.tracked_dimensions".into(),
            });
        }
        let mut seen = BTreeSet::new();
        for dim in &self.tracked_dimensions {
            if !seen.insert(dim.name.as_str()) {
                errors.push(ValidationError::Conflict {
                    reason: format!("tracked dimension '{}' is declared twice", dim.name),
                });
            }
        }
        for (name, range) in &self.parameter_ranges {
            if !(range.min.is_finite() && range.max.is_finite() && range.min <= range.max) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("modeling.parameter_ranges.{name}"),
                    reason: format!("min must not exceed max (got {}, {})", range.min, range.max),
                });
            } else if let Some(baseline) = range.baseline {
                if let Err(e) = check_range(
                    &format!("modeling.parameter_ranges.{name}.baseline"),
                    baseline,
                    range.min,
                    range.max,
                ) {
                    errors.push(e);
                }
            }
        }
        collect_errors(errors)
    }
}

/// Tradeoff analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeoffConfig {
    /// Horizon at which deltas are compared
    #[serde(default = "default_tradeoff_horizon")]
    pub horizon: Horizon,

    /// Tradeoffs kept per scenario
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub min_severity: f64,
}

impl Default for TradeoffConfig {
    fn default() -> Self {
        Self {
            horizon: default_tradeoff_horizon(),
            top_k: default_top_k(),
            min_severity: 0.0,
        }
    }
}

fn default_tradeoff_horizon() -> Horizon {
    Horizon::Long
}

fn default_top_k() -> usize {
    5
}

impl Validate for TradeoffConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.min_severity.is_finite() && self.min_severity >= 0.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidValue {
                field: "tradeoffs.min_severity".into(),
                reason: "must be a non-negative number".into(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_defaults_validate() {
        let config = InsightConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topic, "universal basic income");
        assert_eq!(config.clustering.count, ClusterCount::Fixed { k: 4 });
        assert_eq!(config.modeling.scenarios.len(), 3);
    }

    #[test]
    fn test_empty_directory_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_modular_config(Some(dir.path().to_path_buf()), CONFIG_FILES).unwrap();
        let config: InsightConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.clustering.seed, 42);
        assert_eq!(config.tradeoffs.top_k, 5);
    }

    #[test]
    fn test_scenarios_file_overrides_insight_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("insight.json"),
            r#"{"topic": "housing", "clustering": {"seed": 7, "count": {"mode": "auto", "min": 2, "max": 5}}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("scenarios.json"),
            r#"{"modeling": {"confidence_decay_per_year": 0.1}, "clustering": {"restarts": 3}}"#,
        )
        .unwrap();

        let value = load_modular_config(Some(dir.path().to_path_buf()), CONFIG_FILES).unwrap();
        let config: InsightConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config.topic, "housing");
        assert_eq!(config.clustering.seed, 7);
        assert_eq!(config.clustering.restarts, 3);
        assert_eq!(config.clustering.count, ClusterCount::Auto { min: 2, max: 5 });
        assert_eq!(config.modeling.confidence_decay_per_year, 0.1);
        assert_eq!(config.modeling.scenarios.len(), 3);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("AGORA_CLUSTER_SEED", "1234"), ("AGORA_TOP_K", "2"), ("AGORA_LOG_FORMAT", "json")]);
        let mut config = InsightConfig::default();
        config
            .apply_env_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.clustering.seed, 1234);
        assert_eq!(config.tradeoffs.top_k, 2);
        assert_eq!(config.observability.log_format, "json");
    }

    #[test]
    fn test_bad_env_override_is_config_error() {
        let mut config = InsightConfig::default();
        let err = config
            .apply_env_overrides_from(|k| (k == "AGORA_TOP_K").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalid_sections_are_collected() {
        let mut config = InsightConfig::default();
        config.duplicates.warning_threshold = 1.5;
        config.clustering.count = ClusterCount::Auto { min: 5, max: 3 };
        config.modeling.horizons.medium = 10.0;
        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_lexicon_is_validated_with_config() {
        let mut config = InsightConfig::default();
        config.lexicon.intensity.gain = -2.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("lexicon.intensity.gain"));
    }
}
