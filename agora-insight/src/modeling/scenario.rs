//! Scenario definitions, validation and projection.
//!
//! A scenario is a declared, falsifiable assumption set: every number used
//! in a projection is visible in its definition. Definitions are validated
//! as a whole before anything is projected, so a bad value never produces a
//! partial report.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::projection::{
    horizon_confidence, parameter_scale, project_effect, GrowthCurve, HorizonValues, HorizonYears,
};
use crate::config::ModelingConfig;
use crate::error::{InsightError, InsightResult};
use agora_common::util::round_to;
use agora_common::validation::{check_range, check_range_exclusive_min, collect_errors};
use agora_common::ValidationError;

/// Decimal places of every published percentage.
pub const PERCENT_DECIMALS: u32 = 2;

// ============================================================================
// Definitions
// ============================================================================

/// Whether an increase in a dimension is desirable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// A measurable outcome every scenario must model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDimension {
    pub name: String,
    pub polarity: Polarity,
    #[serde(default)]
    pub description: String,
}

/// Declared valid interval of a scenario parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    /// Level at which base effects are calibrated (default: `min`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
}

impl ParameterRange {
    /// Calibration point used by parameter sensitivities.
    pub fn reference(&self) -> f64 {
        self.baseline.unwrap_or(self.min)
    }
}

/// Parametric model of one dimension within one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionModel {
    /// Effect size as a fraction, in [-1, 1]
    pub base_effect: f64,
    /// Shape of the effect over time
    #[serde(alias = "growth_curve")]
    pub curve: GrowthCurve,
    /// Curve rate, in (0, 10]
    pub rate: f64,
    /// Declared confidence, in (0, 1]
    pub confidence: f64,
    /// Dimension-specific assumptions
    #[serde(default)]
    pub assumptions: Vec<String>,
    /// Relative change of the effect per unit of parameter above its baseline
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sensitivities: BTreeMap<String, f64>,
}

/// A named assumption set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub phase_in_years: f64,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    /// One model per tracked dimension
    pub dimensions: BTreeMap<String, DimensionModel>,
}

// ============================================================================
// Projected Output
// ============================================================================

/// Projected trajectory of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub dimension: String,
    pub curve: GrowthCurve,
    /// Percent change at the short horizon
    pub short_term: f64,
    /// Percent change at the medium horizon
    pub medium_term: f64,
    /// Percent change at the long horizon
    pub long_term: f64,
    /// Declared confidence, percent
    pub confidence: f64,
    /// Multiplier the scenario parameters applied to the base effect
    #[serde(default = "unit_scale")]
    pub parameter_scale: f64,
    /// Confidence after horizon decay, percent
    pub horizon_confidence: HorizonValues,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub assumptions: Vec<String>,
}

fn unit_scale() -> f64 {
    1.0
}

impl Trajectory {
    pub fn values(&self) -> HorizonValues {
        HorizonValues {
            short_term: self.short_term,
            medium_term: self.medium_term,
            long_term: self.long_term,
        }
    }
}

/// A projected scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub assumptions: Vec<String>,
    pub phase_in_years: f64,
    pub parameters: BTreeMap<String, f64>,
    /// In tracked-dimension order
    pub trajectories: Vec<Trajectory>,
}

impl Scenario {
    pub fn trajectory(&self, dimension: &str) -> Option<&Trajectory> {
        self.trajectories.iter().find(|t| t.dimension == dimension)
    }
}

// ============================================================================
// Validated Set
// ============================================================================

/// Scenario definitions that passed validation, ready to project.
#[derive(Debug, Clone)]
pub struct ScenarioSet {
    tracked: Vec<TrackedDimension>,
    horizons: HorizonYears,
    confidence_decay_per_year: f64,
    parameter_ranges: BTreeMap<String, ParameterRange>,
    definitions: Vec<ScenarioDefinition>,
}

fn scenario_scope(name: &str) -> String {
    format!("scenario '{name}'")
}

/// Check one definition against the tracked set and declared ranges.
pub fn validate_definition(
    definition: &ScenarioDefinition,
    tracked: &[TrackedDimension],
    ranges: &BTreeMap<String, ParameterRange>,
) -> InsightResult<()> {
    let scope = scenario_scope(&definition.name);

    for dim in tracked {
        if !definition.dimensions.contains_key(&dim.name) {
            return Err(InsightError::configuration(
                scope,
                format!("missing model for tracked dimension '{}'", dim.name),
            ));
        }
    }
    for name in definition.dimensions.keys() {
        if !tracked.iter().any(|d| &d.name == name) {
            return Err(InsightError::configuration(
                scope,
                format!("models untracked dimension '{name}'"),
            ));
        }
    }

    let mut errors = Vec::new();
    if let Err(e) = check_range("phase_in_years", definition.phase_in_years, 0.0, 10.0) {
        errors.push(e);
    }

    for (param, value) in &definition.parameters {
        let field = format!("parameters.{param}");
        match ranges.get(param) {
            Some(range) => {
                if let Err(e) = check_range(&field, *value, range.min, range.max) {
                    errors.push(e);
                }
            }
            None => errors.push(ValidationError::InvalidValue {
                field,
                reason: "parameter is not declared in the parameter range table".into(),
            }),
        }
    }

    for (name, model) in &definition.dimensions {
        let checks = [
            check_range(
                &format!("dimensions.{name}.base_effect"),
                model.base_effect,
                -1.0,
                1.0,
            ),
            check_range_exclusive_min(&format!("dimensions.{name}.rate"), model.rate, 0.0, 10.0),
            check_range_exclusive_min(
                &format!("dimensions.{name}.confidence"),
                model.confidence,
                0.0,
                1.0,
            ),
        ];
        errors.extend(checks.into_iter().filter_map(Result::err));

        for (param, sensitivity) in &model.sensitivities {
            let field = format!("dimensions.{name}.sensitivities.{param}");
            if !ranges.contains_key(param) {
                errors.push(ValidationError::InvalidValue {
                    field,
                    reason: "parameter is not declared in the parameter range table".into(),
                });
            } else if let Err(e) = check_range(&field, *sensitivity, -10.0, 10.0) {
                errors.push(e);
            }
        }
    }

    collect_errors(errors).map_err(|source| InsightError::Validation {
        scenario: definition.name.clone(),
        source,
    })
}

impl ScenarioSet {
    /// Validate every definition up front.
    ///
    /// Fails on the first scenario that is inconsistent with the tracked
    /// dimensions or carries an out-of-range value; nothing is projected
    /// until the whole set is known to be valid.
    pub fn from_config(config: &ModelingConfig) -> InsightResult<Self> {
        if config.scenarios.is_empty() {
            return Err(InsightError::configuration(
                "modeling.scenarios",
                "at least one scenario is required",
            ));
        }

        let mut seen = BTreeSet::new();
        for definition in &config.scenarios {
            if !seen.insert(definition.name.as_str()) {
                return Err(InsightError::configuration(
                    scenario_scope(&definition.name),
                    "duplicate scenario name",
                ));
            }
            validate_definition(definition, &config.tracked_dimensions, &config.parameter_ranges)?;
        }

        debug!(count = config.scenarios.len(), "Scenario definitions validated");

        Ok(Self {
            tracked: config.tracked_dimensions.clone(),
            horizons: config.horizons.clone(),
            confidence_decay_per_year: config.confidence_decay_per_year,
            parameter_ranges: config.parameter_ranges.clone(),
            definitions: config.scenarios.clone(),
        })
    }

    pub fn tracked(&self) -> &[TrackedDimension] {
        &self.tracked
    }

    pub fn horizons(&self) -> &HorizonYears {
        &self.horizons
    }

    pub fn definitions(&self) -> &[ScenarioDefinition] {
        &self.definitions
    }

    /// Project every scenario, in configured order.
    pub fn project(&self) -> Vec<Scenario> {
        let scenarios: Vec<Scenario> = self.definitions.iter().map(|d| self.project_one(d)).collect();
        info!(count = scenarios.len(), "Scenarios projected");
        scenarios
    }

    fn project_one(&self, definition: &ScenarioDefinition) -> Scenario {
        let trajectories = self
            .tracked
            .iter()
            .filter_map(|dim| {
                definition
                    .dimensions
                    .get(&dim.name)
                    .map(|model| self.trajectory(&dim.name, model, definition))
            })
            .collect();

        Scenario {
            name: definition.name.clone(),
            description: definition.description.clone(),
            assumptions: definition.assumptions.clone(),
            phase_in_years: definition.phase_in_years,
            parameters: definition.parameters.clone(),
            trajectories,
        }
    }

    fn trajectory(&self, dimension: &str, model: &DimensionModel, definition: &ScenarioDefinition) -> Trajectory {
        let percent = |fraction: f64| round_to(fraction * 100.0, PERCENT_DECIMALS);
        let scale = parameter_scale(model, &definition.parameters, &self.parameter_ranges);
        let values = HorizonValues::from_fn(|h| {
            percent(project_effect(model, scale, definition.phase_in_years, self.horizons.get(h)))
        });
        let confidence = HorizonValues::from_fn(|h| {
            percent(horizon_confidence(
                model.confidence,
                self.confidence_decay_per_year,
                self.horizons.get(h),
                self.horizons.short,
            ))
        });

        Trajectory {
            dimension: dimension.to_string(),
            curve: model.curve,
            short_term: values.short_term,
            medium_term: values.medium_term,
            long_term: values.long_term,
            confidence: percent(model.confidence),
            parameter_scale: round_to(scale, 4),
            horizon_confidence: confidence,
            assumptions: model.assumptions.clone(),
        }
    }
}
