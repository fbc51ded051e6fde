//! Growth curves, horizons and the per-dimension projection formula.
//!
//! A projection is `base_effect · scale · ramp(t) · curve(t)`. The scale
//! comes from the scenario parameters, the ramp models a gradual phase-in,
//! and the curve models how the effect evolves once the policy is fully in
//! place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::scenario::{DimensionModel, ParameterRange};
use agora_common::validation::{check_range_exclusive_min, collect_errors};
use agora_common::{Validate, ValidationError, ValidationResult};

/// Shape of an effect over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthCurve {
    /// `rate · t`
    Linear,
    /// `ln(1 + rate · t)`
    Logarithmic,
    /// `1 − e^(−rate · t)`
    Saturating,
    /// `e^(−rate · t)`
    Decay,
}

impl GrowthCurve {
    /// Curve multiplier at `years`.
    pub fn factor(self, rate: f64, years: f64) -> f64 {
        match self {
            Self::Linear => rate * years,
            Self::Logarithmic => (rate * years).ln_1p(),
            Self::Saturating => 1.0 - (-rate * years).exp(),
            Self::Decay => (-rate * years).exp(),
        }
    }

    /// Whether the magnitude never shrinks as time advances.
    pub fn is_cumulative(self) -> bool {
        !matches!(self, Self::Decay)
    }
}

impl std::fmt::Display for GrowthCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Logarithmic => write!(f, "logarithmic"),
            Self::Saturating => write!(f, "saturating"),
            Self::Decay => write!(f, "decay"),
        }
    }
}

/// A projection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Short,
    Medium,
    Long,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Self::Short, Self::Medium, Self::Long];
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short-term"),
            Self::Medium => write!(f, "medium-term"),
            Self::Long => write!(f, "long-term"),
        }
    }
}

/// Horizon positions in years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonYears {
    #[serde(default = "default_short")]
    pub short: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_long")]
    pub long: f64,
}

impl Default for HorizonYears {
    fn default() -> Self {
        Self {
            short: default_short(),
            medium: default_medium(),
            long: default_long(),
        }
    }
}

fn default_short() -> f64 {
    1.5
}

fn default_medium() -> f64 {
    4.0
}

fn default_long() -> f64 {
    7.5
}

impl HorizonYears {
    pub fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::Short => self.short,
            Horizon::Medium => self.medium,
            Horizon::Long => self.long,
        }
    }
}

impl Validate for HorizonYears {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        for (field, years) in [
            ("modeling.horizons.short", self.short),
            ("modeling.horizons.medium", self.medium),
            ("modeling.horizons.long", self.long),
        ] {
            if let Err(e) = check_range_exclusive_min(field, years, 0.0, 100.0) {
                errors.push(e);
            }
        }
        if !(self.short < self.medium && self.medium < self.long) {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "horizons must be strictly increasing (got {}, {}, {})",
                    self.short, self.medium, self.long
                ),
            });
        }
        collect_errors(errors)
    }
}

/// One value per horizon.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HorizonValues {
    pub short_term: f64,
    pub medium_term: f64,
    pub long_term: f64,
}

impl HorizonValues {
    pub fn from_fn(mut f: impl FnMut(Horizon) -> f64) -> Self {
        Self {
            short_term: f(Horizon::Short),
            medium_term: f(Horizon::Medium),
            long_term: f(Horizon::Long),
        }
    }

    pub fn get(&self, horizon: Horizon) -> f64 {
        match horizon {
            Horizon::Short => self.short_term,
            Horizon::Medium => self.medium_term,
            Horizon::Long => self.long_term,
        }
    }
}

/// Phase-in multiplier: rises linearly to 1 over `phase_in_years`.
pub fn phase_in_ramp(phase_in_years: f64, years: f64) -> f64 {
    if phase_in_years <= 0.0 {
        1.0
    } else {
        (years / phase_in_years).clamp(0.0, 1.0)
    }
}

/// Multiplier applied to a model's base effect by the scenario parameters.
///
/// `1 + Σ sensitivity · (value − baseline)` over the model's sensitivities,
/// floored at 0. A parameter the scenario leaves unset sits at its
/// baseline, so base effects are read as calibrated at the baselines.
pub fn parameter_scale(
    model: &DimensionModel,
    parameters: &BTreeMap<String, f64>,
    ranges: &BTreeMap<String, ParameterRange>,
) -> f64 {
    let shift: f64 = model
        .sensitivities
        .iter()
        .filter_map(|(name, sensitivity)| {
            let baseline = ranges.get(name)?.reference();
            let value = parameters.get(name).copied().unwrap_or(baseline);
            Some(sensitivity * (value - baseline))
        })
        .sum();
    (1.0 + shift).max(0.0)
}

/// Projected effect of one dimension at `years`, as a fraction.
pub fn project_effect(model: &DimensionModel, scale: f64, phase_in_years: f64, years: f64) -> f64 {
    model.base_effect
        * scale
        * phase_in_ramp(phase_in_years, years)
        * model.curve.factor(model.rate, years)
}

/// Confidence at `years`, decayed geometrically from the short horizon.
pub fn horizon_confidence(
    declared: f64,
    decay_per_year: f64,
    years: f64,
    short_years: f64,
) -> f64 {
    let elapsed = (years - short_years).max(0.0);
    declared * (1.0 - decay_per_year).powf(elapsed)
}
