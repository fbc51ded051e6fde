//! Default dimension models and scenarios for the UBI pilot.
//!
//! Every number here is an estimate that is meant to be declared,
//! challenged and refined. Deployments override these through
//! `scenarios.json`.

use std::collections::BTreeMap;

use super::projection::GrowthCurve;
use super::scenario::{DimensionModel, ParameterRange, Polarity, ScenarioDefinition, TrackedDimension};

/// Topic of the default configuration.
pub const UBI_TOPIC: &str = "universal basic income";

/// Share of complementary reforms enacted, 0 to 1.
pub const REFORM_COMPLETENESS: &str = "reform_completeness";

/// Payment level as a multiple of the poverty line.
pub const BENEFIT_LEVEL: &str = "benefit_level";

fn tracked(name: &str, polarity: Polarity, description: &str) -> TrackedDimension {
    TrackedDimension {
        name: name.to_string(),
        polarity,
        description: description.to_string(),
    }
}

/// Outcomes every UBI scenario models.
pub fn ubi_tracked_dimensions() -> Vec<TrackedDimension> {
    vec![
        tracked("poverty_rate", Polarity::LowerIsBetter, "Share of population below the poverty line"),
        tracked(
            "labor_force_participation",
            Polarity::HigherIsBetter,
            "Share of working-age population in the labor force",
        ),
        tracked("inflation", Polarity::LowerIsBetter, "Consumer price growth"),
        tracked("entrepreneurship_rate", Polarity::HigherIsBetter, "New business formation"),
        tracked("fiscal_cost_gdp_share", Polarity::LowerIsBetter, "Net program cost as a share of GDP"),
        tracked(
            "mental_health_improvement",
            Polarity::HigherIsBetter,
            "Self-reported wellbeing and reduced financial stress",
        ),
    ]
}

/// Declared ranges for scenario parameters.
///
/// Baselines are the base-case levels every preset effect size is
/// calibrated at.
pub fn ubi_parameter_ranges() -> BTreeMap<String, ParameterRange> {
    BTreeMap::from([
        // Share of complementary reforms (retraining, monetary coordination) enacted.
        (
            REFORM_COMPLETENESS.to_string(),
            ParameterRange { min: 0.0, max: 1.0, baseline: Some(0.5) },
        ),
        // Payment level as a multiple of the poverty line.
        (
            BENEFIT_LEVEL.to_string(),
            ParameterRange { min: 0.0, max: 2.0, baseline: Some(0.75) },
        ),
    ])
}

fn model(
    base_effect: f64,
    curve: GrowthCurve,
    rate: f64,
    confidence: f64,
    assumptions: &[&str],
) -> DimensionModel {
    DimensionModel {
        base_effect,
        curve,
        rate,
        confidence,
        assumptions: assumptions.iter().map(|s| s.to_string()).collect(),
        sensitivities: BTreeMap::new(),
    }
}

/// Per-dimension response to the benefit level and to reform completeness.
fn sensitivities(dimension: &str) -> [(&'static str, f64); 2] {
    let (benefit, reform) = match dimension {
        "poverty_rate" => (0.8, 0.2),
        // Retraining offsets the participation drop.
        "labor_force_participation" => (0.6, -0.6),
        // Monetary coordination dampens price pressure.
        "inflation" => (0.5, -0.4),
        "entrepreneurship_rate" => (0.3, 0.3),
        "fiscal_cost_gdp_share" => (1.0, -0.2),
        "mental_health_improvement" => (0.4, 0.0),
        _ => (0.0, 0.0),
    };
    [(BENEFIT_LEVEL, benefit), (REFORM_COMPLETENESS, reform)]
}

fn poverty_rate() -> DimensionModel {
    model(
        -0.08,
        GrowthCurve::Logarithmic,
        0.8,
        0.65,
        &["UBI set at national poverty-line level", "No clawback from existing means-tested benefits"],
    )
}

fn labor_force_participation() -> DimensionModel {
    model(
        -0.02,
        GrowthCurve::Decay,
        0.3,
        0.45,
        &["Based on Finland/Stockton pilot findings", "Assumes voluntary participation in labor market"],
    )
}

fn inflation() -> DimensionModel {
    model(
        0.03,
        GrowthCurve::Decay,
        0.5,
        0.40,
        &["Central bank maintains current monetary policy", "No concurrent supply-side reforms"],
    )
}

fn entrepreneurship_rate() -> DimensionModel {
    model(
        0.04,
        GrowthCurve::Logarithmic,
        0.6,
        0.50,
        &["UBI provides safety net for risk-taking", "No changes to business regulation"],
    )
}

fn fiscal_cost() -> DimensionModel {
    model(
        0.05,
        GrowthCurve::Linear,
        0.2,
        0.60,
        &[
            "Funded by broad-based taxation",
            "Administrative savings from replacing means-tested programs",
        ],
    )
}

fn mental_health() -> DimensionModel {
    model(
        0.06,
        GrowthCurve::Logarithmic,
        0.7,
        0.55,
        &[
            "Based on Manitoba Mincome and Finnish pilot data",
            "Reduction in financial stress as primary mechanism",
        ],
    )
}

fn definition(
    name: &str,
    description: &str,
    assumptions: &[&str],
    phase_in_years: f64,
    parameters: [(&str, f64); 2],
    dimensions: [(&str, DimensionModel); 6],
) -> ScenarioDefinition {
    ScenarioDefinition {
        name: name.to_string(),
        description: description.to_string(),
        assumptions: assumptions.iter().map(|s| s.to_string()).collect(),
        phase_in_years,
        parameters: parameters
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        dimensions: dimensions
            .into_iter()
            .map(|(k, mut model)| {
                model.sensitivities = sensitivities(k)
                    .into_iter()
                    .filter(|(_, s)| *s != 0.0)
                    .map(|(p, s)| (p.to_string(), s))
                    .collect();
                (k.to_string(), model)
            })
            .collect(),
    }
}

/// The three UBI scenarios, in report order.
pub fn ubi_scenarios() -> Vec<ScenarioDefinition> {
    vec![
        definition(
            "Optimistic",
            "UBI implemented with complementary reforms (education investment, job retraining). \
             Inflation managed through monetary policy. Strong poverty reduction with moderate fiscal cost.",
            &[
                "Complementary education and retraining investment",
                "Active monetary policy management",
                "Gradual phase-in over 2 years",
                "UBI set at poverty-line level",
            ],
            2.0,
            [(REFORM_COMPLETENESS, 1.0), (BENEFIT_LEVEL, 1.0)],
            [
                ("poverty_rate", poverty_rate()),
                ("labor_force_participation", model(-0.01, GrowthCurve::Decay, 0.5, 0.50, &[])),
                ("inflation", model(0.02, GrowthCurve::Decay, 0.7, 0.45, &[])),
                ("entrepreneurship_rate", entrepreneurship_rate()),
                ("fiscal_cost_gdp_share", model(0.04, GrowthCurve::Linear, 0.15, 0.55, &[])),
                ("mental_health_improvement", mental_health()),
            ],
        ),
        definition(
            "Moderate (base case)",
            "UBI at a modest level with partial reform. Mixed effects: clear poverty reduction, \
             small labor market shifts, manageable inflation.",
            &[
                "Partial complementary reforms",
                "Standard monetary policy",
                "Phase-in over 3 years",
                "UBI set at 75% of poverty-line level",
            ],
            3.0,
            [(REFORM_COMPLETENESS, 0.5), (BENEFIT_LEVEL, 0.75)],
            [
                ("poverty_rate", poverty_rate()),
                ("labor_force_participation", labor_force_participation()),
                ("inflation", inflation()),
                ("entrepreneurship_rate", entrepreneurship_rate()),
                ("fiscal_cost_gdp_share", fiscal_cost()),
                ("mental_health_improvement", mental_health()),
            ],
        ),
        definition(
            "Pessimistic",
            "UBI implemented without complementary reforms. Inflation erodes purchasing power. \
             Labor participation drops significantly. Fiscal cost grows unsustainably.",
            &[
                "No complementary policy reforms",
                "Loose monetary policy",
                "Immediate full implementation",
                "UBI set above poverty-line level",
            ],
            0.0,
            [(REFORM_COMPLETENESS, 0.0), (BENEFIT_LEVEL, 1.25)],
            [
                ("poverty_rate", model(-0.04, GrowthCurve::Logarithmic, 0.5, 0.50, &[])),
                ("labor_force_participation", model(-0.05, GrowthCurve::Logarithmic, 0.4, 0.40, &[])),
                ("inflation", model(0.06, GrowthCurve::Logarithmic, 0.8, 0.35, &[])),
                ("entrepreneurship_rate", model(0.02, GrowthCurve::Decay, 0.3, 0.35, &[])),
                ("fiscal_cost_gdp_share", model(0.08, GrowthCurve::Linear, 0.3, 0.50, &[])),
                ("mental_health_improvement", model(0.03, GrowthCurve::Decay, 0.4, 0.40, &[])),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scenario_models_every_tracked_dimension() {
        let tracked = ubi_tracked_dimensions();
        for scenario in ubi_scenarios() {
            assert_eq!(scenario.dimensions.len(), tracked.len(), "{}", scenario.name);
            for dim in &tracked {
                assert!(scenario.dimensions.contains_key(&dim.name), "{} lacks {}", scenario.name, dim.name);
            }
        }
    }

    #[test]
    fn test_polarity_table() {
        let tracked = ubi_tracked_dimensions();
        let polarity = |name: &str| tracked.iter().find(|d| d.name == name).map(|d| d.polarity);
        assert_eq!(polarity("poverty_rate"), Some(Polarity::LowerIsBetter));
        assert_eq!(polarity("inflation"), Some(Polarity::LowerIsBetter));
        assert_eq!(polarity("fiscal_cost_gdp_share"), Some(Polarity::LowerIsBetter));
        assert_eq!(polarity("labor_force_participation"), Some(Polarity::HigherIsBetter));
        assert_eq!(polarity("entrepreneurship_rate"), Some(Polarity::HigherIsBetter));
        assert_eq!(polarity("mental_health_improvement"), Some(Polarity::HigherIsBetter));
    }
}
