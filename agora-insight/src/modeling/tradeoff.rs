//! Tradeoff detection between projected dimensions.
//!
//! A tradeoff exists when, at the analysis horizon, one dimension moves in
//! its desirable direction while another moves in its undesirable one.
//! Desirability comes from the polarity table, never from the sign of the
//! delta alone: a falling poverty rate is an improvement.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use super::projection::Horizon;
use super::scenario::{Polarity, Scenario, TrackedDimension};
use crate::config::TradeoffConfig;
use agora_common::util::round_to;

/// Decimal places kept on severities.
pub const SEVERITY_DECIMALS: u32 = 4;

/// How a dimension moves relative to its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Improving,
    Worsening,
    Unchanged,
}

impl Direction {
    /// Classify a signed delta under a polarity.
    pub fn classify(delta: f64, polarity: Polarity) -> Self {
        if delta == 0.0 {
            return Self::Unchanged;
        }
        match (delta > 0.0, polarity) {
            (true, Polarity::HigherIsBetter) | (false, Polarity::LowerIsBetter) => Self::Improving,
            _ => Self::Worsening,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Improving => "improves",
            Self::Worsening => "worsens",
            Self::Unchanged => "is unchanged",
        }
    }
}

/// A conflicting pair of dimensions within one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradeoff {
    /// Lexically smaller dimension name
    pub dimension_a: String,
    pub dimension_b: String,
    pub horizon: Horizon,
    /// Percent change of `dimension_a` at the horizon
    pub delta_a: f64,
    /// Percent change of `dimension_b` at the horizon
    pub delta_b: f64,
    pub direction_a: Direction,
    pub direction_b: Direction,
    /// Harmonic mean of confidence-weighted magnitudes
    pub severity: f64,
    pub description: String,
}

/// Harmonic mean of two non-negative weights, zero if either is zero.
fn harmonic_mean(x: f64, y: f64) -> f64 {
    if x <= 0.0 || y <= 0.0 {
        0.0
    } else {
        2.0 * x * y / (x + y)
    }
}

struct Movement<'a> {
    name: &'a str,
    delta: f64,
    direction: Direction,
    weight: f64,
}

/// Find every improving/worsening pair in a projected scenario.
///
/// Output is ordered by descending severity, then by `(dimension_a,
/// dimension_b)`, and truncated to `top_k`.
pub fn analyze_tradeoffs(
    scenario: &Scenario,
    tracked: &[TrackedDimension],
    config: &TradeoffConfig,
) -> Vec<Tradeoff> {
    let polarity: BTreeMap<&str, Polarity> =
        tracked.iter().map(|d| (d.name.as_str(), d.polarity)).collect();

    let mut movements: Vec<Movement<'_>> = scenario
        .trajectories
        .iter()
        .filter_map(|t| {
            let polarity = *polarity.get(t.dimension.as_str())?;
            let delta = t.values().get(config.horizon);
            let confidence = t.horizon_confidence.get(config.horizon);
            Some(Movement {
                name: &t.dimension,
                delta,
                direction: Direction::classify(delta, polarity),
                weight: (delta.abs() / 100.0) * (confidence / 100.0),
            })
        })
        .collect();
    movements.sort_by(|a, b| a.name.cmp(b.name));

    let mut tradeoffs = Vec::new();
    for (i, a) in movements.iter().enumerate() {
        for b in &movements[i + 1..] {
            let conflicting = matches!(
                (a.direction, b.direction),
                (Direction::Improving, Direction::Worsening)
                    | (Direction::Worsening, Direction::Improving)
            );
            if !conflicting {
                continue;
            }
            let severity = round_to(harmonic_mean(a.weight, b.weight), SEVERITY_DECIMALS);
            if severity < config.min_severity {
                continue;
            }
            tradeoffs.push(Tradeoff {
                dimension_a: a.name.to_string(),
                dimension_b: b.name.to_string(),
                horizon: config.horizon,
                delta_a: a.delta,
                delta_b: b.delta,
                direction_a: a.direction,
                direction_b: b.direction,
                severity,
                description: format!(
                    "{} {} ({:+.2}%) while {} {} ({:+.2}%)",
                    a.name,
                    a.direction.verb(),
                    a.delta,
                    b.name,
                    b.direction.verb(),
                    b.delta
                ),
            });
        }
    }

    tradeoffs.sort_by(|x, y| {
        y.severity
            .partial_cmp(&x.severity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| x.dimension_a.cmp(&y.dimension_a))
            .then_with(|| x.dimension_b.cmp(&y.dimension_b))
    });
    tradeoffs.truncate(config.top_k);

    debug!(
        scenario = %scenario.name,
        count = tradeoffs.len(),
        "Tradeoffs analyzed"
    );
    tradeoffs
}
