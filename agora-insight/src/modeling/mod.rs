//! Scenario modeling: parametric projections and tradeoff detection.
//!
//! This branch has no dependency on the opinion set and runs concurrently
//! with clustering.

pub mod presets;
pub mod projection;
pub mod scenario;
pub mod tradeoff;

pub use projection::{GrowthCurve, Horizon, HorizonValues, HorizonYears};
pub use scenario::{
    DimensionModel, ParameterRange, Polarity, Scenario, ScenarioDefinition, ScenarioSet,
    TrackedDimension, Trajectory,
};
pub use tradeoff::{analyze_tradeoffs, Direction, Tradeoff};
