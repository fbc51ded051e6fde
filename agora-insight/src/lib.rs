//! Agora Insight Library
//!
//! Turns anonymized opinion statements on a policy question into an
//! auditable report: opinion clusters with stance, sentiment and
//! demographic breakdowns, a duplicate/bot-activity signal, and declared
//! policy-consequence scenarios with explicit tradeoffs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        agora-insight (core)                          │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐     │
//! │  │  Duplicate /    │  │  Sentiment      │  │  Embedder +     │     │
//! │  │  Bias Detector  │  │  Scorer (par)   │  │  Seeded K-Means │     │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘     │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐     │
//! │  │  Demographic    │  │  Scenario       │  │  Tradeoff       │     │
//! │  │  Aggregator     │  │  Projector      │  │  Analyzer       │     │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘     │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │           Report (canonical JSON + SHA-256 digest, Markdown)         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Determinism
//! - Scoring is a pure function of text and lexicon
//! - Clustering is seeded; ties resolve toward lower indices
//! - Reports contain no timestamps, so identical input and configuration
//!   produce byte-identical JSON and the same digest
//!
//! ## Scenarios
//! - Every projection is `base_effect · scale · ramp(t) · curve(t)`, where
//!   `scale` follows the scenario's declared parameters; nothing is
//!   inferred from data
//! - Tradeoffs use an explicit polarity table per dimension
//!
//! # Example
//!
//! ```no_run
//! use agora_insight::{InsightConfig, InsightEngine, Opinion};
//!
//! let engine = InsightEngine::new(InsightConfig::default())?;
//! let report = engine.analyze(&[Opinion::new("We need UBI now")])?;
//! println!("{}", report.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod demo;
pub mod error;
pub mod modeling;
pub mod opinion;
pub mod pipeline;
pub mod processing;
pub mod report;

pub use config::InsightConfig;
pub use error::{InsightError, InsightResult};
pub use opinion::{DeclaredStance, Opinion, ProvenanceSource, StanceLabel};
pub use pipeline::{AbortSignal, InsightEngine};
pub use report::{Report, ReportEnvelope, ScenarioReport};
