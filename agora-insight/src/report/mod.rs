//! The analytical report and its serialized forms.
//!
//! The `Report` itself is a pure function of input and configuration: it
//! carries no timestamps, so its canonical JSON (and therefore its digest)
//! is byte-identical across runs. Generation time lives only in the
//! [`ReportEnvelope`].

pub mod markdown;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modeling::{Scenario, Tradeoff};
use crate::processing::{BiasWarning, Cluster, DemographicSentiment, DuplicateReport};
use agora_common::util::sha256_hex;

pub use markdown::{render_report, render_scenarios};

/// A projected scenario together with its tradeoffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    #[serde(flatten)]
    pub scenario: Scenario,
    /// Descending severity, truncated to the configured top-K
    pub tradeoffs: Vec<Tradeoff>,
}

/// How the report was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Methodology {
    /// Seed used for clustering
    pub seed: u64,
    /// Requested cluster count, as configured
    pub requested_clusters: String,
    /// Clusters actually produced
    pub cluster_count: usize,
    /// Mean silhouette of the chosen clustering
    pub silhouette: Option<f64>,
    /// Human-readable notes, including any local recoveries
    pub notes: Vec<String>,
}

/// The complete analysis of one opinion set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub topic: String,
    pub total_opinions: usize,
    pub duplicates: DuplicateReport,
    pub bias_warnings: Vec<BiasWarning>,
    /// Descending size, ties by ascending id
    pub clusters: Vec<Cluster>,
    pub demographic_sentiment: DemographicSentiment,
    /// In configured order
    pub scenarios: Vec<ScenarioReport>,
    pub methodology: Methodology,
}

impl Report {
    /// Canonical JSON: field order follows the struct, maps are sorted.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the canonical JSON.
    pub fn digest(&self) -> serde_json::Result<String> {
        Ok(sha256_hex(self.to_json()?.as_bytes()))
    }
}

/// Output wrapper adding generation metadata around a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEnvelope<'a, T: Serialize> {
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the canonical JSON of `report`
    pub digest: String,
    pub report: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    /// Wrap `report`, computing its digest.
    pub fn new(report: &'a T, generated_at: DateTime<Utc>) -> serde_json::Result<Self> {
        let canonical = serde_json::to_string_pretty(report)?;
        Ok(Self {
            generated_at,
            digest: sha256_hex(canonical.as_bytes()),
            report,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn empty_report() -> Report {
        Report {
            topic: "test".into(),
            total_opinions: 0,
            duplicates: DuplicateReport {
                duplicate_count: 0,
                total_count: 0,
                ratio: 0.0,
                ratio_percent: 0,
                warning_triggered: false,
                groups: Vec::new(),
            },
            bias_warnings: Vec::new(),
            clusters: Vec::new(),
            demographic_sentiment: DemographicSentiment::new(),
            scenarios: Vec::new(),
            methodology: Methodology {
                seed: 42,
                requested_clusters: "fixed k=4".into(),
                cluster_count: 0,
                silhouette: None,
                notes: Vec::new(),
            },
        }
    }

    #[test]
    fn test_digest_matches_envelope() {
        let report = empty_report();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let envelope = ReportEnvelope::new(&report, at).unwrap();
        assert_eq!(envelope.digest, report.digest().unwrap());
        assert_eq!(envelope.digest.len(), 64);

        let json = envelope.to_json().unwrap();
        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"topic\": \"test\""));
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = empty_report();
        let mut b = empty_report();
        b.topic = "other".into();
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
    }

    #[test]
    fn test_report_json_round_trips() {
        let report = empty_report();
        let parsed: Report = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(parsed, report);
    }
}
