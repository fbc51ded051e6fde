//! Opinion records as delivered by the input layer.
//!
//! Opinions arrive already anonymized and opt-in verified. The core never
//! mutates them; every derived value (scores, labels, cluster membership) is
//! kept alongside, keyed by the opinion's position in the input sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category used whenever a demographic field is missing or blank.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Where an opinion was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProvenanceSource {
    Reddit,
    Twitter,
    #[default]
    Survey,
    Assembly,
    Api,
}

impl std::fmt::Display for ProvenanceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reddit => write!(f, "reddit"),
            Self::Twitter => write!(f, "twitter"),
            Self::Survey => write!(f, "survey"),
            Self::Assembly => write!(f, "assembly"),
            Self::Api => write!(f, "api"),
        }
    }
}

/// Stance a participant declared for themselves, on a five-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredStance {
    StronglySupport,
    Support,
    Neutral,
    Oppose,
    StronglyOppose,
}

impl DeclaredStance {
    /// Collapse onto the three-way label used for distributions.
    pub fn label(self) -> StanceLabel {
        match self {
            Self::StronglySupport | Self::Support => StanceLabel::Support,
            Self::Neutral => StanceLabel::Neutral,
            Self::Oppose | Self::StronglyOppose => StanceLabel::Oppose,
        }
    }
}

/// Categorical stance used for stance distributions and embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StanceLabel {
    Support,
    Neutral,
    Oppose,
}

impl StanceLabel {
    /// All labels in canonical report order.
    pub const ALL: [StanceLabel; 3] = [Self::Support, Self::Neutral, Self::Oppose];

    /// Position in [`StanceLabel::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Support => 0,
            Self::Neutral => 1,
            Self::Oppose => 2,
        }
    }
}

impl std::fmt::Display for StanceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Support => write!(f, "support"),
            Self::Neutral => write!(f, "neutral"),
            Self::Oppose => write!(f, "oppose"),
        }
    }
}

/// A single anonymized opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    /// Free text of the statement
    pub text: String,

    /// Stance the participant declared, if any
    #[serde(default, alias = "declared_stance_label")]
    pub declared_stance: Option<DeclaredStance>,

    /// Sparse demographic fields (dimension → category)
    #[serde(default)]
    pub demographics: BTreeMap<String, String>,

    /// Provenance of the record
    #[serde(default, alias = "provenance_source_type")]
    pub source: ProvenanceSource,

    /// Submission time, when the input layer recorded one
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Opinion {
    /// Create an opinion with only text; everything else defaults.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            declared_stance: None,
            demographics: BTreeMap::new(),
            source: ProvenanceSource::default(),
            submitted_at: None,
        }
    }

    /// Builder-style helper to attach a demographic field.
    pub fn with_demographic(mut self, dimension: impl Into<String>, category: impl Into<String>) -> Self {
        self.demographics.insert(dimension.into(), category.into());
        self
    }

    /// Builder-style helper to set the provenance source.
    pub fn with_source(mut self, source: ProvenanceSource) -> Self {
        self.source = source;
        self
    }

    /// Builder-style helper to set the submission time.
    pub fn with_submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(at);
        self
    }

    /// Builder-style helper to set a declared stance.
    pub fn with_declared_stance(mut self, stance: DeclaredStance) -> Self {
        self.declared_stance = Some(stance);
        self
    }

    /// Category for a demographic dimension, `"unknown"` when missing or blank.
    ///
    /// Keys match after trimming, the same way dimensions are collected; an
    /// exact key wins over a padded one.
    pub fn demographic(&self, dimension: &str) -> &str {
        let dimension = dimension.trim();
        let padded = self
            .demographics
            .iter()
            .filter(|(key, _)| key.as_str() != dimension && key.trim() == dimension)
            .map(|(_, value)| value);
        self.demographics
            .get(dimension)
            .into_iter()
            .chain(padded)
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// Whether any of the given dimensions carries a non-blank value.
    pub fn has_any_demographic(&self, dimensions: &[String]) -> bool {
        dimensions
            .iter()
            .any(|d| self.demographic(d) != UNKNOWN_CATEGORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_demographics_are_unknown() {
        let op = Opinion::new("text")
            .with_demographic("region", "  ")
            .with_demographic("age_range", " 25-34 ");
        assert_eq!(op.demographic("region"), UNKNOWN_CATEGORY);
        assert_eq!(op.demographic("income_bracket"), UNKNOWN_CATEGORY);
        assert_eq!(op.demographic("age_range"), "25-34");
    }

    #[test]
    fn test_padded_demographic_keys_match_trimmed_dimension() {
        let op = Opinion::new("text").with_demographic(" region ", "EU-West");
        assert_eq!(op.demographic("region"), "EU-West");

        let op = Opinion::new("text")
            .with_demographic("region", "EU-East")
            .with_demographic(" region", "EU-West");
        assert_eq!(op.demographic("region"), "EU-East");

        let op = Opinion::new("text")
            .with_demographic("region", " ")
            .with_demographic("region ", "EU-West");
        assert_eq!(op.demographic("region"), "EU-West");
    }

    #[test]
    fn test_declared_stance_collapses() {
        assert_eq!(DeclaredStance::StronglySupport.label(), StanceLabel::Support);
        assert_eq!(DeclaredStance::Neutral.label(), StanceLabel::Neutral);
        assert_eq!(DeclaredStance::StronglyOppose.label(), StanceLabel::Oppose);
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let op: Opinion = serde_json::from_str(r#"{"text": "We need this"}"#).unwrap();
        assert_eq!(op.source, ProvenanceSource::Survey);
        assert!(op.declared_stance.is_none());
        assert!(op.demographics.is_empty());
        assert!(op.submitted_at.is_none());

        let op: Opinion = serde_json::from_str(
            r#"{"text": "No", "declared_stance_label": "strongly_oppose",
                "provenance_source_type": "reddit", "demographics": {"region": "EU-West"}}"#,
        )
        .unwrap();
        assert_eq!(op.declared_stance, Some(DeclaredStance::StronglyOppose));
        assert_eq!(op.source, ProvenanceSource::Reddit);
        assert_eq!(op.demographic("region"), "EU-West");
        assert!(op.submitted_at.is_none());

        let op: Opinion =
            serde_json::from_str(r#"{"text": "Yes", "timestamp": "2025-03-01T12:00:00Z"}"#).unwrap();
        assert_eq!(op.submitted_at.map(|t| t.timestamp()), Some(1_740_830_400));
    }
}
