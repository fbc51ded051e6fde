//! Weighted word tables for the sentiment scorer.
//!
//! The lexicon is plain configuration: it is loaded once, passed by
//! reference into every scoring call, and never mutated. Swapping the
//! lexicon is the only way to change how text is scored, which keeps the
//! scoring rule reviewable in one place.

use agora_common::validation::{check_range, check_range_exclusive_min, collect_errors};
use agora_common::{Validate, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_GAIN: f64 = 100.0;
const MAX_WEIGHT: f64 = 10.0;

/// The four scored dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentDimension {
    Stance,
    Urgency,
    Certainty,
    Intensity,
}

impl SentimentDimension {
    pub const ALL: [SentimentDimension; 4] =
        [Self::Stance, Self::Urgency, Self::Certainty, Self::Intensity];
}

impl std::fmt::Display for SentimentDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stance => write!(f, "stance"),
            Self::Urgency => write!(f, "urgency"),
            Self::Certainty => write!(f, "certainty"),
            Self::Intensity => write!(f, "intensity"),
        }
    }
}

/// Signed word weights for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionLexicon {
    /// Multiplier applied to the per-token weight density before clamping
    pub gain: f64,
    /// Token → signed weight
    pub weights: BTreeMap<String, f64>,
}

impl DimensionLexicon {
    fn from_tables(gain: f64, tables: &[(&[&str], f64)]) -> Self {
        let mut weights = BTreeMap::new();
        for (words, weight) in tables {
            for word in *words {
                weights.insert((*word).to_string(), *weight);
            }
        }
        Self { gain, weights }
    }

    /// Weight of a token, zero when absent.
    pub fn weight(&self, token: &str) -> f64 {
        self.weights.get(token).copied().unwrap_or(0.0)
    }

    fn errors(&self, dimension: SentimentDimension) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) =
            check_range_exclusive_min(&format!("lexicon.{dimension}.gain"), self.gain, 0.0, MAX_GAIN)
        {
            errors.push(e);
        }
        for (token, &weight) in &self.weights {
            if let Err(e) = check_range(
                &format!("lexicon.{dimension}.weights.{token}"),
                weight,
                -MAX_WEIGHT,
                MAX_WEIGHT,
            ) {
                errors.push(e);
            }
        }
        errors
    }
}

/// Typographic intensity markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypographyWeights {
    /// Added per exclamation mark
    #[serde(default = "default_exclamation_weight")]
    pub exclamation_weight: f64,
    /// Multiplied by the uppercase character ratio
    #[serde(default = "default_caps_weight")]
    pub caps_weight: f64,
}

impl Default for TypographyWeights {
    fn default() -> Self {
        Self {
            exclamation_weight: default_exclamation_weight(),
            caps_weight: default_caps_weight(),
        }
    }
}

fn default_exclamation_weight() -> f64 {
    0.3
}

fn default_caps_weight() -> f64 {
    2.0
}

/// Complete scoring lexicon, one table per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default = "default_stance")]
    pub stance: DimensionLexicon,
    #[serde(default = "default_urgency")]
    pub urgency: DimensionLexicon,
    #[serde(default = "default_certainty")]
    pub certainty: DimensionLexicon,
    #[serde(default = "default_intensity")]
    pub intensity: DimensionLexicon,
    #[serde(default)]
    pub typography: TypographyWeights,
}

impl Lexicon {
    /// Table for one dimension.
    pub fn for_dimension(&self, dimension: SentimentDimension) -> &DimensionLexicon {
        match dimension {
            SentimentDimension::Stance => &self.stance,
            SentimentDimension::Urgency => &self.urgency,
            SentimentDimension::Certainty => &self.certainty,
            SentimentDimension::Intensity => &self.intensity,
        }
    }
}

impl Validate for Lexicon {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = SentimentDimension::ALL
            .into_iter()
            .flat_map(|dimension| self.for_dimension(dimension).errors(dimension))
            .collect();
        let t = &self.typography;
        errors.extend(
            [
                check_range(
                    "lexicon.typography.exclamation_weight",
                    t.exclamation_weight,
                    0.0,
                    MAX_WEIGHT,
                ),
                check_range("lexicon.typography.caps_weight", t.caps_weight, 0.0, MAX_WEIGHT),
            ]
            .into_iter()
            .filter_map(Result::err),
        );
        collect_errors(errors)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            stance: default_stance(),
            urgency: default_urgency(),
            certainty: default_certainty(),
            intensity: default_intensity(),
            typography: TypographyWeights::default(),
        }
    }
}

const SUPPORT_WORDS: &[&str] = &[
    "support", "favor", "favour", "agree", "benefit", "good", "positive", "help",
    "advantage", "pro", "should", "need", "must", "important", "essential",
    "necessary", "great", "works", "effective", "promising", "freedom", "improved",
];

const OPPOSE_WORDS: &[&str] = &[
    "oppose", "against", "disagree", "harmful", "bad", "negative", "hurt",
    "disadvantage", "con", "shouldn't", "terrible", "fail", "waste", "dangerous",
    "risk", "problem", "worse", "costly", "ineffective", "irresponsible",
    "unsustainable", "handouts", "discourages",
];

const URGENCY_WORDS: &[&str] = &[
    "now", "immediately", "urgent", "crisis", "emergency", "asap", "critical",
    "desperate", "overdue", "finally", "enough", "today",
];

const DEFERRAL_WORDS: &[&str] = &[
    "eventually", "gradually", "someday", "later", "slowly", "wait", "patience",
];

const CERTAINTY_WORDS: &[&str] = &[
    "definitely", "certainly", "clearly", "obviously", "proven", "proved", "evidence",
    "fact", "data", "research", "study", "shows", "always", "never",
];

const HEDGING_WORDS: &[&str] = &[
    "maybe", "perhaps", "might", "possibly", "unclear", "uncertain", "debatable",
    "depends", "unsure", "questionable", "nuanced", "mixed",
];

const INTENSIFIER_WORDS: &[&str] = &[
    "very", "extremely", "completely", "totally", "absolutely", "massive",
    "enormous", "dramatically", "significant", "significantly", "strongly",
    "incredibly", "huge",
];

const DOWNTONER_WORDS: &[&str] = &[
    "slightly", "somewhat", "minimal", "modest", "small", "mild", "fairly",
];

fn default_stance() -> DimensionLexicon {
    DimensionLexicon::from_tables(5.0, &[(SUPPORT_WORDS, 1.0), (OPPOSE_WORDS, -1.0)])
}

fn default_urgency() -> DimensionLexicon {
    DimensionLexicon::from_tables(5.0, &[(URGENCY_WORDS, 1.0), (DEFERRAL_WORDS, -0.5)])
}

fn default_certainty() -> DimensionLexicon {
    DimensionLexicon::from_tables(5.0, &[(CERTAINTY_WORDS, 1.0), (HEDGING_WORDS, -1.0)])
}

fn default_intensity() -> DimensionLexicon {
    DimensionLexicon::from_tables(5.0, &[(INTENSIFIER_WORDS, 1.0), (DOWNTONER_WORDS, -0.5)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_signed() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.stance.weight("support"), 1.0);
        assert_eq!(lexicon.stance.weight("oppose"), -1.0);
        assert_eq!(lexicon.urgency.weight("eventually"), -0.5);
        assert_eq!(lexicon.certainty.weight("maybe"), -1.0);
        assert_eq!(lexicon.intensity.weight("ubi"), 0.0);
    }

    #[test]
    fn test_no_word_in_both_stance_tables() {
        for word in SUPPORT_WORDS {
            assert!(!OPPOSE_WORDS.contains(word), "{word} is in both tables");
        }
    }

    #[test]
    fn test_partial_override_keeps_other_tables() {
        let lexicon: Lexicon =
            serde_json::from_str(r#"{"urgency": {"gain": 2.0, "weights": {"soon": 1.0}}}"#)
                .unwrap();
        assert_eq!(lexicon.urgency.weights.len(), 1);
        assert_eq!(lexicon.stance, Lexicon::default().stance);
    }

    #[test]
    fn test_default_lexicon_is_valid() {
        assert!(Lexicon::default().validate().is_ok());
    }

    #[test]
    fn test_nan_gain_is_rejected() {
        let mut lexicon = Lexicon::default();
        lexicon.stance.gain = f64::NAN;
        let err = lexicon.validate().unwrap_err();
        assert_eq!(err.field(), Some("lexicon.stance.gain"));

        lexicon.stance.gain = 0.0;
        assert!(lexicon.validate().is_err());
    }

    #[test]
    fn test_bad_weights_and_typography_are_collected() {
        let mut lexicon = Lexicon::default();
        lexicon.urgency.weights.insert("soon".to_string(), f64::INFINITY);
        lexicon.typography.caps_weight = -1.0;
        match lexicon.validate() {
            Err(ValidationError::Multiple(errors)) => {
                let fields: Vec<_> = errors.iter().filter_map(ValidationError::field).collect();
                assert_eq!(fields, vec!["lexicon.urgency.weights.soon", "lexicon.typography.caps_weight"]);
            }
            other => panic!("expected two errors, got {other:?}"),
        }
    }
}
