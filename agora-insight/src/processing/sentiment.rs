//! Multi-dimensional sentiment scoring.
//!
//! Goes beyond positive/negative polarity to capture dimensions relevant to
//! policy discussion: support/opposition, urgency, certainty and emotional
//! intensity. Every score is a pure function of the opinion text and the
//! lexicon passed in; nothing depends on the rest of the corpus, so adding
//! or removing other opinions never changes an opinion's vector.

use serde::{Deserialize, Serialize};

use super::lexicon::{Lexicon, SentimentDimension};
use super::normalize::{clean_text, tokenize};
use agora_common::util::round_to;

/// Decimal places kept on every published score.
pub const SCORE_DECIMALS: u32 = 4;

/// Four scores, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentVector {
    pub stance: f64,
    pub urgency: f64,
    pub certainty: f64,
    pub intensity: f64,
}

impl SentimentVector {
    /// Score for one dimension.
    pub fn get(&self, dimension: SentimentDimension) -> f64 {
        match dimension {
            SentimentDimension::Stance => self.stance,
            SentimentDimension::Urgency => self.urgency,
            SentimentDimension::Certainty => self.certainty,
            SentimentDimension::Intensity => self.intensity,
        }
    }

    /// Component-wise mean, rounded like individual scores.
    ///
    /// Returns the zero vector for an empty input. Summation follows the
    /// iterator order, so callers pass members in input order.
    pub fn mean<'a>(vectors: impl IntoIterator<Item = &'a SentimentVector>) -> SentimentVector {
        let mut sum = [0.0f64; 4];
        let mut count = 0usize;
        for v in vectors {
            for (slot, dim) in sum.iter_mut().zip(SentimentDimension::ALL) {
                *slot += v.get(dim);
            }
            count += 1;
        }
        if count == 0 {
            return SentimentVector::default();
        }
        let n = count as f64;
        SentimentVector {
            stance: round_to(sum[0] / n, SCORE_DECIMALS),
            urgency: round_to(sum[1] / n, SCORE_DECIMALS),
            certainty: round_to(sum[2] / n, SCORE_DECIMALS),
            intensity: round_to(sum[3] / n, SCORE_DECIMALS),
        }
    }
}

fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

fn lexical_density(tokens: &[&str], lexicon: &Lexicon, dimension: SentimentDimension) -> f64 {
    let table = lexicon.for_dimension(dimension);
    let total: f64 = tokens.iter().map(|t| table.weight(t)).sum();
    table.gain * total / tokens.len().max(1) as f64
}

fn typographic_intensity(raw: &str, lexicon: &Lexicon) -> f64 {
    let exclamations = raw.chars().filter(|&c| c == '!').count() as f64;
    let chars = raw.chars().count().max(1) as f64;
    let uppercase = raw.chars().filter(|c| c.is_uppercase()).count() as f64;
    exclamations * lexicon.typography.exclamation_weight
        + (uppercase / chars) * lexicon.typography.caps_weight
}

fn score_tokens(
    raw: &str,
    tokens: &[&str],
    lexicon: &Lexicon,
    dimension: SentimentDimension,
) -> f64 {
    let mut value = lexical_density(tokens, lexicon, dimension);
    if dimension == SentimentDimension::Intensity {
        value += typographic_intensity(raw, lexicon);
    }
    round_to(saturate(value), SCORE_DECIMALS)
}

/// Score a single dimension of a text.
pub fn score_dimension(text: &str, dimension: SentimentDimension, lexicon: &Lexicon) -> f64 {
    let cleaned = clean_text(text);
    let tokens = tokenize(&cleaned);
    score_tokens(text, &tokens, lexicon, dimension)
}

/// Score all four dimensions of a text.
pub fn score_text(text: &str, lexicon: &Lexicon) -> SentimentVector {
    let cleaned = clean_text(text);
    let tokens = tokenize(&cleaned);
    SentimentVector {
        stance: score_tokens(text, &tokens, lexicon, SentimentDimension::Stance),
        urgency: score_tokens(text, &tokens, lexicon, SentimentDimension::Urgency),
        certainty: score_tokens(text, &tokens, lexicon, SentimentDimension::Certainty),
        intensity: score_tokens(text, &tokens, lexicon, SentimentDimension::Intensity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("I strongly support UBI, it would benefit everyone and help the economy", 1 ; "pro text")]
    #[test_case("I oppose UBI, it would be harmful and a terrible waste of money", -1 ; "anti text")]
    #[test_case("There are arguments on both sides of the UBI discussion", 0 ; "neutral text")]
    fn test_stance_sign(text: &str, expected_sign: i32) {
        let stance = score_dimension(text, SentimentDimension::Stance, &Lexicon::default());
        match expected_sign {
            1 => assert!(stance > 0.0, "stance {stance}"),
            -1 => assert!(stance < 0.0, "stance {stance}"),
            _ => assert!(stance.abs() < 0.2, "stance {stance}"),
        }
    }

    #[test_case("We need UBI now! This is urgent, a crisis that is overdue", true ; "urgent")]
    #[test_case("We could eventually and gradually consider it later", false ; "deferred")]
    fn test_urgency_direction(text: &str, urgent: bool) {
        let urgency = score_dimension(text, SentimentDimension::Urgency, &Lexicon::default());
        if urgent {
            assert!(urgency > 0.1, "urgency {urgency}");
        } else {
            assert!(urgency < 0.0, "urgency {urgency}");
        }
    }

    #[test_case("The research clearly shows this; the evidence is proven", true ; "absolute")]
    #[test_case("Maybe, perhaps it might possibly work, unclear", false ; "hedged")]
    fn test_certainty_direction(text: &str, certain: bool) {
        let certainty = score_dimension(text, SentimentDimension::Certainty, &Lexicon::default());
        if certain {
            assert!(certainty > 0.5, "certainty {certainty}");
        } else {
            assert!(certainty < -0.5, "certainty {certainty}");
        }
    }

    #[test]
    fn test_intensity_from_caps_and_exclamation() {
        let loud = score_dimension(
            "THIS IS AMAZING! WE NEED THIS NOW!!!",
            SentimentDimension::Intensity,
            &Lexicon::default(),
        );
        let calm = score_dimension(
            "this is a fairly modest proposal",
            SentimentDimension::Intensity,
            &Lexicon::default(),
        );
        assert_eq!(loud, 1.0);
        assert!(calm < 0.0, "intensity {calm}");
    }

    #[test]
    fn test_repeated_keyword_saturates() {
        let text = "support ".repeat(500);
        let v = score_text(&text, &Lexicon::default());
        assert_eq!(v.stance, 1.0);
    }

    #[test]
    fn test_empty_text_is_zero_except_typography() {
        let v = score_text("", &Lexicon::default());
        assert_eq!(v, SentimentVector::default());
    }

    #[test]
    fn test_score_text_matches_per_dimension() {
        let lexicon = Lexicon::default();
        let text = "We must act now, the data clearly shows a massive benefit!";
        let v = score_text(text, &lexicon);
        for dim in SentimentDimension::ALL {
            assert_eq!(v.get(dim), score_dimension(text, dim, &lexicon));
        }
    }

    #[test]
    fn test_lexicon_is_an_explicit_input() {
        let mut lexicon = Lexicon::default();
        lexicon.stance.weights.insert("ubi".into(), 1.0);
        let base = score_dimension("ubi", SentimentDimension::Stance, &Lexicon::default());
        let custom = score_dimension("ubi", SentimentDimension::Stance, &lexicon);
        assert_eq!(base, 0.0);
        assert_eq!(custom, 1.0);
    }

    #[test]
    fn test_curly_apostrophe_scores_like_ascii() {
        let lexicon = Lexicon::default();
        let curly = score_dimension("We shouldn\u{2019}t do this", SentimentDimension::Stance, &lexicon);
        let ascii = score_dimension("We shouldn't do this", SentimentDimension::Stance, &lexicon);
        assert!(curly < 0.0);
        assert_eq!(curly, ascii);
    }

    #[test]
    fn test_mean_of_vectors() {
        let a = SentimentVector { stance: 1.0, urgency: 0.0, certainty: -1.0, intensity: 0.5 };
        let b = SentimentVector { stance: 0.0, urgency: 0.5, certainty: 1.0, intensity: 0.5 };
        let m = SentimentVector::mean([&a, &b]);
        assert_eq!(m, SentimentVector { stance: 0.5, urgency: 0.25, certainty: 0.0, intensity: 0.5 });
        assert_eq!(SentimentVector::mean(std::iter::empty()), SentimentVector::default());
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_contract_range(text in ".{0,400}") {
            let v = score_text(&text, &Lexicon::default());
            for dim in SentimentDimension::ALL {
                let s = v.get(dim);
                prop_assert!((-1.0..=1.0).contains(&s), "{dim} = {s}");
            }
        }

        #[test]
        fn prop_identical_text_identical_vector(text in "[a-zA-Z !,.]{0,200}") {
            let lexicon = Lexicon::default();
            prop_assert_eq!(score_text(&text, &lexicon), score_text(&text, &lexicon));
        }
    }
}
