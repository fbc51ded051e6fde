//! Opinion embedding: sentiment plus stance label → feature vector.

use super::sentiment::SentimentVector;
use crate::config::EmbeddingConfig;
use crate::opinion::{Opinion, StanceLabel};

/// Number of components in a feature vector.
pub const FEATURE_DIMENSIONS: usize = 7;

/// Weighted sentiment components followed by a weighted stance one-hot.
pub type FeatureVector = [f64; FEATURE_DIMENSIONS];

/// Label a stance score by thresholding.
pub fn classify_stance(stance: f64, config: &EmbeddingConfig) -> StanceLabel {
    if stance > config.support_threshold {
        StanceLabel::Support
    } else if stance < -config.oppose_threshold {
        StanceLabel::Oppose
    } else {
        StanceLabel::Neutral
    }
}

/// Stance label for an opinion, preferring its declared stance when configured.
pub fn stance_label(opinion: &Opinion, vector: &SentimentVector, config: &EmbeddingConfig) -> StanceLabel {
    match opinion.declared_stance {
        Some(declared) if config.prefer_declared_stance => declared.label(),
        _ => classify_stance(vector.stance, config),
    }
}

/// Build the feature vector used for clustering.
pub fn embed(vector: &SentimentVector, label: StanceLabel, config: &EmbeddingConfig) -> FeatureVector {
    let w = &config.feature_weights;
    let mut features = [0.0; FEATURE_DIMENSIONS];
    features[0] = w.stance * vector.stance;
    features[1] = w.urgency * vector.urgency;
    features[2] = w.certainty * vector.certainty;
    features[3] = w.intensity * vector.intensity;
    features[4 + label.index()] = config.stance_label_weight;
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opinion::DeclaredStance;

    #[test]
    fn test_threshold_boundaries_are_neutral() {
        let config = EmbeddingConfig::default();
        assert_eq!(classify_stance(0.1, &config), StanceLabel::Neutral);
        assert_eq!(classify_stance(-0.1, &config), StanceLabel::Neutral);
        assert_eq!(classify_stance(0.1001, &config), StanceLabel::Support);
        assert_eq!(classify_stance(-0.5, &config), StanceLabel::Oppose);
    }

    #[test]
    fn test_declared_stance_wins_when_preferred() {
        let op = Opinion::new("text").with_declared_stance(DeclaredStance::StronglyOppose);
        let v = SentimentVector { stance: 0.9, ..SentimentVector::default() };

        let mut config = EmbeddingConfig::default();
        assert_eq!(stance_label(&op, &v, &config), StanceLabel::Oppose);

        config.prefer_declared_stance = false;
        assert_eq!(stance_label(&op, &v, &config), StanceLabel::Support);
    }

    #[test]
    fn test_embed_layout() {
        let config = EmbeddingConfig::default();
        let v = SentimentVector { stance: 0.8, urgency: 0.4, certainty: -0.2, intensity: 1.0 };
        let f = embed(&v, StanceLabel::Neutral, &config);
        assert_eq!(f, [0.8, 0.2, -0.1, 0.5, 0.0, 0.5, 0.0]);
    }
}
