//! The insight engine: validates configuration once, then turns opinion
//! sets into reports.
//!
//! ```text
//!            ┌─────────── opinion branch ───────────┐
//! opinions ─▶│ duplicates ─▶ score (par) ─▶ embed   │
//!            │   ─▶ cluster ─▶ summarize/demographics│──┐
//!            └──────────────────────────────────────┘  │ join ─▶ Report
//!            ┌────────── scenario branch ───────────┐  │
//! config  ──▶│ project ─▶ tradeoffs                  │──┘
//!            └──────────────────────────────────────┘
//! ```

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::InsightConfig;
use crate::error::{InsightError, InsightResult};
use crate::modeling::{analyze_tradeoffs, ScenarioSet};
use crate::opinion::{Opinion, StanceLabel};
use crate::processing::summary::{summarize_clusters, SummaryInputs};
use crate::processing::{
    assign_clusters, demographic_dimensions, demographic_sentiment, detect_bias, detect_duplicates,
    embed, score_text, stance_label, FeatureVector, SentimentVector,
};
use crate::report::{Methodology, Report, ScenarioReport};
use agora_common::Validate;

/// Cooperative cancellation flag, checked between opinions.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current run stop.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Validated configuration, ready to analyze opinion sets.
#[derive(Debug, Clone)]
pub struct InsightEngine {
    config: InsightConfig,
    scenarios: ScenarioSet,
}

impl InsightEngine {
    /// Validate every configuration section and every scenario up front.
    pub fn new(config: InsightConfig) -> InsightResult<Self> {
        config
            .validate()
            .map_err(|e| InsightError::configuration("configuration", e.to_string()))?;
        let scenarios = ScenarioSet::from_config(&config.modeling)?;
        Ok(Self { config, scenarios })
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Project every scenario and analyze its tradeoffs.
    pub fn project_scenarios(&self) -> Vec<ScenarioReport> {
        self.scenarios
            .project()
            .into_iter()
            .map(|scenario| ScenarioReport {
                tradeoffs: analyze_tradeoffs(&scenario, self.scenarios.tracked(), &self.config.tradeoffs),
                scenario,
            })
            .collect()
    }

    /// Analyze an opinion set.
    pub fn analyze(&self, opinions: &[Opinion]) -> InsightResult<Report> {
        self.analyze_with_abort(opinions, &AbortSignal::new())
    }

    /// Analyze an opinion set, stopping early if `abort` is raised.
    pub fn analyze_with_abort(&self, opinions: &[Opinion], abort: &AbortSignal) -> InsightResult<Report> {
        if opinions.is_empty() {
            return Err(InsightError::NoData);
        }
        info!(opinions = opinions.len(), topic = %self.config.topic, "Starting analysis");

        let (opinion_branch, scenarios) =
            rayon::join(|| self.opinion_branch(opinions, abort), || self.project_scenarios());
        let mut report = opinion_branch?;
        report.scenarios = scenarios;

        info!(
            clusters = report.clusters.len(),
            scenarios = report.scenarios.len(),
            warnings = report.bias_warnings.len(),
            "Analysis complete"
        );
        Ok(report)
    }

    fn score_all(&self, opinions: &[Opinion], abort: &AbortSignal) -> InsightResult<Vec<SentimentVector>> {
        let lexicon = &self.config.lexicon;
        let scored: Vec<Option<SentimentVector>> = opinions
            .par_iter()
            .map(|op| (!abort.is_aborted()).then(|| score_text(&op.text, lexicon)))
            .collect();

        if let Some(index) = scored.iter().position(Option::is_none) {
            warn!(index, "Analysis aborted during scoring");
            return Err(InsightError::Aborted { index });
        }
        Ok(scored.into_iter().flatten().collect())
    }

    fn opinion_branch(&self, opinions: &[Opinion], abort: &AbortSignal) -> InsightResult<Report> {
        let config = &self.config;

        let duplicates = detect_duplicates(opinions, &config.duplicates);
        let bias_warnings = detect_bias(
            opinions,
            &duplicates,
            &config.bias,
            &config.demographics.recognized_dimensions,
        );

        let vectors = self.score_all(opinions, abort)?;
        let labels: Vec<StanceLabel> = opinions
            .iter()
            .zip(&vectors)
            .map(|(op, v)| stance_label(op, v, &config.embedding))
            .collect();
        let features: Vec<FeatureVector> = vectors
            .iter()
            .zip(&labels)
            .map(|(v, label)| embed(v, *label, &config.embedding))
            .collect();

        let assignment = assign_clusters(&features, &config.clustering);
        let dimensions = demographic_dimensions(opinions, &config.demographics.recognized_dimensions);
        let inputs = SummaryInputs {
            opinions,
            vectors: &vectors,
            labels: &labels,
            dimensions: &dimensions,
            config: &config.clustering,
        };
        let clusters = summarize_clusters(&assignment.labels, &inputs);

        let declared = opinions.iter().filter(|op| op.declared_stance.is_some()).count();
        let mut notes = vec![
            "Sentiment scored with a lexicon-based multi-dimensional scorer".to_string(),
            format!(
                "Stance labels: {} of {} opinions used a declared stance, the rest were thresholded at +{}/-{}",
                if config.embedding.prefer_declared_stance { declared } else { 0 },
                opinions.len(),
                config.embedding.support_threshold,
                config.embedding.oppose_threshold
            ),
            "Duplicates are flagged but never removed".to_string(),
            "Impact projections use declared parametric models; all assumptions are stated in each scenario"
                .to_string(),
            format!(
                "Tradeoffs compare {} deltas using the configured polarity table",
                config.tradeoffs.horizon
            ),
        ];
        if let Some(fallback) = &assignment.fallback {
            notes.push(format!("Clustering fallback: {fallback}"));
        }

        Ok(Report {
            topic: config.topic.clone(),
            total_opinions: opinions.len(),
            duplicates,
            bias_warnings,
            clusters,
            demographic_sentiment: demographic_sentiment(opinions, &vectors, &dimensions),
            scenarios: Vec::new(),
            methodology: Methodology {
                seed: config.clustering.seed,
                requested_clusters: config.clustering.count.to_string(),
                cluster_count: assignment.cluster_count,
                silhouette: assignment.silhouette.map(|s| agora_common::util::round_to(s, 4)),
                notes,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_no_data() {
        let engine = InsightEngine::new(InsightConfig::default()).unwrap();
        assert!(matches!(engine.analyze(&[]), Err(InsightError::NoData)));
    }

    #[test]
    fn test_abort_before_start_stops_at_first_opinion() {
        let engine = InsightEngine::new(InsightConfig::default()).unwrap();
        let opinions: Vec<Opinion> = (0..10).map(|i| Opinion::new(format!("opinion {i}"))).collect();
        let abort = AbortSignal::new();
        abort.abort();
        match engine.analyze_with_abort(&opinions, &abort) {
            Err(InsightError::Aborted { index }) => assert_eq!(index, 0),
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_section_rejected_at_construction() {
        let mut config = InsightConfig::default();
        config.bias.source_dominance_threshold = 2.0;
        let err = InsightEngine::new(config).unwrap_err();
        assert!(matches!(err, InsightError::Configuration { .. }));
        assert!(err.to_string().contains("bias.source_dominance_threshold"));
    }

    #[test]
    fn test_small_input_gets_single_cluster_and_note() {
        let engine = InsightEngine::new(InsightConfig::default()).unwrap();
        let opinions = vec![Opinion::new("I support this"), Opinion::new("I oppose this")];
        let report = engine.analyze(&opinions).unwrap();
        assert_eq!(report.clusters.len(), 1);
        assert!(report.methodology.notes.iter().any(|n| n.starts_with("Clustering fallback")));
        assert_eq!(report.scenarios.len(), 3);
    }
}
