//! End-to-end tests for the analysis pipeline.
//!
//! These run the engine against seeded demo data and hand-built opinion
//! sets and check the properties every report must satisfy: byte-identical
//! output for identical input, clusters that partition the input, and
//! scenario projections that follow their declared models.

use std::collections::BTreeSet;

use proptest::prelude::*;

use agora_insight::config::ClusterCount;
use agora_insight::demo::generate_demo_opinions;
use agora_insight::modeling::{Direction, GrowthCurve, Horizon};
use agora_insight::processing::BiasWarning;
use agora_insight::{
    AbortSignal, DeclaredStance, InsightConfig, InsightEngine, InsightError, Opinion, Report,
};

// ============================================================================
// Test Utilities
// ============================================================================

fn engine() -> InsightEngine {
    InsightEngine::new(InsightConfig::default()).unwrap()
}

fn demo_report(seed: u64) -> Report {
    let mut config = InsightConfig::default();
    config.clustering.seed = seed;
    let engine = InsightEngine::new(config).unwrap();
    engine.analyze(&generate_demo_opinions(80, seed)).unwrap()
}

fn assert_partition(report: &Report, n: usize) {
    let mut seen = BTreeSet::new();
    for cluster in &report.clusters {
        assert_eq!(cluster.size, cluster.member_indices.len());
        for &idx in &cluster.member_indices {
            assert!(seen.insert(idx), "opinion {idx} appears in two clusters");
        }
    }
    assert_eq!(seen, (0..n).collect::<BTreeSet<_>>());
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_identical_runs_are_byte_identical() {
    let a = demo_report(42);
    let b = demo_report(42);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    assert_eq!(a.digest().unwrap(), b.digest().unwrap());
}

#[test]
fn test_demo_report_shape() {
    let report = demo_report(42);
    assert_eq!(report.total_opinions, 80);
    assert_eq!(report.clusters.len(), 4);
    assert_eq!(report.methodology.cluster_count, 4);
    assert!(report.methodology.silhouette.is_some());
    assert_eq!(report.scenarios.len(), 3);
    assert_partition(&report, 80);
}

// ============================================================================
// Cluster Invariants
// ============================================================================

#[test]
fn test_cluster_summaries_are_consistent() {
    let report = demo_report(7);

    for window in report.clusters.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        assert!(a.size > b.size || (a.size == b.size && a.id < b.id));
    }

    for cluster in &report.clusters {
        let total = cluster.stance_distribution.total();
        assert!((total - 100.0).abs() < 1e-6, "stance total {total}");

        for (dim, counts) in &cluster.demographic_breakdown {
            let sum: usize = counts.values().sum();
            assert_eq!(sum, cluster.size, "breakdown of {dim} in cluster {}", cluster.id);
        }

        assert!(cluster.representative_quotes.len() <= 3);
        assert!(cluster.stance_spread >= 0.0);
    }

    for (dim, groups) in &report.demographic_sentiment {
        let sum: usize = groups.values().map(|g| g.count).sum();
        assert_eq!(sum, report.total_opinions, "sentiment groups of {dim}");
    }
}

#[test]
fn test_declared_stance_drives_distribution() {
    let mut opinions: Vec<Opinion> = (0..4)
        .map(|i| Opinion::new(format!("statement {i}")).with_declared_stance(DeclaredStance::Support))
        .collect();
    opinions.push(Opinion::new("statement x").with_declared_stance(DeclaredStance::Oppose));

    let report = engine().analyze(&opinions).unwrap();
    assert_eq!(report.clusters.len(), 1);
    let cluster = &report.clusters[0];
    assert_eq!(cluster.stance_distribution.support, 80.0);
    assert_eq!(cluster.stance_distribution.oppose, 20.0);
}

#[test]
fn test_auto_cluster_count_stays_in_range() {
    let mut config = InsightConfig::default();
    config.clustering.count = ClusterCount::Auto { min: 2, max: 5 };
    let engine = InsightEngine::new(config).unwrap();
    let report = engine.analyze(&generate_demo_opinions(80, 3)).unwrap();
    assert!((2..=5).contains(&report.clusters.len()));
    assert_partition(&report, 80);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_clusters_partition_input(picks in prop::collection::vec(0usize..6, 1..40)) {
        const TEXTS: [&str; 6] = [
            "I strongly support this, it will help everyone",
            "This is a terrible and harmful idea",
            "Not sure, maybe it could work",
            "We must act now, it is urgent!",
            "Definitely oppose it, a waste of money",
            "Perhaps there are arguments on both sides",
        ];
        let opinions: Vec<Opinion> = picks.iter().map(|&i| Opinion::new(TEXTS[i])).collect();
        let report = engine().analyze(&opinions).unwrap();
        assert_partition(&report, opinions.len());
        prop_assert_eq!(report.duplicates.total_count, opinions.len());
    }
}

// ============================================================================
// Data Quality
// ============================================================================

#[test]
fn test_repeated_text_triggers_duplicate_warning() {
    let mut opinions: Vec<Opinion> = (0..10).map(|_| Opinion::new("Copy pasted talking point")).collect();
    opinions.extend((0..10).map(|i| Opinion::new(format!("independent thought number {i}"))));

    let report = engine().analyze(&opinions).unwrap();
    assert_eq!(report.duplicates.duplicate_count, 9);
    assert!(report.duplicates.warning_triggered);
    assert!(!report.bias_warnings.is_empty());
    // Duplicates are reported, never removed.
    assert_eq!(report.total_opinions, 20);
}

fn is_timing_warning(warning: &BiasWarning) -> bool {
    matches!(
        warning,
        BiasWarning::TemporalClustering { .. } | BiasWarning::IdenticalTimestamps { .. }
    )
}

#[test]
fn test_demo_submissions_are_spread_over_time() {
    let report = demo_report(42);
    assert!(!report.bias_warnings.iter().any(is_timing_warning));
}

#[test]
fn test_submission_burst_is_reported() {
    let start = 1_740_000_000;
    let opinions: Vec<Opinion> = (0..40)
        .map(|i| {
            // Half the submissions land within ten minutes, the rest over a month.
            let offset = if i < 20 { i * 30 } else { i * 86_400 };
            let at = chrono::DateTime::from_timestamp(start + offset, 0).unwrap();
            Opinion::new(format!("view number {i}")).with_submitted_at(at)
        })
        .collect();

    let report = engine().analyze(&opinions).unwrap();
    let burst = report
        .bias_warnings
        .iter()
        .find(|w| matches!(w, BiasWarning::TemporalClustering { .. }));
    match burst {
        Some(BiasWarning::TemporalClustering { burst_count, .. }) => assert_eq!(*burst_count, 20),
        other => panic!("expected a temporal clustering warning, got {other:?}"),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_cumulative_trajectories_are_monotonic() {
    for report in engine().project_scenarios() {
        for t in &report.scenario.trajectories {
            if t.curve.is_cumulative() {
                assert!(t.short_term.abs() <= t.medium_term.abs(), "{} {}", report.scenario.name, t.dimension);
                assert!(t.medium_term.abs() <= t.long_term.abs(), "{} {}", report.scenario.name, t.dimension);
            }
            let c = &t.horizon_confidence;
            assert!(c.short_term >= c.medium_term && c.medium_term >= c.long_term);
        }
    }
}

#[test]
fn test_pessimistic_inflation_exceeds_optimistic() {
    let scenarios = engine().project_scenarios();
    let inflation = |name: &str| {
        scenarios
            .iter()
            .find(|s| s.scenario.name == name)
            .and_then(|s| s.scenario.trajectory("inflation"))
            .map(|t| t.long_term)
            .unwrap()
    };
    assert!(inflation("Pessimistic") > inflation("Optimistic"));
}

#[test]
fn test_tradeoffs_are_ordered_and_conflicting() {
    for report in engine().project_scenarios() {
        assert!(report.tradeoffs.len() <= 5);
        for window in report.tradeoffs.windows(2) {
            assert!(window[0].severity >= window[1].severity);
        }
        for t in &report.tradeoffs {
            assert_eq!(t.horizon, Horizon::Long);
            assert_ne!(t.direction_a, t.direction_b);
            assert_ne!(t.direction_a, Direction::Unchanged);
            assert_ne!(t.direction_b, Direction::Unchanged);
        }
    }
}

#[test]
fn test_moderate_poverty_trajectory() {
    let scenarios = engine().project_scenarios();
    let moderate = scenarios
        .iter()
        .find(|s| s.scenario.name == "Moderate (base case)")
        .unwrap();
    let poverty = moderate.scenario.trajectory("poverty_rate").unwrap();
    assert_eq!(poverty.curve, GrowthCurve::Logarithmic);
    assert!((poverty.long_term - -15.57).abs() < 0.01);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_empty_input_is_rejected() {
    assert!(matches!(engine().analyze(&[]), Err(InsightError::NoData)));
}

#[test]
fn test_abort_is_reported() {
    let abort = AbortSignal::new();
    abort.abort();
    let result = engine().analyze_with_abort(&generate_demo_opinions(20, 1), &abort);
    assert!(matches!(result, Err(InsightError::Aborted { index: 0 })));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_files_merge_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("insight.json"),
        r#"{ "clustering": { "seed": 7, "count": { "mode": "auto", "min": 2, "max": 5 } } }"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("scenarios.json"), r#"{ "tradeoffs": { "top_k": 2 } }"#).unwrap();

    let mut config = InsightConfig::load(Some(dir.path().to_path_buf())).unwrap();
    config.apply_env_overrides_from(|_| None).unwrap();
    assert_eq!(config.clustering.count, ClusterCount::Auto { min: 2, max: 5 });
    assert_eq!(config.tradeoffs.top_k, 2);
    assert_eq!(config.clustering.restarts, 10);

    let engine = InsightEngine::new(config).unwrap();
    assert!(engine.project_scenarios().iter().all(|s| s.tradeoffs.len() <= 2));
}

#[test]
fn test_invalid_scenario_is_rejected() {
    let mut config = InsightConfig::default();
    config.modeling.scenarios[0].phase_in_years = -1.0;
    match InsightEngine::new(config) {
        Err(err) => assert!(err.to_string().contains("Optimistic")),
        Ok(_) => panic!("negative phase-in must be rejected"),
    }
}
