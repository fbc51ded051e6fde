//! Duplicate and sampling-bias detection.
//!
//! Surfaces data-quality issues before they contaminate downstream analysis.
//! Nothing here filters the input: duplicates stay in the dataset so the
//! full submission set remains auditable, and the warnings are signals for
//! a human reader, not verdicts.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use super::normalize::normalize_for_comparison;
use crate::config::{BiasConfig, DuplicateConfig};
use crate::opinion::{Opinion, ProvenanceSource};

// ============================================================================
// Duplicate Report
// ============================================================================

/// A set of opinions sharing one normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Normalized text shared by every occurrence
    pub normalized_text: String,
    /// Input indices of every occurrence, ascending
    pub occurrences: Vec<usize>,
}

/// Result of duplicate detection over the full opinion set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Σ(k − 1) over every normalized text occurring k times
    pub duplicate_count: usize,
    /// Number of opinions inspected
    pub total_count: usize,
    /// duplicate_count / total_count
    pub ratio: f64,
    /// Ratio as a whole percent, rounded half-up
    pub ratio_percent: u32,
    /// Whether the ratio reached the configured warning threshold
    pub warning_triggered: bool,
    /// Groups with more than one occurrence, ordered by first occurrence
    pub groups: Vec<DuplicateGroup>,
}

/// Count near-identical submissions.
pub fn detect_duplicates(opinions: &[Opinion], config: &DuplicateConfig) -> DuplicateReport {
    let total_count = opinions.len();

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for (idx, opinion) in opinions.iter().enumerate() {
        let key = normalize_for_comparison(&opinion.text);
        match positions.get(&key) {
            Some(&pos) => groups[pos].occurrences.push(idx),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(DuplicateGroup {
                    normalized_text: key,
                    occurrences: vec![idx],
                });
            }
        }
    }

    groups.retain(|g| g.occurrences.len() > 1);
    let duplicate_count: usize = groups.iter().map(|g| g.occurrences.len() - 1).sum();

    let (ratio, ratio_percent) = if total_count > 0 {
        let percent = (duplicate_count * 200 + total_count) / (2 * total_count);
        (duplicate_count as f64 / total_count as f64, percent as u32)
    } else {
        (0.0, 0)
    };

    let warning_triggered = total_count > 0 && ratio >= config.warning_threshold;
    if warning_triggered {
        warn!(
            duplicate_count,
            total_count,
            ratio_percent,
            "Duplicate ratio reached warning threshold"
        );
    }

    DuplicateReport {
        duplicate_count,
        total_count,
        ratio,
        ratio_percent,
        warning_triggered,
        groups,
    }
}

// ============================================================================
// Bias Warnings
// ============================================================================

/// A data-quality warning attached to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BiasWarning {
    /// Too few opinions for the result to be representative
    SmallSample { count: usize, minimum: usize },
    /// One platform supplies most of the input
    SourceDominance { source: ProvenanceSource, share_percent: u32 },
    /// Every opinion came from one platform
    SingleSource { source: ProvenanceSource },
    /// Few opinions carry any demographic information
    LowDemographicCoverage { coverage_percent: u32 },
    /// Many submissions share the same normalized text
    DuplicateContent { duplicate_count: usize, ratio_percent: u32 },
    /// Many submissions share one exact timestamp
    IdenticalTimestamps { count: usize, share_percent: u32 },
    /// A large share of submissions arrived in a short window
    TemporalClustering {
        burst_count: usize,
        window_seconds: i64,
        span_seconds: i64,
        share_percent: u32,
    },
}

impl std::fmt::Display for BiasWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SmallSample { count, minimum } => write!(
                f,
                "Small sample size ({count} opinions). Minimum recommended is {minimum}. \
                 Results may not be representative."
            ),
            Self::SourceDominance { source, share_percent } => write!(
                f,
                "Source bias: {source} accounts for {share_percent}% of opinions. \
                 This platform's user demographics will skew results."
            ),
            Self::SingleSource { source } => write!(
                f,
                "Single-source data (all from {source}). \
                 Cross-platform collection recommended for representativeness."
            ),
            Self::LowDemographicCoverage { coverage_percent } => write!(
                f,
                "Low demographic coverage ({coverage_percent}% of opinions have demographic data). \
                 Demographic breakdowns will have limited reliability."
            ),
            Self::DuplicateContent { duplicate_count, ratio_percent } => write!(
                f,
                "Duplicate content detected: {duplicate_count} duplicate opinions \
                 ({ratio_percent}% of total). Possible bot activity or coordinated campaign."
            ),
            Self::IdenticalTimestamps { count, share_percent } => write!(
                f,
                "{count} opinions ({share_percent}%) share an identical timestamp. \
                 Possible data import artifact or coordinated submission."
            ),
            Self::TemporalClustering {
                burst_count,
                window_seconds,
                span_seconds,
                share_percent,
            } => write!(
                f,
                "Temporal clustering detected: {burst_count} opinions ({share_percent}%) arrived \
                 within {window_seconds}s of a {span_seconds}s collection span. \
                 Possible brigading or coordinated campaign."
            ),
        }
    }
}

fn whole_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part * 200 + total) / (2 * total)) as u32
}

/// Run every bias check and collect warnings in a fixed order.
pub fn detect_bias(
    opinions: &[Opinion],
    duplicates: &DuplicateReport,
    config: &BiasConfig,
    recognized_dimensions: &[String],
) -> Vec<BiasWarning> {
    let mut warnings = Vec::new();
    let total = opinions.len();

    if total < config.min_opinions {
        warnings.push(BiasWarning::SmallSample {
            count: total,
            minimum: config.min_opinions,
        });
    }

    let mut source_counts: BTreeMap<ProvenanceSource, usize> = BTreeMap::new();
    for op in opinions {
        *source_counts.entry(op.source).or_default() += 1;
    }
    if source_counts.len() == 1 {
        if let Some(&source) = source_counts.keys().next() {
            warnings.push(BiasWarning::SingleSource { source });
        }
    } else {
        for (&source, &count) in &source_counts {
            if count as f64 / total as f64 > config.source_dominance_threshold {
                warnings.push(BiasWarning::SourceDominance {
                    source,
                    share_percent: whole_percent(count, total),
                });
            }
        }
    }

    if total > 0 {
        let with_demographics = opinions
            .iter()
            .filter(|op| op.has_any_demographic(recognized_dimensions))
            .count();
        if (with_demographics as f64 / total as f64) < config.demographic_coverage_threshold {
            warnings.push(BiasWarning::LowDemographicCoverage {
                coverage_percent: whole_percent(with_demographics, total),
            });
        }
    }

    if duplicates.warning_triggered {
        warnings.push(BiasWarning::DuplicateContent {
            duplicate_count: duplicates.duplicate_count,
            ratio_percent: duplicates.ratio_percent,
        });
    }

    warnings.extend(check_timing(opinions, config));

    if warnings.is_empty() {
        info!("Bias detection: no issues found");
    } else {
        warn!(count = warnings.len(), "Bias detection found warnings");
    }

    warnings
}

/// Flag identical timestamps and submission bursts.
///
/// Only opinions carrying `submitted_at` take part; below
/// `temporal_min_opinions` of them nothing is checked.
fn check_timing(opinions: &[Opinion], config: &BiasConfig) -> Option<BiasWarning> {
    let mut times: Vec<i64> = opinions
        .iter()
        .filter_map(|op| op.submitted_at.map(|t| t.timestamp_millis()))
        .collect();
    let n = times.len();
    if n < config.temporal_min_opinions.max(2) {
        return None;
    }
    times.sort_unstable();

    let mut largest_group = 1;
    let mut run = 1;
    for pair in times.windows(2) {
        run = if pair[0] == pair[1] { run + 1 } else { 1 };
        largest_group = largest_group.max(run);
    }
    if largest_group as f64 / n as f64 >= config.identical_timestamp_share {
        return Some(BiasWarning::IdenticalTimestamps {
            count: largest_group,
            share_percent: whole_percent(largest_group, n),
        });
    }

    let span = times[n - 1] - times[0];
    if span == 0 {
        return None;
    }
    let burst = ((config.burst_share * n as f64).ceil() as usize).clamp(2, n);
    let limit = config.burst_window_fraction * span as f64;
    let tightest = times
        .windows(burst)
        .map(|w| w[burst - 1] - w[0])
        .min()
        .filter(|&window| (window as f64) < limit)?;

    Some(BiasWarning::TemporalClustering {
        burst_count: burst,
        window_seconds: tightest / 1000,
        span_seconds: span / 1000,
        share_percent: whole_percent(burst, n),
    })
}
