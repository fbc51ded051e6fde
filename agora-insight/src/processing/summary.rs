//! Per-cluster summaries: stance distribution, sentiment, quotes.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;

use super::demographics::{breakdown, DemographicBreakdown};
use super::normalize::normalize_for_comparison;
use super::sentiment::{SentimentVector, SCORE_DECIMALS};
use crate::config::ClusteringConfig;
use crate::opinion::{Opinion, StanceLabel};
use agora_common::util::{round_to, truncate_with_ellipsis};

/// Percentage of members per stance label.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StanceDistribution {
    pub support: f64,
    pub neutral: f64,
    pub oppose: f64,
}

impl StanceDistribution {
    pub fn get(&self, label: StanceLabel) -> f64 {
        match label {
            StanceLabel::Support => self.support,
            StanceLabel::Neutral => self.neutral,
            StanceLabel::Oppose => self.oppose,
        }
    }

    pub fn total(&self) -> f64 {
        self.support + self.neutral + self.oppose
    }
}

/// Apportion 100% across stance counts by largest remainder.
///
/// Works in integer units of `10^-precision` percent, so the three values
/// always sum to exactly 100 at that precision. Remainder ties go to the
/// label that comes first in canonical order.
pub fn stance_distribution(counts: [usize; 3], precision: u32) -> StanceDistribution {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return StanceDistribution::default();
    }
    let scale = 10u64.pow(precision);
    let units = 100 * scale;
    let total = total as u64;

    let mut shares = [0u64; 3];
    let mut remainders = [(0u64, 0usize); 3];
    for (i, &count) in counts.iter().enumerate() {
        let exact = count as u64 * units;
        shares[i] = exact / total;
        remainders[i] = (exact % total, i);
    }
    let mut leftover = units - shares.iter().sum::<u64>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, i) in &remainders {
        if leftover == 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }

    let as_percent = |share: u64| round_to(share as f64 / scale as f64, precision);
    StanceDistribution {
        support: as_percent(shares[0]),
        neutral: as_percent(shares[1]),
        oppose: as_percent(shares[2]),
    }
}

/// A quote chosen to represent a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeQuote {
    /// Original text of the first occurrence, truncated
    pub text: String,
    /// Members sharing this normalized text
    pub occurrences: usize,
    /// Input index of the first occurrence
    pub first_index: usize,
}

/// Up to `limit` quotes with distinct normalized text, most frequent first,
/// ties broken by earliest input index.
pub fn representative_quotes(
    opinions: &[Opinion],
    members: &[usize],
    limit: usize,
    max_chars: usize,
) -> Vec<RepresentativeQuote> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for &idx in members {
        let key = normalize_for_comparison(&opinions[idx].text);
        match positions.get(&key) {
            Some(&pos) => candidates[pos].1 += 1,
            None => {
                positions.insert(key, candidates.len());
                candidates.push((idx, 1));
            }
        }
    }
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    candidates
        .into_iter()
        .take(limit)
        .map(|(idx, occurrences)| RepresentativeQuote {
            text: truncate_with_ellipsis(opinions[idx].text.trim(), max_chars),
            occurrences,
            first_index: idx,
        })
        .collect()
}

/// A group of opinions with its summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Canonical id: clusters are numbered by their first member's input position
    pub id: usize,
    pub size: usize,
    /// Member input indices, ascending
    pub member_indices: Vec<usize>,
    pub stance_distribution: StanceDistribution,
    pub dominant_stance: StanceLabel,
    pub sentiment_aggregate: SentimentVector,
    /// Population standard deviation of member stance scores
    pub stance_spread: f64,
    pub demographic_breakdown: DemographicBreakdown,
    pub representative_quotes: Vec<RepresentativeQuote>,
}

/// Inputs shared by every cluster summary.
pub struct SummaryInputs<'a> {
    pub opinions: &'a [Opinion],
    pub vectors: &'a [SentimentVector],
    pub labels: &'a [StanceLabel],
    pub dimensions: &'a [String],
    pub config: &'a ClusteringConfig,
}

/// Summarize one cluster.
pub fn summarize_cluster(id: usize, members: Vec<usize>, inputs: &SummaryInputs<'_>) -> Cluster {
    let mut counts = [0usize; 3];
    for &idx in &members {
        counts[inputs.labels[idx].index()] += 1;
    }
    // Lowest canonical index wins count ties.
    let dominant_stance = StanceLabel::ALL
        .into_iter()
        .fold(StanceLabel::Support, |best, label| {
            if counts[label.index()] > counts[best.index()] {
                label
            } else {
                best
            }
        });

    let stances: Vec<f64> = members.iter().map(|&i| inputs.vectors[i].stance).collect();
    let stance_spread = if stances.len() > 1 {
        round_to(stances.iter().population_std_dev(), SCORE_DECIMALS)
    } else {
        0.0
    };

    Cluster {
        id,
        size: members.len(),
        stance_distribution: stance_distribution(counts, inputs.config.percent_precision),
        dominant_stance,
        sentiment_aggregate: SentimentVector::mean(members.iter().map(|&i| &inputs.vectors[i])),
        stance_spread,
        demographic_breakdown: breakdown(inputs.opinions, &members, inputs.dimensions),
        representative_quotes: representative_quotes(
            inputs.opinions,
            &members,
            inputs.config.representative_quotes,
            inputs.config.quote_max_chars,
        ),
        member_indices: members,
    }
}

/// Summarize every cluster of a canonical labeling.
///
/// Returned in descending size, ties by ascending id.
pub fn summarize_clusters(cluster_labels: &[usize], inputs: &SummaryInputs<'_>) -> Vec<Cluster> {
    let k = cluster_labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (idx, &label) in cluster_labels.iter().enumerate() {
        members[label].push(idx);
    }

    let mut clusters: Vec<Cluster> = members
        .into_iter()
        .enumerate()
        .filter(|(_, m)| !m.is_empty())
        .map(|(id, m)| summarize_cluster(id, m, inputs))
        .collect();
    clusters.sort_by(|a, b| b.size.cmp(&a.size).then(a.id.cmp(&b.id)));
    clusters
}
