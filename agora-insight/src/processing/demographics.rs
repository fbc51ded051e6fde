//! Demographic aggregation.
//!
//! Missing or blank demographic fields are counted under `"unknown"` rather
//! than dropped, so every breakdown sums to the member count.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::sentiment::SentimentVector;
use crate::opinion::Opinion;

/// dimension → category → member count
pub type DemographicBreakdown = BTreeMap<String, BTreeMap<String, usize>>;

/// Recognized dimensions plus every dimension observed on any opinion, sorted.
pub fn demographic_dimensions(opinions: &[Opinion], recognized: &[String]) -> Vec<String> {
    let mut dims: BTreeSet<String> = recognized.iter().map(|d| d.trim().to_string()).collect();
    for opinion in opinions {
        for key in opinion.demographics.keys() {
            let key = key.trim();
            if !key.is_empty() {
                dims.insert(key.to_string());
            }
        }
    }
    dims.into_iter().collect()
}

/// Count categories per dimension over a subset of opinions.
pub fn breakdown(opinions: &[Opinion], members: &[usize], dimensions: &[String]) -> DemographicBreakdown {
    let mut result = DemographicBreakdown::new();
    for dim in dimensions {
        let counts = result.entry(dim.clone()).or_default();
        for &idx in members {
            *counts.entry(opinions[idx].demographic(dim).to_string()).or_default() += 1;
        }
    }
    result
}

/// Mean sentiment of one demographic group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSentiment {
    pub count: usize,
    pub mean: SentimentVector,
}

/// dimension → category → group sentiment, over the whole input set.
pub type DemographicSentiment = BTreeMap<String, BTreeMap<String, GroupSentiment>>;

/// Mean sentiment per demographic group across all opinions.
pub fn demographic_sentiment(
    opinions: &[Opinion],
    vectors: &[SentimentVector],
    dimensions: &[String],
) -> DemographicSentiment {
    let mut result = DemographicSentiment::new();
    for dim in dimensions {
        let mut groups: BTreeMap<&str, Vec<&SentimentVector>> = BTreeMap::new();
        for (opinion, vector) in opinions.iter().zip(vectors) {
            groups.entry(opinion.demographic(dim)).or_default().push(vector);
        }
        let table = groups
            .into_iter()
            .map(|(category, members)| {
                let group = GroupSentiment {
                    count: members.len(),
                    mean: SentimentVector::mean(members),
                };
                (category.to_string(), group)
            })
            .collect();
        result.insert(dim.clone(), table);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opinion::UNKNOWN_CATEGORY;

    fn opinions() -> Vec<Opinion> {
        vec![
            Opinion::new("a").with_demographic("region", "EU-West").with_demographic("pet", "cat"),
            Opinion::new("b").with_demographic("region", " "),
            Opinion::new("c").with_demographic("region", "EU-West"),
        ]
    }

    #[test]
    fn test_dimensions_include_recognized_and_observed() {
        let dims = demographic_dimensions(&opinions(), &["age_range".to_string(), "region".to_string()]);
        assert_eq!(dims, vec!["age_range", "pet", "region"]);
    }

    #[test]
    fn test_breakdown_sums_to_member_count() {
        let ops = opinions();
        let dims = demographic_dimensions(&ops, &["age_range".to_string()]);
        let members = [0, 1, 2];
        let table = breakdown(&ops, &members, &dims);
        for (dim, counts) in &table {
            assert_eq!(counts.values().sum::<usize>(), members.len(), "{dim}");
        }
        assert_eq!(table["region"]["EU-West"], 2);
        assert_eq!(table["region"][UNKNOWN_CATEGORY], 1);
        assert_eq!(table["age_range"][UNKNOWN_CATEGORY], 3);
    }

    #[test]
    fn test_group_sentiment_means() {
        let ops = opinions();
        let vectors = vec![
            SentimentVector { stance: 1.0, ..SentimentVector::default() },
            SentimentVector { stance: -1.0, ..SentimentVector::default() },
            SentimentVector { stance: 0.5, ..SentimentVector::default() },
        ];
        let table = demographic_sentiment(&ops, &vectors, &["region".to_string()]);
        let west = &table["region"]["EU-West"];
        assert_eq!(west.count, 2);
        assert_eq!(west.mean.stance, 0.75);
        assert_eq!(table["region"][UNKNOWN_CATEGORY].mean.stance, -1.0);
    }

    #[test]
    fn test_padded_keys_are_counted_under_trimmed_dimension() {
        let ops = vec![
            Opinion::new("a").with_demographic(" region ", "EU-West"),
            Opinion::new("b").with_demographic("region", "EU-East"),
        ];
        let dims = demographic_dimensions(&ops, &[]);
        assert_eq!(dims, vec!["region"]);
        let table = breakdown(&ops, &[0, 1], &dims);
        assert_eq!(table["region"]["EU-West"], 1);
        assert_eq!(table["region"]["EU-East"], 1);
        assert!(!table["region"].contains_key(UNKNOWN_CATEGORY));
    }
}
