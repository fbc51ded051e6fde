//! Markdown rendering of reports.

use chrono::{DateTime, Utc};

use super::{Report, ScenarioReport};
use crate::processing::{Cluster, DemographicSentiment};

const CLOSING_NOTE: &str = "*This report presents distributions, not conclusions. \
                            No single number should be taken as a definitive answer.*";

/// Render a full report.
pub fn render_report(report: &Report, digest: &str, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Agora Insight Report: {}\n\n", report.topic));
    md.push_str(&format!("*Generated: {}*\n", generated_at.format("%Y-%m-%d %H:%M UTC")));
    md.push_str(&format!("*Total opinions analyzed: {}*\n", report.total_opinions));
    md.push_str(&format!("*Report digest: `{digest}`*\n\n"));

    if !report.bias_warnings.is_empty() {
        md.push_str("## Data Quality Warnings\n\n");
        for warning in &report.bias_warnings {
            md.push_str(&format!("- **Warning**: {warning}\n"));
        }
        md.push('\n');
    }

    let dups = &report.duplicates;
    md.push_str("## Duplicate Detection\n\n");
    md.push_str(&format!(
        "{} of {} opinions are duplicates ({}%) across {} repeated texts.",
        dups.duplicate_count,
        dups.total_count,
        dups.ratio_percent,
        dups.groups.len()
    ));
    if dups.warning_triggered {
        md.push_str(" **Above the warning threshold.**");
    }
    md.push_str("\n\n");

    if !report.clusters.is_empty() {
        md.push_str("## Opinion Clusters\n\n");
        for cluster in &report.clusters {
            push_cluster(&mut md, cluster);
        }
    }

    if !report.demographic_sentiment.is_empty() {
        md.push_str("## Sentiment by Demographic Group\n\n");
        push_demographic_sentiment(&mut md, &report.demographic_sentiment);
    }

    if !report.scenarios.is_empty() {
        md.push_str("## Projected Scenarios\n\n");
        for scenario in &report.scenarios {
            push_scenario(&mut md, scenario);
        }
    }

    let m = &report.methodology;
    md.push_str("## Methodology\n\n");
    md.push_str("All algorithms are deterministic and auditable; rerunning with the same input, \
                 configuration and seed reproduces this report and its digest.\n\n");
    md.push_str(&format!("- Clustering: seeded k-means ({}, seed {})", m.requested_clusters, m.seed));
    match m.silhouette {
        Some(s) => md.push_str(&format!(", {} clusters, silhouette {s:.3}\n", m.cluster_count)),
        None => md.push_str(&format!(", {} cluster(s)\n", m.cluster_count)),
    }
    for note in &m.notes {
        md.push_str(&format!("- {note}\n"));
    }
    md.push_str("\n---\n");
    md.push_str(CLOSING_NOTE);
    md.push('\n');

    md
}

/// Render projected scenarios without an opinion analysis.
pub fn render_scenarios(topic: &str, scenarios: &[ScenarioReport], digest: &str, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();
    md.push_str(&format!("# Agora Scenario Projections: {topic}\n\n"));
    md.push_str(&format!("*Generated: {}*\n", generated_at.format("%Y-%m-%d %H:%M UTC")));
    md.push_str(&format!("*Digest: `{digest}`*\n\n"));
    for scenario in scenarios {
        push_scenario(&mut md, scenario);
    }
    md.push_str("---\n");
    md.push_str(CLOSING_NOTE);
    md.push('\n');
    md
}

fn push_cluster(md: &mut String, cluster: &Cluster) {
    md.push_str(&format!("### Cluster {} ({} opinions)\n\n", cluster.id, cluster.size));

    let sd = &cluster.stance_distribution;
    md.push_str(&format!(
        "**Stance**: {}% support / {}% neutral / {}% oppose (dominant: {}, spread {:.2})\n",
        sd.support, sd.neutral, sd.oppose, cluster.dominant_stance, cluster.stance_spread
    ));

    let s = &cluster.sentiment_aggregate;
    md.push_str(&format!(
        "**Sentiment**: stance: {:+.2}, urgency: {:+.2}, certainty: {:+.2}, intensity: {:+.2}\n",
        s.stance, s.urgency, s.certainty, s.intensity
    ));

    if !cluster.representative_quotes.is_empty() {
        md.push_str("\n**Representative views:**\n");
        for quote in &cluster.representative_quotes {
            if quote.occurrences > 1 {
                md.push_str(&format!("> \"{}\" (x{})\n\n", quote.text, quote.occurrences));
            } else {
                md.push_str(&format!("> \"{}\"\n\n", quote.text));
            }
        }
    }

    if !cluster.demographic_breakdown.is_empty() {
        md.push_str("**Demographic breakdown:**\n");
        for (dim, counts) in &cluster.demographic_breakdown {
            let parts: Vec<String> = counts.iter().map(|(cat, n)| format!("{cat}: {n}")).collect();
            md.push_str(&format!("- *{dim}*: {}\n", parts.join(", ")));
        }
    }
    md.push('\n');
}

fn push_demographic_sentiment(md: &mut String, table: &DemographicSentiment) {
    for (dim, groups) in table {
        md.push_str(&format!("**{dim}**\n\n"));
        md.push_str("| Category | Count | Stance | Urgency | Certainty | Intensity |\n");
        md.push_str("|---|---|---|---|---|---|\n");
        for (category, group) in groups {
            let v = &group.mean;
            md.push_str(&format!(
                "| {category} | {} | {:+.2} | {:+.2} | {:+.2} | {:+.2} |\n",
                group.count, v.stance, v.urgency, v.certainty, v.intensity
            ));
        }
        md.push('\n');
    }
}

fn push_scenario(md: &mut String, report: &ScenarioReport) {
    let scenario = &report.scenario;
    md.push_str(&format!("### Scenario: {}\n\n", scenario.name));
    if !scenario.description.is_empty() {
        md.push_str(&format!("{}\n\n", scenario.description));
    }
    md.push_str(&format!("*Phase-in: {} years*\n\n", scenario.phase_in_years));

    if !scenario.parameters.is_empty() {
        let parts: Vec<String> = scenario.parameters.iter().map(|(k, v)| format!("{k} = {v}")).collect();
        md.push_str(&format!("**Parameters:** {}\n\n", parts.join(", ")));
    }

    if !scenario.assumptions.is_empty() {
        md.push_str("**Assumptions:**\n");
        for a in &scenario.assumptions {
            md.push_str(&format!("- {a}\n"));
        }
        md.push('\n');
    }

    if !scenario.trajectories.is_empty() {
        md.push_str("| Dimension | Curve | Short-term | Medium-term | Long-term | Confidence |\n");
        md.push_str("|---|---|---|---|---|---|\n");
        for t in &scenario.trajectories {
            md.push_str(&format!(
                "| {} | {} | {:+.2}% | {:+.2}% | {:+.2}% | {:.0}% |\n",
                t.dimension, t.curve, t.short_term, t.medium_term, t.long_term, t.confidence
            ));
        }
        md.push('\n');
    }

    if !report.tradeoffs.is_empty() {
        md.push_str(&format!("**Key tradeoffs ({}):**\n", report.tradeoffs[0].horizon));
        for t in &report.tradeoffs {
            md.push_str(&format!("- {} (severity: {:.4})\n", t.description, t.severity));
        }
        md.push('\n');
    }
}
