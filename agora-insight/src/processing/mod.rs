//! Opinion processing: data quality checks, scoring, embedding, clustering
//! and demographic aggregation.

pub mod cluster;
pub mod demographics;
pub mod duplicate;
pub mod embed;
pub mod lexicon;
pub mod normalize;
pub mod sentiment;
pub mod summary;

pub use cluster::{assign_clusters, ClusterAssignment, Fallback};
pub use demographics::{demographic_dimensions, demographic_sentiment, DemographicSentiment, GroupSentiment};
pub use duplicate::{detect_bias, detect_duplicates, BiasWarning, DuplicateGroup, DuplicateReport};
pub use embed::{embed, stance_label, FeatureVector};
pub use lexicon::{Lexicon, SentimentDimension};
pub use sentiment::{score_dimension, score_text, SentimentVector};
pub use summary::{Cluster, RepresentativeQuote, StanceDistribution};
