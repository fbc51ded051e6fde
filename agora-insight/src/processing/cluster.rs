//! Seeded k-means clustering.
//!
//! Deterministic for a fixed seed: a single `StdRng` drives k-means++
//! initialization across all restarts, every sum runs in input order, and
//! ties always resolve toward the lower index. Labels are canonicalized so
//! cluster ids depend only on membership, never on centroid order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::embed::{FeatureVector, FEATURE_DIMENSIONS};
use crate::config::{ClusterCount, ClusteringConfig};

/// Why clustering fell back to a single cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Fallback {
    /// Fewer opinions than `k · min_cluster_size`
    InsufficientOpinions { opinions: usize, required: usize },
    /// Fewer distinct feature vectors than requested clusters
    IdenticalPoints { distinct: usize, requested: usize },
}

impl std::fmt::Display for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientOpinions { opinions, required } => write!(
                f,
                "{opinions} opinions is below the {required} required for the requested \
                 cluster count; all opinions were placed in a single cluster"
            ),
            Self::IdenticalPoints { distinct, requested } => write!(
                f,
                "only {distinct} distinct feature vectors for {requested} requested clusters; \
                 fewer clusters were produced"
            ),
        }
    }
}

/// Outcome of clustering a set of feature vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    /// Canonical cluster id per input point
    pub labels: Vec<usize>,
    /// Number of non-empty clusters
    pub cluster_count: usize,
    /// Sum of squared distances to assigned centroids
    pub inertia: f64,
    /// Mean silhouette, when more than one cluster was produced
    pub silhouette: Option<f64>,
    pub fallback: Option<Fallback>,
}

impl ClusterAssignment {
    fn single(n: usize, fallback: Option<Fallback>) -> Self {
        Self {
            labels: vec![0; n],
            cluster_count: usize::from(n > 0),
            inertia: 0.0,
            silhouette: None,
            fallback,
        }
    }
}

// ============================================================================
// Geometry
// ============================================================================

fn squared_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centroid; ties go to the lowest index.
fn nearest(point: &FeatureVector, centroids: &[FeatureVector]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best.1 {
            best = (idx, d);
        }
    }
    best
}

/// Relabel clusters by order of first appearance in the input.
pub fn canonicalize(labels: &[usize]) -> Vec<usize> {
    let mut mapping: Vec<Option<usize>> = Vec::new();
    let mut next = 0;
    labels
        .iter()
        .map(|&label| {
            if label >= mapping.len() {
                mapping.resize(label + 1, None);
            }
            *mapping[label].get_or_insert_with(|| {
                next += 1;
                next - 1
            })
        })
        .collect()
}

fn distinct_points(points: &[FeatureVector]) -> usize {
    let mut seen: Vec<&FeatureVector> = Vec::new();
    for p in points {
        if !seen.iter().any(|s| squared_distance(s, p) == 0.0) {
            seen.push(p);
        }
    }
    seen.len()
}

// ============================================================================
// K-Means
// ============================================================================

struct KMeansRun {
    labels: Vec<usize>,
    inertia: f64,
}

/// k-means++ seeding. Stops early once every point coincides with a centroid.
fn init_centroids(points: &[FeatureVector], k: usize, rng: &mut StdRng) -> Vec<FeatureVector> {
    let mut centroids = vec![points[rng.gen_range(0..points.len())]];
    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            break;
        }
        let target = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (idx, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            cumulative += w;
            chosen = Some(idx);
            if cumulative > target {
                break;
            }
        }
        match chosen {
            Some(idx) => centroids.push(points[idx]),
            None => break,
        }
    }
    centroids
}

fn assign(points: &[FeatureVector], centroids: &[FeatureVector], labels: &mut [usize]) {
    for (label, point) in labels.iter_mut().zip(points) {
        *label = nearest(point, centroids).0;
    }
}

/// Move the point farthest from its centroid into each empty cluster.
fn reseed_empty(points: &[FeatureVector], centroids: &mut [FeatureVector], labels: &mut [usize]) {
    let k = centroids.len();
    loop {
        let mut sizes = vec![0usize; k];
        for &l in labels.iter() {
            sizes[l] += 1;
        }
        let Some(empty) = sizes.iter().position(|&s| s == 0) else {
            return;
        };
        let mut farthest: Option<(usize, f64)> = None;
        for (idx, point) in points.iter().enumerate() {
            if sizes[labels[idx]] < 2 {
                continue;
            }
            let d = squared_distance(point, &centroids[labels[idx]]);
            if farthest.map_or(true, |(_, best)| d > best) {
                farthest = Some((idx, d));
            }
        }
        let Some((idx, _)) = farthest else {
            return;
        };
        centroids[empty] = points[idx];
        labels[idx] = empty;
    }
}

fn update_centroids(points: &[FeatureVector], labels: &[usize], centroids: &mut [FeatureVector]) {
    let k = centroids.len();
    let mut sums = vec![[0.0; FEATURE_DIMENSIONS]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        for (s, x) in sums[label].iter_mut().zip(point) {
            *s += x;
        }
        counts[label] += 1;
    }
    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            for (c, s) in centroid.iter_mut().zip(sum) {
                *c = s / count as f64;
            }
        }
    }
}

fn kmeans_once(points: &[FeatureVector], k: usize, max_iterations: usize, rng: &mut StdRng) -> KMeansRun {
    let mut centroids = init_centroids(points, k, rng);
    let mut labels = vec![usize::MAX; points.len()];
    let mut previous = labels.clone();

    for _ in 0..max_iterations {
        assign(points, &centroids, &mut labels);
        reseed_empty(points, &mut centroids, &mut labels);
        update_centroids(points, &labels, &mut centroids);
        if labels == previous {
            break;
        }
        previous.clone_from(&labels);
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum();
    KMeansRun { labels, inertia }
}

/// Best of `restarts` k-means runs; the first run wins inertia ties.
fn kmeans(points: &[FeatureVector], k: usize, config: &ClusteringConfig, rng: &mut StdRng) -> KMeansRun {
    let mut best: Option<KMeansRun> = None;
    for _ in 0..config.restarts.max(1) {
        let run = kmeans_once(points, k, config.max_iterations, rng);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    let best = best.unwrap_or(KMeansRun {
        labels: vec![0; points.len()],
        inertia: 0.0,
    });
    KMeansRun {
        labels: canonicalize(&best.labels),
        inertia: best.inertia,
    }
}

// ============================================================================
// Silhouette
// ============================================================================

/// Mean silhouette coefficient over all points (Euclidean distance).
pub fn silhouette(points: &[FeatureVector], labels: &[usize]) -> f64 {
    let k = labels.iter().copied().max().map_or(0, |m| m + 1);
    if k < 2 || points.is_empty() {
        return 0.0;
    }
    let mut sizes = vec![0usize; k];
    for &l in labels {
        sizes[l] += 1;
    }

    let mut total = 0.0;
    for (i, p) in points.iter().enumerate() {
        let own = labels[i];
        if sizes[own] < 2 {
            continue;
        }
        let mut sums = vec![0.0; k];
        for (j, q) in points.iter().enumerate() {
            if i != j {
                sums[labels[j]] += squared_distance(p, q).sqrt();
            }
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        let denom = a.max(b);
        if denom > 0.0 && b.is_finite() {
            total += (b - a) / denom;
        }
    }
    total / points.len() as f64
}

// ============================================================================
// Entry Point
// ============================================================================

fn cluster_count(labels: &[usize]) -> usize {
    labels.iter().copied().max().map_or(0, |m| m + 1)
}

/// Partition feature vectors into clusters.
pub fn assign_clusters(points: &[FeatureVector], config: &ClusteringConfig) -> ClusterAssignment {
    let n = points.len();
    let (k_min, k_max) = match config.count {
        ClusterCount::Fixed { k } => (k, k),
        ClusterCount::Auto { min, max } => (min, max),
    };

    let required = k_min.max(1) * config.min_cluster_size;
    if k_min <= 1 || n < required {
        let fallback = (k_min > 1).then_some(Fallback::InsufficientOpinions { opinions: n, required });
        if let Some(ref reason) = fallback {
            warn!(opinions = n, required, "Too few opinions for requested clusters, using one cluster");
            debug!(%reason, "Clustering fallback");
        }
        return ClusterAssignment::single(n, fallback);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<(usize, KMeansRun, f64)> = None;
    for k in k_min..=k_max {
        if n < k * config.min_cluster_size {
            break;
        }
        let run = kmeans(points, k, config, &mut rng);
        let score = silhouette(points, &run.labels);
        debug!(k, inertia = run.inertia, silhouette = score, "Evaluated cluster count");
        if best.as_ref().map_or(true, |(_, _, s)| score > *s) {
            best = Some((k, run, score));
        }
    }

    let Some((requested, run, score)) = best else {
        return ClusterAssignment::single(n, None);
    };

    let produced = cluster_count(&run.labels);
    let fallback = (produced < requested).then(|| Fallback::IdenticalPoints {
        distinct: distinct_points(points),
        requested,
    });
    info!(
        clusters = produced,
        inertia = run.inertia,
        silhouette = score,
        seed = config.seed,
        "Clustering complete"
    );

    ClusterAssignment {
        labels: run.labels,
        cluster_count: produced,
        inertia: run.inertia,
        silhouette: (produced > 1).then_some(score),
        fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> FeatureVector {
        [x, y, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    /// Three well-separated blobs of `per` points each, interleaved in input order.
    fn blobs(per: usize) -> Vec<FeatureVector> {
        let centers = [(0.0, 0.0), (5.0, 5.0), (-5.0, 5.0)];
        let mut points = Vec::new();
        for i in 0..per {
            for (cx, cy) in centers {
                let jitter = (i as f64) * 0.01;
                points.push(point(cx + jitter, cy - jitter));
            }
        }
        points
    }

    fn config(count: ClusterCount) -> ClusteringConfig {
        ClusteringConfig {
            count,
            ..ClusteringConfig::default()
        }
    }

    #[test]
    fn test_canonicalize_by_first_appearance() {
        assert_eq!(canonicalize(&[2, 2, 0, 1, 0]), vec![0, 0, 1, 2, 1]);
        assert_eq!(canonicalize(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_recovers_separated_blobs() {
        let points = blobs(6);
        let result = assign_clusters(&points, &config(ClusterCount::Fixed { k: 3 }));
        assert_eq!(result.cluster_count, 3);
        assert!(result.fallback.is_none());
        // Interleaved input: canonical ids follow the first three points.
        for (i, label) in result.labels.iter().enumerate() {
            assert_eq!(*label, i % 3);
        }
        assert!(result.silhouette.unwrap() > 0.9);
    }

    #[test]
    fn test_same_seed_same_labels() {
        let points = blobs(8);
        let cfg = config(ClusterCount::Fixed { k: 4 });
        assert_eq!(assign_clusters(&points, &cfg), assign_clusters(&points, &cfg));
    }

    #[test]
    fn test_auto_picks_natural_k() {
        let points = blobs(10);
        let result = assign_clusters(&points, &config(ClusterCount::Auto { min: 2, max: 5 }));
        assert_eq!(result.cluster_count, 3);
    }

    #[test]
    fn test_falls_back_below_minimum() {
        let points = blobs(3);
        let result = assign_clusters(&points, &config(ClusterCount::Fixed { k: 4 }));
        assert_eq!(result.cluster_count, 1);
        assert!(result.labels.iter().all(|&l| l == 0));
        assert_eq!(
            result.fallback,
            Some(Fallback::InsufficientOpinions { opinions: 9, required: 20 })
        );
    }

    #[test]
    fn test_identical_points_never_yield_empty_clusters() {
        let points = vec![point(1.0, 1.0); 30];
        let result = assign_clusters(&points, &config(ClusterCount::Fixed { k: 4 }));
        assert_eq!(result.cluster_count, 1);
        assert!(matches!(result.fallback, Some(Fallback::IdenticalPoints { distinct: 1, .. })));
    }

    #[test]
    fn test_silhouette_of_single_cluster_is_zero() {
        let points = blobs(2);
        assert_eq!(silhouette(&points, &vec![0; points.len()]), 0.0);
    }
}
