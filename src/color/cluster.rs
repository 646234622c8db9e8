//! K-means clustering in OKLCH
//!
//! Seeding is k-means++-style farthest-point: one random seed, then the point
//! farthest from every chosen centroid until k exist. Centroids average L and
//! C arithmetically and H circularly.

use super::oklch::{circular_mean_hue, oklch_distance, rgb_to_oklch, Oklch};
use super::{PaletteEntry, RawColorSample};
use crate::config::HeuristicConfig;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::debug;

/// K-means parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    /// Number of clusters
    pub k: usize,
    /// Iteration cap
    pub max_iter: usize,
    /// Stop once no centroid moves this far
    pub epsilon: f64,
}

impl KMeans {
    /// Parameters with the default convergence threshold
    pub fn new(k: usize, max_iter: usize) -> Self {
        Self {
            k,
            max_iter,
            epsilon: 0.001,
        }
    }

    /// Cluster `points`, returning exactly `k` clusters of point indices.
    ///
    /// If there are no more points than `k`, every point is its own cluster and
    /// no iteration runs. Clusters may be empty otherwise.
    pub fn run<R: Rng + ?Sized>(&self, points: &[Oklch], rng: &mut R) -> Vec<Vec<usize>> {
        let k = self.k.max(1);
        if points.len() <= k {
            return (0..points.len()).map(|i| vec![i]).collect();
        }

        let mut centroids = seed_centroids(points, k, rng);
        let mut clusters = assign(points, &centroids);

        for iteration in 0..self.max_iter {
            let mut moved: f64 = 0.0;
            for (centroid, members) in centroids.iter_mut().zip(&clusters) {
                if members.is_empty() {
                    continue;
                }
                let next = centroid_of(points, members);
                moved = moved.max(oklch_distance(centroid, &next));
                *centroid = next;
            }
            clusters = assign(points, &centroids);

            if moved < self.epsilon {
                debug!("k-means converged after {} iterations", iteration + 1);
                break;
            }
        }

        clusters
    }
}

/// Convenience wrapper around [`KMeans::run`]
pub fn kmeans<R: Rng + ?Sized>(
    points: &[Oklch],
    k: usize,
    max_iter: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    KMeans::new(k, max_iter).run(points, rng)
}

fn seed_centroids<R: Rng + ?Sized>(points: &[Oklch], k: usize, rng: &mut R) -> Vec<Oklch> {
    let mut chosen = vec![false; points.len()];
    let first = rng.random_range(0..points.len());
    chosen[first] = true;
    let mut centroids = vec![points[first]];

    while centroids.len() < k {
        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !chosen[*i])
            .map(|(i, p)| {
                let nearest = centroids
                    .iter()
                    .map(|c| oklch_distance(p, c))
                    .fold(f64::INFINITY, f64::min);
                (i, nearest)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match farthest {
            Some((i, _)) => {
                chosen[i] = true;
                centroids.push(points[i]);
            }
            None => break,
        }
    }

    centroids
}

fn assign(points: &[Oklch], centroids: &[Oklch]) -> Vec<Vec<usize>> {
    let mut clusters = vec![Vec::new(); centroids.len()];
    for (i, p) in points.iter().enumerate() {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (j, c) in centroids.iter().enumerate() {
            let d = oklch_distance(p, c);
            if d < best_distance {
                best = j;
                best_distance = d;
            }
        }
        clusters[best].push(i);
    }
    clusters
}

fn centroid_of(points: &[Oklch], members: &[usize]) -> Oklch {
    let n = members.len() as f64;
    let l = members.iter().map(|&i| points[i].l).sum::<f64>() / n;
    let c = members.iter().map(|&i| points[i].c).sum::<f64>() / n;
    let hues: Vec<f64> = members.iter().map(|&i| points[i].h).collect();
    Oklch {
        l,
        c,
        h: circular_mean_hue(&hues),
    }
}

/// Cluster raw samples into a count-sorted palette with default heuristics
pub fn cluster_colors(samples: &[RawColorSample]) -> Vec<PaletteEntry> {
    cluster_colors_with(samples, &HeuristicConfig::default(), &mut rand::rng())
}

/// Cluster raw samples into a palette sorted descending by total count.
///
/// `k = clamp(round(sqrt(n)), min_clusters, max_clusters)`; samples whose hex
/// does not parse are dropped first.
pub fn cluster_colors_with<R: Rng + ?Sized>(
    samples: &[RawColorSample],
    heuristics: &HeuristicConfig,
    rng: &mut R,
) -> Vec<PaletteEntry> {
    let (members, points): (Vec<&RawColorSample>, Vec<Oklch>) = samples
        .iter()
        .filter_map(|s| super::parse_hex(&s.hex).map(|rgb| (s, rgb_to_oklch(rgb))))
        .unzip();

    if points.is_empty() {
        return Vec::new();
    }

    let k = ((points.len() as f64).sqrt().round() as usize)
        .clamp(heuristics.min_clusters, heuristics.max_clusters.max(heuristics.min_clusters));
    let params = KMeans {
        k,
        max_iter: heuristics.kmeans_max_iter,
        epsilon: heuristics.kmeans_epsilon,
    };

    let mut palette: Vec<PaletteEntry> = params
        .run(&points, rng)
        .into_iter()
        .filter(|cluster| !cluster.is_empty())
        .map(|cluster| collapse(&cluster, &members, &points))
        .collect();

    palette.sort_by(|a, b| b.count.total_cmp(&a.count));
    debug!(
        "Clustered {} colors into {} palette entries (k={})",
        points.len(),
        palette.len(),
        k
    );
    palette
}

fn collapse(cluster: &[usize], members: &[&RawColorSample], points: &[Oklch]) -> PaletteEntry {
    let mut representative = cluster[0];
    for &i in &cluster[1..] {
        if members[i].count > members[representative].count {
            representative = i;
        }
    }

    let contexts: BTreeSet<String> = cluster
        .iter()
        .flat_map(|&i| members[i].contexts.iter().cloned())
        .collect();

    PaletteEntry {
        hex: members[representative].hex.to_ascii_lowercase(),
        oklch: points[representative],
        count: cluster.iter().map(|&i| members[i].count).sum(),
        contexts,
        size: cluster.len(),
    }
}
