//! Spherical k-means over sparse document columns

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{LandscapeError, Result, Stage};
use crate::features::FeatureMatrix;

/// Centroid movement below which the Lloyd loop stops.
const CENTROID_TOLERANCE: f64 = 1e-6;

type SparseColumn = Vec<(usize, f64)>;

/// Clustering result.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Unit-norm centroids, one per column (terms × k)
    pub centroids: DMatrix<f64>,
    /// Cluster of every document
    pub assignments: Vec<usize>,
    pub iterations: usize,
}

fn dot(column: &[(usize, f64)], centroid: &[f64]) -> f64 {
    column.iter().map(|&(i, v)| v * centroid[i]).sum()
}

/// Cosine distance between a unit document and a unit centroid.
fn distance(column: &[(usize, f64)], centroid: &[f64]) -> f64 {
    1.0 - dot(column, centroid)
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

fn densify(column: &[(usize, f64)], dim: usize) -> Vec<f64> {
    let mut dense = vec![0.0; dim];
    for &(i, v) in column {
        dense[i] = v;
    }
    dense
}

/// Nearest centroid, ties broken by lower index.
fn nearest(column: &[(usize, f64)], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = distance(column, centroid);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn assign(columns: &[SparseColumn], centroids: &[Vec<f64>]) -> Vec<usize> {
    #[cfg(feature = "parallel")]
    {
        columns.par_iter().map(|col| nearest(col, centroids)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        columns.iter().map(|col| nearest(col, centroids)).collect()
    }
}

/// k-means++ seeding on cosine distance.
fn seed_centroids(columns: &[SparseColumn], dim: usize, k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut chosen = vec![false; n];
    let first = rng.gen_range(0..n);
    chosen[first] = true;
    let mut centroids = vec![densify(&columns[first], dim)];
    let mut closest = vec![f64::INFINITY; n];

    while centroids.len() < k {
        if let Some(last) = centroids.last() {
            for (i, col) in columns.iter().enumerate() {
                closest[i] = closest[i].min(distance(col, last).max(0.0));
            }
        }

        // D² weights over the documents not yet chosen
        let candidates: Vec<usize> = (0..n).filter(|&i| !chosen[i]).collect();
        let pick = WeightedIndex::new(candidates.iter().map(|&i| closest[i] * closest[i]))
            .ok()
            .map(|weights| candidates[weights.sample(rng)]);

        let Some(idx) = pick.or_else(|| candidates.first().copied()) else {
            break;
        };
        chosen[idx] = true;
        centroids.push(densify(&columns[idx], dim));
    }
    centroids
}

fn moved(old: &[Vec<f64>], new: &[Vec<f64>]) -> bool {
    old.iter()
        .zip(new)
        .any(|(a, b)| a.iter().zip(b).any(|(x, y)| (x - y).abs() > CENTROID_TOLERANCE))
}

/// Cluster the L2-normalized document columns into `k` centroids.
///
/// `k` is clamped to the number of documents. Each Lloyd round assigns
/// documents by cosine distance, recomputes centroids as normalized means and
/// re-seeds empty clusters from document `c % n`. The loop stops after
/// `max_iterations` rounds or when assignments and centroids are stable.
pub fn spherical_kmeans(
    matrix: &FeatureMatrix,
    k: usize,
    max_iterations: usize,
    rng: &mut StdRng,
) -> Result<Clustering> {
    let n = matrix.cols();
    let dim = matrix.rows();
    let k = k.min(n);
    if k == 0 {
        return Err(LandscapeError::numeric(Stage::KMeans, "no documents to cluster"));
    }

    let columns: Vec<SparseColumn> = (0..n).map(|j| matrix.normalized_column(j)).collect();
    let mut centroids = seed_centroids(&columns, dim, k, rng);
    let mut assignments = assign(&columns, &centroids);
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;

        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for (col, &c) in columns.iter().zip(&assignments) {
            counts[c] += 1;
            for &(i, v) in col {
                sums[c][i] += v;
            }
        }
        for (c, sum) in sums.iter_mut().enumerate() {
            if counts[c] == 0 {
                *sum = densify(&columns[c % n], dim);
            }
            normalize(sum);
        }

        let next = assign(&columns, &sums);
        let stable = next == assignments && !moved(&centroids, &sums);
        centroids = sums;
        assignments = next;
        if stable {
            break;
        }
    }

    if centroids.iter().flatten().any(|x| !x.is_finite()) {
        return Err(LandscapeError::numeric(Stage::KMeans, "non-finite centroid"));
    }

    let centroids = DMatrix::from_fn(dim, centroids.len(), |i, c| centroids[c][i]);
    Ok(Clustering {
        centroids,
        assignments,
        iterations,
    })
}
