//! Planar embedding by metric MDS (SMACOF)

use std::time::{Duration, Instant};

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LandscapeError, Result, Stage};

/// Distance between rows of the embedder input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// 1 - cosine similarity; zero rows have similarity 0
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Self::Cosine => {
                let (mut dot, mut na, mut nb) = (0.0, 0.0, 0.0);
                for (x, y) in a.iter().zip(b) {
                    dot += x * y;
                    na += x * x;
                    nb += y * y;
                }
                if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    (1.0 - dot / (na.sqrt() * nb.sqrt())).max(0.0)
                }
            }
            Self::Euclidean => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::Euclidean => write!(f, "euclidean"),
        }
    }
}

/// Stopping rules of the stress minimization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MdsParams {
    pub max_steps: usize,
    pub max_duration: Duration,
    /// Stop once normalized stress improves by less than this
    pub tolerance: f64,
    pub metric: DistanceMetric,
}

impl Default for MdsParams {
    fn default() -> Self {
        Self {
            max_steps: 3000,
            max_duration: Duration::from_secs(2),
            tolerance: 1e-3,
            metric: DistanceMetric::Cosine,
        }
    }
}

/// Why the minimization stopped. All three are normal outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    Converged,
    MaxSteps,
    TimeBudget,
}

/// 2-D layout, one row per input row, in input order.
#[derive(Debug, Clone)]
pub struct Embedding {
    pub coordinates: Vec<[f64; 2]>,
    pub steps: usize,
    /// Normalized stress of the returned layout
    pub stress: f64,
    pub termination: Termination,
}

/// Number of singular dimensions to keep.
///
/// The first 0-based index whose cumulative share of the total strictly
/// exceeds `ratio` is the count kept, raised to at least 1. All values are
/// kept when no prefix exceeds the ratio or the total is not positive.
pub fn retained_dimensions(singular_values: &[f64], ratio: f64) -> usize {
    let total: f64 = singular_values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return singular_values.len();
    }
    let mut cumulative = 0.0;
    for (i, s) in singular_values.iter().enumerate() {
        cumulative += s;
        if cumulative / total > ratio {
            return i.max(1);
        }
    }
    singular_values.len()
}

/// Metric MDS embedder.
#[derive(Debug, Clone)]
pub struct Mds {
    params: MdsParams,
    seed: u64,
}

impl Mds {
    pub fn new(params: MdsParams, seed: u64) -> Self {
        Self { params, seed }
    }

    pub fn params(&self) -> &MdsParams {
        &self.params
    }

    fn target_distances(&self, rows: &DMatrix<f64>) -> DMatrix<f64> {
        let m = rows.nrows();
        let vectors: Vec<Vec<f64>> = rows
            .row_iter()
            .map(|r| r.iter().copied().collect())
            .collect();
        let mut d = DMatrix::zeros(m, m);
        for i in 0..m {
            for j in (i + 1)..m {
                let dist = self.params.metric.distance(&vectors[i], &vectors[j]);
                d[(i, j)] = dist;
                d[(j, i)] = dist;
            }
        }
        d
    }

    /// Embed the rows of `rows` into the plane.
    ///
    /// Each step applies the Guttman transform to the current layout. The loop
    /// ends on convergence, after `max_steps` steps or when the time budget is
    /// spent; an unconverged layout is still returned.
    pub fn fit_transform(&self, rows: &DMatrix<f64>) -> Result<Embedding> {
        let m = rows.nrows();
        if m <= 1 {
            return Ok(Embedding {
                coordinates: vec![[0.0, 0.0]; m],
                steps: 0,
                stress: 0.0,
                termination: Termination::Converged,
            });
        }

        let target = self.target_distances(rows);
        if target.iter().any(|d| !d.is_finite()) {
            return Err(LandscapeError::numeric(Stage::Mds, "non-finite target distance"));
        }
        let scale: f64 = target.iter().map(|d| d * d).sum::<f64>() / 2.0;
        if scale == 0.0 {
            return Ok(Embedding {
                coordinates: vec![[0.0, 0.0]; m],
                steps: 0,
                stress: 0.0,
                termination: Termination::Converged,
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut layout = DMatrix::from_fn(m, 2, |_, _| rng.gen_range(-1.0..1.0));
        let mut stress = normalized_stress(&target, &layout, scale);

        let started = Instant::now();
        let mut steps = 0;
        let termination = loop {
            if steps >= self.params.max_steps {
                break Termination::MaxSteps;
            }
            if started.elapsed() >= self.params.max_duration {
                break Termination::TimeBudget;
            }

            layout = guttman_transform(&target, &layout);
            steps += 1;

            let next = normalized_stress(&target, &layout, scale);
            if !next.is_finite() {
                return Err(LandscapeError::numeric(
                    Stage::Mds,
                    format!("stress diverged after {} steps", steps),
                ));
            }
            let improvement = stress - next;
            stress = next;
            if improvement < self.params.tolerance {
                break Termination::Converged;
            }
        };

        if layout.iter().any(|x| !x.is_finite()) {
            return Err(LandscapeError::numeric(Stage::Mds, "non-finite coordinates"));
        }
        debug!(
            "mds: {} rows, {} steps, stress {:.5}, {:?}",
            m, steps, stress, termination
        );

        Ok(Embedding {
            coordinates: layout.row_iter().map(|r| [r[0], r[1]]).collect(),
            steps,
            stress,
            termination,
        })
    }
}

fn pairwise(layout: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    let dx = layout[(i, 0)] - layout[(j, 0)];
    let dy = layout[(i, 1)] - layout[(j, 1)];
    (dx * dx + dy * dy).sqrt()
}

fn normalized_stress(target: &DMatrix<f64>, layout: &DMatrix<f64>, scale: f64) -> f64 {
    let m = layout.nrows();
    let mut raw = 0.0;
    for i in 0..m {
        for j in (i + 1)..m {
            let diff = target[(i, j)] - pairwise(layout, i, j);
            raw += diff * diff;
        }
    }
    raw / scale
}

/// `X' = B(X) X / m` with unit weights.
fn guttman_transform(target: &DMatrix<f64>, layout: &DMatrix<f64>) -> DMatrix<f64> {
    let m = layout.nrows();
    let mut b = DMatrix::zeros(m, m);
    for i in 0..m {
        for j in 0..m {
            if i == j {
                continue;
            }
            let current = pairwise(layout, i, j);
            if current > 0.0 {
                b[(i, j)] = -target[(i, j)] / current;
            }
        }
        let row_sum: f64 = (0..m).filter(|&j| j != i).map(|j| b[(i, j)]).sum();
        b[(i, i)] = -row_sum;
    }
    (b * layout) / m as f64
}
