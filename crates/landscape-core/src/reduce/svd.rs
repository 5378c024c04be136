//! Truncated SVD via a randomized range finder with power iterations

use nalgebra::{DMatrix, SVD};
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{LandscapeError, Result, Stage};

/// Sweep cap for the exact SVD of the projected matrix.
const MAX_SVD_SWEEPS: usize = 10_000;

/// Singular triples in descending order of singular value.
#[derive(Debug, Clone)]
pub struct Svd {
    /// Left singular vectors, one per column (m × r)
    pub u: DMatrix<f64>,
    pub singular_values: Vec<f64>,
    /// Right singular vectors, one per column (n × r)
    pub v: DMatrix<f64>,
}

/// Top-`rank` singular triples of `a`.
///
/// A random sketch of width `rank` is orthonormalized and refined with
/// `power_iterations` rounds of subspace iteration; the small projected
/// matrix is then decomposed exactly. When `rank == min(m, n)` the sketch
/// spans the whole range and the result is exact.
pub fn truncated_svd(
    a: &DMatrix<f64>,
    rank: usize,
    power_iterations: usize,
    rng: &mut StdRng,
) -> Result<Svd> {
    let (m, n) = a.shape();
    let rank = rank.min(m).min(n);
    if rank == 0 {
        return Err(LandscapeError::numeric(
            Stage::Svd,
            format!("cannot decompose a {}x{} matrix", m, n),
        ));
    }

    let sketch = DMatrix::from_fn(n, rank, |_, _| rng.gen_range(-1.0..1.0));
    let mut q = (a * sketch).qr().q();
    for _ in 0..power_iterations {
        let z = (a.transpose() * &q).qr().q();
        q = (a * z).qr().q();
    }

    let projected = q.transpose() * a;
    let svd = SVD::try_new(projected, true, true, f64::EPSILON, MAX_SVD_SWEEPS).ok_or_else(
        || LandscapeError::numeric(Stage::Svd, "decomposition did not converge"),
    )?;

    let u_small = svd
        .u
        .ok_or_else(|| LandscapeError::numeric(Stage::Svd, "left vectors missing"))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| LandscapeError::numeric(Stage::Svd, "right vectors missing"))?;
    let values: Vec<f64> = svd.singular_values.iter().copied().collect();

    if values.iter().any(|s| !s.is_finite()) {
        return Err(LandscapeError::numeric(
            Stage::Svd,
            "non-finite singular values",
        ));
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&i, &j| values[j].total_cmp(&values[i]).then(i.cmp(&j)));
    order.truncate(rank);

    let u = (q * u_small).select_columns(order.iter());
    let v = v_t.transpose().select_columns(order.iter());
    let singular_values = order.iter().map(|&i| values[i]).collect();

    if u.iter().chain(v.iter()).any(|x| !x.is_finite()) {
        return Err(LandscapeError::numeric(
            Stage::Svd,
            "non-finite singular vectors",
        ));
    }

    Ok(Svd {
        u,
        singular_values,
        v,
    })
}
