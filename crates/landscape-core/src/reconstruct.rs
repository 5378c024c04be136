//! Document coordinates from the embedded basis

use nalgebra::DMatrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{LandscapeError, Result, Stage};
use crate::features::FeatureMatrix;

/// Similarity-weighted average of the `convex_n` most similar coordinates.
///
/// Ties go to the lower index. When the selected weights do not sum to a
/// finite positive value the selected coordinates are averaged uniformly.
pub fn convex_combination(similarities: &[f64], coordinates: &[[f64; 2]], convex_n: usize) -> [f64; 2] {
    let available = similarities.len().min(coordinates.len());
    let take = convex_n.max(1).min(available);
    if take == 0 {
        return [0.0, 0.0];
    }

    let mut order: Vec<usize> = (0..available).collect();
    order.sort_by(|&a, &b| similarities[b].total_cmp(&similarities[a]).then(a.cmp(&b)));
    order.truncate(take);

    let total: f64 = order.iter().map(|&i| similarities[i]).sum();
    let uniform = !(total.is_finite() && total > 0.0);

    let mut point = [0.0, 0.0];
    for &i in &order {
        let weight = if uniform {
            1.0 / take as f64
        } else {
            similarities[i] / total
        };
        point[0] += weight * coordinates[i][0];
        point[1] += weight * coordinates[i][1];
    }
    point
}

fn similarities(column: &[(usize, f64)], basis: &DMatrix<f64>) -> Vec<f64> {
    basis
        .column_iter()
        .map(|b| column.iter().map(|&(i, v)| v * b[i]).sum())
        .collect()
}

/// Place every document as a convex combination of embedded basis columns.
///
/// `basis` is terms × m and `coordinates` holds one embedded point per basis
/// column. Document columns are L2-normalized before comparison.
pub fn reconstruct(
    features: &FeatureMatrix,
    basis: &DMatrix<f64>,
    coordinates: &[[f64; 2]],
    convex_n: usize,
) -> Result<Vec<[f64; 2]>> {
    if basis.ncols() != coordinates.len() {
        return Err(LandscapeError::numeric(
            Stage::Reconstruction,
            format!(
                "{} basis columns but {} embedded points",
                basis.ncols(),
                coordinates.len()
            ),
        ));
    }
    if basis.nrows() != features.rows() {
        return Err(LandscapeError::numeric(
            Stage::Reconstruction,
            format!(
                "basis has {} terms, features have {}",
                basis.nrows(),
                features.rows()
            ),
        ));
    }

    let place = |j: usize| {
        let column = features.normalized_column(j);
        convex_combination(&similarities(&column, basis), coordinates, convex_n)
    };

    #[cfg(feature = "parallel")]
    let points: Vec<[f64; 2]> = (0..features.cols()).into_par_iter().map(place).collect();
    #[cfg(not(feature = "parallel"))]
    let points: Vec<[f64; 2]> = (0..features.cols()).map(place).collect();

    if points.iter().flatten().any(|x| !x.is_finite()) {
        return Err(LandscapeError::numeric(
            Stage::Reconstruction,
            "non-finite coordinate",
        ));
    }
    Ok(points)
}
