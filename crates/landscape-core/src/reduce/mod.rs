//! Rank reduction of the feature matrix
//!
//! Small corpora are densified and decomposed directly. Larger corpora are
//! first clustered with spherical k-means and the centroid matrix is
//! decomposed instead, so the downstream embedding sees at most
//! `cluster_count` rows.

mod kmeans;
mod svd;

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

use crate::error::{LandscapeError, Result, Stage};
use crate::features::FeatureMatrix;

pub use kmeans::{spherical_kmeans, Clustering};
pub use svd::{truncated_svd, Svd};

/// Knobs of the reduction stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionParams {
    /// Power iterations for SVD and Lloyd rounds for k-means
    pub iterations: usize,
    /// Largest document count decomposed directly
    pub dense_threshold: usize,
    pub cluster_count: usize,
    pub seed: u64,
}

/// Which reduction branch a corpus takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReductionStrategy {
    /// SVD of the dense feature matrix
    Direct,
    /// k-means into `clusters` centroids, then SVD of the centroid matrix
    Clustered { clusters: usize },
}

impl ReductionStrategy {
    /// Branch on document count alone.
    pub fn select(documents: usize, params: &ReductionParams) -> Self {
        if documents <= params.dense_threshold {
            Self::Direct
        } else {
            Self::Clustered {
                clusters: documents.min(params.cluster_count),
            }
        }
    }
}

/// Output of the reduction stage.
#[derive(Debug, Clone)]
pub struct ReducedBasis {
    pub strategy: ReductionStrategy,
    /// Dense basis columns (terms × m): documents or centroids
    pub basis: DMatrix<f64>,
    /// Descending
    pub singular_values: Vec<f64>,
    /// Right singular vectors (m × r)
    pub right_vectors: DMatrix<f64>,
}

impl ReducedBasis {
    /// Number of basis columns.
    pub fn width(&self) -> usize {
        self.basis.ncols()
    }

    /// Rows handed to the embedder: one per basis column, first `k` singular
    /// dimensions.
    pub fn planar_input(&self, k: usize) -> DMatrix<f64> {
        let k = k.max(1).min(self.right_vectors.ncols());
        self.right_vectors.columns(0, k).into_owned()
    }
}

/// Dimensionality reduction seam.
pub trait Reducer {
    fn reduce(
        &self,
        matrix: &FeatureMatrix,
        strategy: ReductionStrategy,
        params: &ReductionParams,
    ) -> Result<ReducedBasis>;
}

/// Randomized SVD, with spherical k-means for the clustered branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvdReducer;

impl Reducer for SvdReducer {
    fn reduce(
        &self,
        matrix: &FeatureMatrix,
        strategy: ReductionStrategy,
        params: &ReductionParams,
    ) -> Result<ReducedBasis> {
        let mut rng = StdRng::seed_from_u64(params.seed);

        let (basis, rank) = match strategy {
            ReductionStrategy::Direct => {
                let dense = matrix.to_dense();
                let rank = dense.nrows().min(dense.ncols());
                (dense, rank)
            }
            ReductionStrategy::Clustered { clusters } => {
                let clustering =
                    spherical_kmeans(matrix, clusters, params.iterations, &mut rng)?;
                debug!(
                    "kmeans: {} centroids after {} iterations",
                    clustering.centroids.ncols(),
                    clustering.iterations
                );
                (clustering.centroids, params.cluster_count)
            }
        };

        if basis.nrows() == 0 || basis.ncols() == 0 {
            return Err(LandscapeError::numeric(
                Stage::Svd,
                format!("empty basis ({}x{})", basis.nrows(), basis.ncols()),
            ));
        }

        let svd = truncated_svd(&basis, rank, params.iterations, &mut rng)?;
        debug!(
            "svd: {} singular values over {}x{} basis",
            svd.singular_values.len(),
            basis.nrows(),
            basis.ncols()
        );

        Ok(ReducedBasis {
            strategy,
            basis,
            singular_values: svd.singular_values,
            right_vectors: svd.v,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params(dense_threshold: usize, cluster_count: usize) -> ReductionParams {
        ReductionParams {
            iterations: 2,
            dense_threshold,
            cluster_count,
            seed: 17,
        }
    }

    #[test]
    fn strategy_branches_on_document_count() {
        let p = params(200, 200);
        assert_eq!(ReductionStrategy::select(1, &p), ReductionStrategy::Direct);
        assert_eq!(ReductionStrategy::select(200, &p), ReductionStrategy::Direct);
        assert_eq!(
            ReductionStrategy::select(201, &p),
            ReductionStrategy::Clustered { clusters: 200 }
        );
    }

    #[test]
    fn clustered_count_never_exceeds_documents() {
        let p = params(2, 200);
        assert_eq!(
            ReductionStrategy::select(5, &p),
            ReductionStrategy::Clustered { clusters: 5 }
        );
    }

    #[test]
    fn strategy_serializes_with_kind_tag() {
        let json = serde_json::to_string(&ReductionStrategy::Clustered { clusters: 4 }).unwrap();
        assert_eq!(json, r#"{"kind":"clustered","clusters":4}"#);
    }

    fn matrix() -> FeatureMatrix {
        FeatureMatrix::from_columns(
            3,
            vec![
                vec![(0, 1.0)],
                vec![(0, 0.7), (1, 0.7)],
                vec![(1, 1.0)],
                vec![(2, 1.0)],
            ],
        )
    }

    #[test]
    fn direct_reduction_keeps_documents_as_basis() {
        let p = params(10, 10);
        let basis = SvdReducer.reduce(&matrix(), ReductionStrategy::Direct, &p).unwrap();
        assert_eq!(basis.width(), 4);
        assert_eq!(basis.singular_values.len(), 3);
        assert_eq!(basis.right_vectors.shape(), (4, 3));
        assert_eq!(basis.planar_input(2).shape(), (4, 2));
    }

    #[test]
    fn clustered_reduction_uses_centroids() {
        let p = params(1, 2);
        let strategy = ReductionStrategy::select(4, &p);
        let basis = SvdReducer.reduce(&matrix(), strategy, &p).unwrap();
        assert_eq!(basis.width(), 2);
        assert_eq!(basis.basis.nrows(), 3);
        assert_eq!(basis.right_vectors.nrows(), 2);
    }

    #[test]
    fn empty_vocabulary_is_a_numeric_failure() {
        let empty = FeatureMatrix::from_columns(0, vec![vec![], vec![]]);
        let err = SvdReducer
            .reduce(&empty, ReductionStrategy::Direct, &params(10, 10))
            .unwrap_err();
        assert!(!err.is_input_error());
    }
}
