//! Sparse term × document matrix

use nalgebra::DMatrix;
use sprs::CsMat;

/// Non-negative term weights, rows = vocabulary terms, columns = documents.
///
/// Stored column-compressed so each document is a contiguous slice.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    inner: CsMat<f64>,
}

impl FeatureMatrix {
    /// Build from per-document `(term, weight)` lists sorted by term index.
    pub(crate) fn from_columns(rows: usize, columns: Vec<Vec<(usize, f64)>>) -> Self {
        let mut indptr = Vec::with_capacity(columns.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();

        indptr.push(0usize);
        for column in &columns {
            for &(row, weight) in column {
                indices.push(row);
                data.push(weight);
            }
            indptr.push(indices.len());
        }

        Self {
            inner: CsMat::new_csc((rows, columns.len()), indptr, indices, data),
        }
    }

    /// Number of vocabulary terms.
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    /// Number of documents.
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// True when no document has a single non-zero weight.
    pub fn is_zero(&self) -> bool {
        self.inner.data().iter().all(|&v| v == 0.0)
    }

    /// Non-zero entries of document `j` as `(term, weight)`.
    pub fn column(&self, j: usize) -> Vec<(usize, f64)> {
        self.inner
            .outer_view(j)
            .map(|col| col.iter().map(|(i, &v)| (i, v)).collect())
            .unwrap_or_default()
    }

    /// Document `j` scaled to unit L2 norm. Zero columns stay zero.
    pub fn normalized_column(&self, j: usize) -> Vec<(usize, f64)> {
        let mut column = self.column(j);
        let norm = column.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in column.iter_mut() {
                *v /= norm;
            }
        }
        column
    }

    /// Dense copy for the direct SVD path.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut dense = DMatrix::zeros(self.rows(), self.cols());
        for (j, column) in self.inner.outer_iterator().enumerate() {
            for (i, &v) in column.iter() {
                dense[(i, j)] = v;
            }
        }
        dense
    }

    pub fn as_sparse(&self) -> &CsMat<f64> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> FeatureMatrix {
        FeatureMatrix::from_columns(
            3,
            vec![vec![(0, 3.0), (2, 4.0)], vec![], vec![(1, 2.0)]],
        )
    }

    #[test]
    fn shape_and_entries() {
        let m = sample();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.column(0), vec![(0, 3.0), (2, 4.0)]);
        assert!(m.column(1).is_empty());
    }

    #[test]
    fn normalized_column_has_unit_norm() {
        let m = sample();
        assert_eq!(m.normalized_column(0), vec![(0, 0.6), (2, 0.8)]);
        assert!(m.normalized_column(1).is_empty());
    }

    #[test]
    fn dense_copy_matches_sparse() {
        let dense = sample().to_dense();
        assert_eq!(dense.shape(), (3, 3));
        assert_eq!(dense[(2, 0)], 4.0);
        assert_eq!(dense[(1, 2)], 2.0);
        assert_eq!(dense[(1, 1)], 0.0);
    }

    #[test]
    fn zero_matrix_detected() {
        let m = FeatureMatrix::from_columns(0, vec![vec![], vec![]]);
        assert!(m.is_zero());
        assert!(!sample().is_zero());
    }
}
