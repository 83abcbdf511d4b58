//! Pairwise Euclidean dissimilarities.
//!
//! The matrix is stored condensed: the strict upper triangle, row-major, of
//! length `n(n-1)/2`. This is the layout SciPy and `kodama` use, and it
//! halves the memory of the square form while keeping `get(i, j)` O(1).

use crate::error::{Error, Result};
use crate::matrix::{squared_distance, FeatureMatrix};
use ndarray::{Array2, ArrayView2};

/// Symmetric, zero-diagonal, non-negative n × n dissimilarity matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    condensed: Vec<f64>,
}

impl DistanceMatrix {
    /// Euclidean distances between the rows of `rows`.
    ///
    /// Fails with [`Error::InvalidInput`] if there are fewer than two rows or
    /// any entry is non-finite.
    pub fn euclidean(rows: ArrayView2<'_, f64>) -> Result<Self> {
        let n = rows.nrows();
        if n < 2 {
            return Err(Error::invalid_input(format!(
                "distance matrix needs at least 2 observations, got {n}"
            )));
        }
        if let Some(((i, _), _)) = rows.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::invalid_input(format!("row {i} has a non-finite value")));
        }

        let mut condensed = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..(n - 1) {
            for j in (i + 1)..n {
                condensed.push(squared_distance(rows.row(i), rows.row(j)).sqrt());
            }
        }
        Ok(Self { n, condensed })
    }

    /// Euclidean distances between the observations of a feature matrix.
    pub fn from_features(data: &FeatureMatrix) -> Result<Self> {
        Self::euclidean(data.view())
    }

    /// Wrap a precomputed condensed dissimilarity vector.
    pub fn from_condensed(n: usize, condensed: Vec<f64>) -> Result<Self> {
        if n < 2 {
            return Err(Error::invalid_input(format!(
                "distance matrix needs at least 2 observations, got {n}"
            )));
        }
        let expected = n * (n - 1) / 2;
        if condensed.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: condensed.len(),
            });
        }
        if let Some(v) = condensed.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(Error::invalid_input(format!(
                "dissimilarities must be finite and non-negative, found {v}"
            )));
        }
        Ok(Self { n, condensed })
    }

    /// Number of observations.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Dissimilarity between observations `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "index out of bounds");
        match i.cmp(&j) {
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => self.condensed[self.offset(i, j)],
            std::cmp::Ordering::Greater => self.condensed[self.offset(j, i)],
        }
    }

    /// The condensed upper triangle.
    pub fn condensed(&self) -> &[f64] {
        &self.condensed
    }

    /// Expand to a full square matrix.
    pub fn to_square(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.n, self.n), |(i, j)| self.get(i, j))
    }

    /// Position of pair (i, j), i < j, in the condensed vector.
    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }
}
