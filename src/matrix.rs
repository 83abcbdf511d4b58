//! The numeric input of every clustering engine.
//!
//! A [`FeatureMatrix`] is an n × p matrix of finite `f64` values: one row per
//! observation (a school), one column per indicator. Distance-based methods
//! are scale sensitive, so columns are expected to be z-scored before
//! clustering. Callers holding raw values can use
//! [`FeatureMatrix::standardize`], which follows the usual `scale()`
//! convention (sample standard deviation, `n - 1` denominator).

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Validated n × p observation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Wrap an already-scaled matrix.
    ///
    /// Fails with [`Error::InvalidInput`] when there are fewer than two
    /// observations, no columns, or any non-finite entry.
    pub fn new(data: Array2<f64>) -> Result<Self> {
        validate(data.view())?;
        Ok(Self { data })
    }

    /// Build from row vectors.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::invalid_input("no observations"));
        };
        let p = first.len();
        let mut flat = Vec::with_capacity(rows.len() * p);
        for row in rows {
            if row.len() != p {
                return Err(Error::DimensionMismatch {
                    expected: p,
                    found: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), p), flat)
            .map_err(|e| Error::invalid_input(e.to_string()))?;
        Self::new(data)
    }

    /// Z-score every column of `raw`: subtract the column mean and divide by
    /// the sample standard deviation.
    ///
    /// A constant column cannot be scaled and is rejected.
    pub fn standardize(raw: ArrayView2<'_, f64>) -> Result<Self> {
        validate(raw)?;
        let n = raw.nrows() as f64;
        let mut data = raw.to_owned();
        for (j, mut col) in data.axis_iter_mut(Axis(1)).enumerate() {
            let mean = col.sum() / n;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            let sd = var.sqrt();
            if sd == 0.0 || !sd.is_finite() {
                return Err(Error::invalid_input(format!(
                    "column {j} has zero variance and cannot be standardized"
                )));
            }
            col.mapv_inplace(|x| (x - mean) / sd);
        }
        Ok(Self { data })
    }

    /// Number of observations (n).
    pub fn n_obs(&self) -> usize {
        self.data.nrows()
    }

    /// Number of features (p).
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// Feature-wise mean over all observations (the grand centroid).
    pub fn grand_centroid(&self) -> Array1<f64> {
        // n >= 2 is an invariant, so mean_axis never sees an empty axis.
        self.data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.n_features()))
    }
}

fn validate(data: ArrayView2<'_, f64>) -> Result<()> {
    if data.nrows() < 2 {
        return Err(Error::invalid_input(format!(
            "need at least 2 observations, got {}",
            data.nrows()
        )));
    }
    if data.ncols() == 0 {
        return Err(Error::invalid_input("observations have no features"));
    }
    if let Some(((i, j), v)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(Error::invalid_input(format!(
            "non-finite value {v} at row {i}, column {j}"
        )));
    }
    Ok(())
}

/// Squared Euclidean distance between two rows.
#[inline]
pub(crate) fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rejects_non_finite_and_tiny_inputs() {
        assert!(matches!(
            FeatureMatrix::new(array![[1.0, f64::NAN], [0.0, 0.0]]),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            FeatureMatrix::new(array![[1.0, 2.0]]),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn standardize_gives_zero_mean_unit_variance() {
        let raw = array![[1.0, 10.0], [2.0, 20.0], [3.0, 60.0], [6.0, 10.0]];
        let m = FeatureMatrix::standardize(raw.view()).unwrap();
        let n = m.n_obs() as f64;
        for col in m.view().axis_iter(Axis(1)) {
            let mean = col.sum() / n;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn standardize_rejects_constant_column() {
        let raw = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let err = FeatureMatrix::standardize(raw.view()).unwrap_err();
        assert!(err.to_string().contains("column 1"));
    }
}
