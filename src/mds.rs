//! Classical (Torgerson) multidimensional scaling.
//!
//! Embeds a dissimilarity matrix into q Euclidean dimensions:
//!
//! ```text
//! 1. A = D ∘ D                       (squared dissimilarities)
//! 2. B = -½ J A J,  J = I - 11ᵀ/n    (double centering → Gram matrix)
//! 3. B = U Λ Uᵀ                      (symmetric eigendecomposition)
//! 4. Z = U_q Λ_q^{1/2}               (q largest eigenpairs)
//! ```
//!
//! When D is Euclidean and the points span at most q dimensions, the
//! pairwise distances of Z reproduce D exactly.
//!
//! # Negative Eigenvalues
//!
//! A non-Euclidean dissimilarity produces negative eigenvalues. Eigenvalues
//! within `1e-9 · λ_max` of zero are rounding noise from a rank-deficient B
//! and are clamped to zero (that coordinate is identically 0). A q-th
//! eigenvalue below `-1e-9 · λ_max` is a genuine failure to embed and yields
//! [`Error::NonEmbeddable`].
//!
//! # Non-guarantees
//!
//! Coordinates are defined up to an orthogonal transform: the sign of each
//! column is arbitrary, and so is the basis within any repeated eigenvalue.
//! Only pairwise distances of the embedding are meaningful.

use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use faer::{Mat, Side};
use ndarray::Array2;

/// Relative tolerance separating numerical zeros from real eigenvalues.
const EIGEN_RTOL: f64 = 1e-9;

/// Classical MDS configuration.
#[derive(Debug, Clone)]
pub struct ClassicalMds {
    /// Target dimension.
    dim: usize,
}

/// Output of [`ClassicalMds::embed`].
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// n × q coordinates.
    pub coords: Array2<f64>,
    /// Every eigenvalue of the Gram matrix, largest first.
    pub eigenvalues: Vec<f64>,
    /// Share of the positive spectrum captured by the q retained dimensions.
    pub goodness_of_fit: f64,
}

impl Default for ClassicalMds {
    fn default() -> Self {
        Self { dim: 2 }
    }
}

impl ClassicalMds {
    /// Embed into `dim` dimensions.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// Target dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed `distances` into `dim` dimensions.
    pub fn embed(&self, distances: &DistanceMatrix) -> Result<Embedding> {
        let n = distances.n();
        let q = self.dim;
        if q == 0 || q >= n {
            return Err(Error::InvalidParameter {
                name: "dim",
                message: "embedding dimension must lie in 1..n",
            });
        }

        let gram = double_centered(distances);
        let evd = gram.selfadjoint_eigendecomposition(Side::Lower);
        let values = evd.s().column_vector();
        let vectors = evd.u();

        // Largest first; the index tie-break keeps the order deterministic.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| values.read(b).total_cmp(&values.read(a)).then(a.cmp(&b)));
        let eigenvalues: Vec<f64> = order.iter().map(|&i| values.read(i)).collect();

        let largest = eigenvalues[0];
        let tol = EIGEN_RTOL * largest.abs().max(f64::MIN_POSITIVE);
        let available = eigenvalues.iter().filter(|&&l| l > tol).count();
        let qth = eigenvalues[q - 1];
        if qth < -tol {
            return Err(Error::NonEmbeddable {
                requested: q,
                available,
            });
        }
        if available < q {
            log::warn!(
                "classical MDS: only {available} of {q} leading eigenvalues are positive; clamping the rest to zero"
            );
        }

        let mut coords = Array2::zeros((n, q));
        for (c, &src) in order.iter().take(q).enumerate() {
            let lambda = eigenvalues[c];
            if lambda <= tol {
                continue;
            }
            let scale = lambda.sqrt();
            for i in 0..n {
                coords[[i, c]] = vectors.read(i, src) * scale;
            }
        }

        let positive: f64 = eigenvalues.iter().map(|l| l.max(0.0)).sum();
        let retained: f64 = eigenvalues.iter().take(q).map(|l| l.max(0.0)).sum();
        let goodness_of_fit = if positive > 0.0 {
            retained / positive
        } else {
            0.0
        };

        Ok(Embedding {
            coords,
            eigenvalues,
            goodness_of_fit,
        })
    }
}

/// B = -½ J (D ∘ D) J.
fn double_centered(distances: &DistanceMatrix) -> Mat<f64> {
    let n = distances.n();
    let sq = Mat::<f64>::from_fn(n, n, |i, j| distances.get(i, j).powi(2));

    let row_means: Vec<f64> = (0..n)
        .map(|i| (0..n).map(|j| sq.read(i, j)).sum::<f64>() / n as f64)
        .collect();
    let grand = row_means.iter().sum::<f64>() / n as f64;

    // D∘D is symmetric, so column means equal row means.
    Mat::<f64>::from_fn(n, n, |i, j| {
        -0.5 * (sq.read(i, j) - row_means[i] - row_means[j] + grand)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::matrix::FeatureMatrix;
    use rand::prelude::*;

    fn distances_of(rows: &[Vec<f64>]) -> DistanceMatrix {
        DistanceMatrix::from_features(&FeatureMatrix::from_rows(rows).unwrap()).unwrap()
    }

    fn max_distance_error(original: &DistanceMatrix, coords: &Array2<f64>) -> f64 {
        let embedded = DistanceMatrix::euclidean(coords.view()).unwrap();
        original
            .condensed()
            .iter()
            .zip(embedded.condensed())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn round_trip_for_planar_points_in_3d() {
        let mut rng = StdRng::seed_from_u64(5);
        let rows: Vec<Vec<f64>> = (0..25)
            .map(|_| {
                let (u, v): (f64, f64) = (rng.random_range(-3.0..3.0), rng.random_range(-3.0..3.0));
                vec![u + v, u - 2.0 * v, 0.5 * u]
            })
            .collect();
        let dist = distances_of(&rows);

        let emb = ClassicalMds::new(2).embed(&dist).unwrap();
        assert_eq!(emb.coords.dim(), (25, 2));
        assert!(max_distance_error(&dist, &emb.coords) < 1e-8);
        assert!((emb.goodness_of_fit - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collinear_points_clamp_the_second_axis() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let dist = distances_of(&rows);

        let emb = ClassicalMds::new(2).embed(&dist).unwrap();
        assert!(emb.coords.column(1).iter().all(|&z| z == 0.0));
        assert!(max_distance_error(&dist, &emb.coords) < 1e-8);
    }

    #[test]
    fn eigenvalues_are_sorted_descending() {
        let rows: Vec<Vec<f64>> = (0..8)
            .map(|i| vec![(i as f64).sin(), (i as f64).cos(), i as f64 * 0.3])
            .collect();
        let dist = distances_of(&rows);
        let emb = ClassicalMds::new(3).embed(&dist).unwrap();
        assert!(emb.eigenvalues.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn non_euclidean_dissimilarity_is_rejected() {
        // Three pairs at dissimilarity 2, everything else at 1. The Gram
        // spectrum is {2, 2, 2, 0, -1, -1}.
        let n = 6;
        let mut condensed = Vec::new();
        for i in 0..n - 1 {
            for j in i + 1..n {
                condensed.push(if j == i + 1 && i % 2 == 0 { 2.0 } else { 1.0 });
            }
        }
        let dist = DistanceMatrix::from_condensed(n, condensed).unwrap();

        let emb = ClassicalMds::new(3).embed(&dist).unwrap();
        assert!((emb.eigenvalues[0] - 2.0).abs() < 1e-9);
        assert!((emb.eigenvalues[5] + 1.0).abs() < 1e-9);

        assert!(matches!(
            ClassicalMds::new(5).embed(&dist),
            Err(Error::NonEmbeddable {
                requested: 5,
                available: 3
            })
        ));
    }

    #[test]
    fn dimension_must_be_below_n() {
        let dist = DistanceMatrix::from_condensed(3, vec![1.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            ClassicalMds::new(3).embed(&dist),
            Err(Error::InvalidParameter { name: "dim", .. })
        ));
        assert!(ClassicalMds::new(0).embed(&dist).is_err());
    }
}
