//! Internal cluster-quality measures.
//!
//! These judge a partition against the data alone, without a reference
//! labeling (see [`crate::metrics`] for agreement with a withheld label).
//!
//! | Measure | Range | Reads |
//! |---------|-------|-------|
//! | [`silhouette`] | [-1, 1] | how much closer a point is to its own cluster than to the next one |
//! | [`sum_of_squares`] | ≥ 0 | within / between decomposition of total variance |
//! | [`Dendrogram::agglomerative_coefficient`] | [0, 1] | strength of nested structure |
//!
//! # Silhouette
//!
//! For observation i in cluster C:
//!
//! ```text
//! a(i) = mean distance from i to the other members of C   (0 if |C| = 1)
//! b(i) = min over C' ≠ C of mean distance from i to C'
//! s(i) = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! with `s(i) = 0` for singletons and whenever `max(a, b) = 0`.
//!
//! # Sum-of-squares decomposition
//!
//! ```text
//! TSS = Σᵢ ||xᵢ - x̄||²  =  Σ_c Σᵢ∈c ||xᵢ - μ_c||²  +  Σ_c n_c ||μ_c - x̄||²
//!                               (within, WSS)            (between, BSS)
//! ```

use crate::assignment::ClusterAssignment;
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use crate::hierarchy::Dendrogram;
use crate::matrix::{squared_distance, FeatureMatrix};
use ndarray::Array2;

/// Silhouette widths of a partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Silhouette {
    /// `s(i)` for every observation.
    pub values: Vec<f64>,
    /// Cluster attaining `b(i)` for every observation.
    pub neighbors: Vec<usize>,
    /// Mean silhouette per cluster.
    pub cluster_means: Vec<f64>,
    /// Mean silhouette over all observations.
    pub mean: f64,
}

/// Within/between sum-of-squares decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct SumOfSquares {
    /// Within-cluster SS per cluster.
    pub within: Vec<f64>,
    /// Sum of `within`.
    pub total_within: f64,
    /// Between-cluster SS.
    pub between: f64,
    /// Total SS about the grand centroid.
    pub total: f64,
}

impl SumOfSquares {
    /// Share of total variance explained by the partition, `between / total`.
    pub fn between_ratio(&self) -> f64 {
        if self.total > 0.0 {
            self.between / self.total
        } else {
            0.0
        }
    }
}

/// Quality measures of one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    /// Agglomerative coefficient of the tree the assignment was cut from.
    pub agglomerative_coefficient: Option<f64>,
    /// Silhouette widths; absent for a single cluster.
    pub silhouette: Option<Silhouette>,
    /// Sum-of-squares decomposition.
    pub sum_of_squares: SumOfSquares,
}

impl QualityReport {
    /// Evaluate `assignment`. Pass the dendrogram when the assignment came
    /// from a hierarchical cut to include the agglomerative coefficient.
    pub fn evaluate(
        data: &FeatureMatrix,
        distances: &DistanceMatrix,
        assignment: &ClusterAssignment,
        tree: Option<&Dendrogram>,
    ) -> Result<Self> {
        let agglomerative_coefficient = tree
            .map(Dendrogram::agglomerative_coefficient)
            .transpose()?;
        let silhouette = if assignment.k() >= 2 {
            Some(silhouette(distances, assignment)?)
        } else {
            None
        };
        Ok(Self {
            agglomerative_coefficient,
            silhouette,
            sum_of_squares: sum_of_squares(data, assignment)?,
        })
    }

    /// Mean silhouette, if defined.
    pub fn mean_silhouette(&self) -> Option<f64> {
        self.silhouette.as_ref().map(|s| s.mean)
    }
}

/// Silhouette widths of `assignment` under `distances`.
///
/// Requires at least two clusters.
pub fn silhouette(
    distances: &DistanceMatrix,
    assignment: &ClusterAssignment,
) -> Result<Silhouette> {
    let n = distances.n();
    check_len(n, assignment)?;
    let k = assignment.k();
    if k < 2 {
        return Err(Error::InvalidK { k, min: 2, max: n });
    }

    let sizes = assignment.sizes();
    let mut values = Vec::with_capacity(n);
    let mut neighbors = Vec::with_capacity(n);
    let mut sums = vec![0.0f64; k];
    for i in 0..n {
        sums.iter_mut().for_each(|s| *s = 0.0);
        for j in 0..n {
            sums[assignment.label(j)] += distances.get(i, j);
        }

        let own = assignment.label(i);
        let (neighbor, b) = (0..k)
            .filter(|&c| c != own)
            .map(|c| (c, sums[c] / sizes[c] as f64))
            .fold((own, f64::INFINITY), |best, cand| {
                if cand.1 < best.1 {
                    cand
                } else {
                    best
                }
            });
        neighbors.push(neighbor);

        if sizes[own] == 1 {
            values.push(0.0);
            continue;
        }
        let a = sums[own] / (sizes[own] - 1) as f64;
        let m = a.max(b);
        values.push(if m > 0.0 { (b - a) / m } else { 0.0 });
    }

    let mut cluster_sums = vec![0.0f64; k];
    for (i, v) in values.iter().enumerate() {
        cluster_sums[assignment.label(i)] += v;
    }
    let cluster_means = cluster_sums
        .iter()
        .zip(&sizes)
        .map(|(s, &c)| s / c as f64)
        .collect();
    let mean = values.iter().sum::<f64>() / n as f64;

    Ok(Silhouette {
        values,
        neighbors,
        cluster_means,
        mean,
    })
}

/// Within/between sum-of-squares decomposition of `assignment`.
pub fn sum_of_squares(
    data: &FeatureMatrix,
    assignment: &ClusterAssignment,
) -> Result<SumOfSquares> {
    let n = data.n_obs();
    check_len(n, assignment)?;
    let centroids = centroids(data, assignment);
    let grand = data.grand_centroid();

    let mut within = vec![0.0f64; assignment.k()];
    let mut total = 0.0;
    for i in 0..n {
        let c = assignment.label(i);
        within[c] += squared_distance(data.row(i), centroids.row(c));
        total += squared_distance(data.row(i), grand.view());
    }
    let between: f64 = assignment
        .sizes()
        .iter()
        .enumerate()
        .map(|(c, &size)| size as f64 * squared_distance(centroids.row(c), grand.view()))
        .sum();

    Ok(SumOfSquares {
        total_within: within.iter().sum(),
        within,
        between,
        total,
    })
}

/// k × p matrix of cluster means.
pub fn centroids(data: &FeatureMatrix, assignment: &ClusterAssignment) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros((assignment.k(), data.n_features()));
    for (i, &c) in assignment.labels().iter().enumerate() {
        let mut row = sums.row_mut(c);
        row += &data.row(i);
    }
    for (mut row, size) in sums.rows_mut().into_iter().zip(assignment.sizes()) {
        row /= size as f64;
    }
    sums
}

fn check_len(n: usize, assignment: &ClusterAssignment) -> Result<()> {
    if assignment.n_obs() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: assignment.n_obs(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn six() -> FeatureMatrix {
        FeatureMatrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![10.0, 10.0],
            vec![10.0, 11.0],
            vec![11.0, 10.0],
        ])
        .unwrap()
    }

    #[test]
    fn separated_triples_have_high_silhouette() {
        let data = six();
        let dist = DistanceMatrix::from_features(&data).unwrap();
        let a = ClusterAssignment::new(vec![0, 0, 0, 1, 1, 1], 2).unwrap();
        let s = silhouette(&dist, &a).unwrap();
        assert!(s.values.iter().all(|&v| v > 0.9), "{:?}", s.values);
        assert_eq!(s.neighbors, vec![1, 1, 1, 0, 0, 0]);
        assert_eq!(s.cluster_means.len(), 2);
        assert!(s.mean > 0.9);
    }

    #[test]
    fn singleton_silhouette_is_zero() {
        let data = six();
        let dist = DistanceMatrix::from_features(&data).unwrap();
        let a = ClusterAssignment::new(vec![0, 0, 0, 1, 1, 2], 3).unwrap();
        let s = silhouette(&dist, &a).unwrap();
        assert_eq!(s.values[5], 0.0);
        assert_eq!(s.cluster_means[2], 0.0);
    }

    #[test]
    fn silhouette_needs_two_clusters() {
        let data = six();
        let dist = DistanceMatrix::from_features(&data).unwrap();
        let a = ClusterAssignment::new(vec![0; 6], 1).unwrap();
        assert!(matches!(silhouette(&dist, &a), Err(Error::InvalidK { k: 1, .. })));

        let report = QualityReport::evaluate(&data, &dist, &a, None).unwrap();
        assert!(report.silhouette.is_none());
        assert!(report.sum_of_squares.between.abs() < 1e-12);
    }

    #[test]
    fn sum_of_squares_by_hand() {
        let data =
            FeatureMatrix::from_rows(&[vec![0.0], vec![2.0], vec![10.0], vec![12.0]]).unwrap();
        let a = ClusterAssignment::new(vec![0, 0, 1, 1], 2).unwrap();
        let ss = sum_of_squares(&data, &a).unwrap();
        assert_eq!(ss.within, vec![2.0, 2.0]);
        assert_eq!(ss.total_within, 4.0);
        // centroids 1 and 11 around grand mean 6
        assert_eq!(ss.between, 100.0);
        assert_eq!(ss.total, 104.0);
        assert!((ss.between_ratio() - 100.0 / 104.0).abs() < 1e-15);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let data = six();
        let a = ClusterAssignment::new(vec![0, 1], 2).unwrap();
        assert!(matches!(
            sum_of_squares(&data, &a),
            Err(Error::DimensionMismatch { expected: 6, found: 2 })
        ));
    }

    fn data_and_labels() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<usize>)> {
        (3usize..30).prop_flat_map(|n| {
            (
                proptest::collection::vec(proptest::collection::vec(-20.0f64..20.0, 3), n),
                proptest::collection::vec(0usize..3, n),
            )
        })
    }

    proptest! {
        #[test]
        fn within_plus_between_is_total((rows, labels) in data_and_labels()) {
            let data = FeatureMatrix::from_rows(&rows).unwrap();
            let a = ClusterAssignment::from_labels(&labels).unwrap();
            let ss = sum_of_squares(&data, &a).unwrap();
            let tol = 1e-6 * ss.total.max(1e-12);
            prop_assert!((ss.total_within + ss.between - ss.total).abs() <= tol);
        }

        #[test]
        fn silhouettes_are_bounded((rows, labels) in data_and_labels()) {
            let data = FeatureMatrix::from_rows(&rows).unwrap();
            let a = ClusterAssignment::from_labels(&labels).unwrap();
            prop_assume!(a.k() >= 2);
            let dist = DistanceMatrix::from_features(&data).unwrap();
            let s = silhouette(&dist, &a).unwrap();
            prop_assert!(s.values.iter().all(|v| (-1.0..=1.0).contains(v)));
            prop_assert!((-1.0..=1.0).contains(&s.mean));
        }
    }
}
