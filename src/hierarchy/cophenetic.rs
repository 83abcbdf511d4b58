//! Cophenetic distances: the ultrametric a dendrogram induces.
//!
//! The cophenetic distance between two observations is the height of the
//! lowest merge that puts them in the same cluster. For a monotone dendrogram
//! it satisfies the ultrametric inequality
//!
//! ```text
//! d(x, z) <= max(d(x, y), d(y, z))
//! ```
//!
//! The Pearson correlation between cophenetic and original distances measures
//! how faithfully the tree preserves the input dissimilarities.

use super::Dendrogram;
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};

/// Cophenetic distance matrix of a complete dendrogram.
pub fn cophenetic(tree: &Dendrogram) -> Result<DistanceMatrix> {
    let n = tree.n_items();
    if tree.n_merges() + 1 != n {
        return Err(Error::invalid_input("dendrogram is incomplete"));
    }

    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut square = vec![0.0f64; n * n];
    for m in tree.merges() {
        let (left, right) = (&members[m.left], &members[m.right]);
        for &a in left {
            for &b in right {
                square[a * n + b] = m.height;
                square[b * n + a] = m.height;
            }
        }
        let mut joined = Vec::with_capacity(left.len() + right.len());
        joined.extend_from_slice(left);
        joined.extend_from_slice(right);
        members.push(joined);
    }

    let mut condensed = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..(n - 1) {
        for j in (i + 1)..n {
            condensed.push(square[i * n + j].max(0.0));
        }
    }
    DistanceMatrix::from_condensed(n, condensed)
}

/// Pearson correlation between the cophenetic distances of `tree` and the
/// dissimilarities it was built from.
pub fn cophenetic_correlation(tree: &Dendrogram, distances: &DistanceMatrix) -> Result<f64> {
    if tree.n_items() != distances.n() {
        return Err(Error::DimensionMismatch {
            expected: distances.n(),
            found: tree.n_items(),
        });
    }
    let coph = cophenetic(tree)?;
    Ok(pearson(coph.condensed(), distances.condensed()))
}

/// Whether `distances` satisfies the ultrametric inequality within `tolerance`.
pub fn is_ultrametric(distances: &DistanceMatrix, tolerance: f64) -> bool {
    let n = distances.n();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let d_ik = distances.get(i, k);
                if d_ik > distances.get(i, j).max(distances.get(j, k)) + tolerance {
                    return false;
                }
            }
        }
    }
    true
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return 0.0;
    }
    sxy / (sxx * syy).sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cluster::{HierarchicalClustering, Linkage};
    use crate::matrix::FeatureMatrix;

    #[test]
    fn cophenetic_on_a_line() {
        let data = FeatureMatrix::from_rows(&[vec![0.0], vec![1.0], vec![10.0]]).unwrap();
        let dist = DistanceMatrix::from_features(&data).unwrap();
        let tree = HierarchicalClustering::new(1)
            .with_linkage(Linkage::Single)
            .fit_dendrogram(&dist)
            .unwrap();

        let coph = cophenetic(&tree).unwrap();
        assert_eq!(coph.get(0, 1), 1.0);
        assert_eq!(coph.get(0, 2), 9.0);
        assert_eq!(coph.get(1, 2), 9.0);
        assert!(is_ultrametric(&coph, 1e-12));
    }

    #[test]
    fn well_separated_groups_correlate_strongly() {
        let data = FeatureMatrix::from_rows(&[
            vec![0.0, 0.0],
            vec![0.2, 0.1],
            vec![0.1, 0.3],
            vec![20.0, 20.0],
            vec![20.1, 20.2],
            vec![19.9, 20.1],
        ])
        .unwrap();
        let dist = DistanceMatrix::from_features(&data).unwrap();
        for linkage in [Linkage::Average, Linkage::Complete, Linkage::Ward] {
            let tree = HierarchicalClustering::new(2)
                .with_linkage(linkage)
                .fit_dendrogram(&dist)
                .unwrap();
            let r = cophenetic_correlation(&tree, &dist).unwrap();
            assert!(r > 0.95, "{linkage:?}: {r}");
        }
    }
}
