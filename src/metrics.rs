//! Partition agreement.
//!
//! Cluster labels are arbitrary, so two partitions (K-means vs. a
//! hierarchical cut, two seeds, two values of k, or clusters vs. a withheld
//! categorical label) are compared through their contingency table, never
//! by label equality.
//!
//! | Metric | Range | Best | Properties |
//! |--------|-------|------|------------|
//! | [`adjusted_rand_index`] | [-1, 1] | 1 | Chance-corrected pair counting |
//! | [`nmi`] | [0, 1] | 1 | Normalized mutual information |
//! | [`purity`] | [0, 1] | 1 | Simple, biased toward many clusters |
//!
//! # Example
//!
//! ```rust
//! use cohort::metrics::{adjusted_rand_index, Contingency};
//!
//! let kmeans = [1, 1, 0, 0, 2, 2];
//! let ward = [0, 0, 1, 1, 2, 2];
//! assert_eq!(adjusted_rand_index(&kmeans, &ward), 1.0);
//!
//! let table = Contingency::new(&kmeans, &ward);
//! assert_eq!(table.best_match(1), Some(0));
//! ```
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)
//! - Strehl & Ghosh (2002). "Cluster ensembles" (NMI)

use std::collections::BTreeMap;

/// Cross-tabulation of two labelings of the same observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contingency {
    counts: BTreeMap<(usize, usize), usize>,
    rows: BTreeMap<usize, usize>,
    cols: BTreeMap<usize, usize>,
    n: usize,
}

impl Contingency {
    /// Tabulate `a` (rows) against `b` (columns). Extra entries of the longer
    /// slice are ignored.
    pub fn new(a: &[usize], b: &[usize]) -> Self {
        let mut counts = BTreeMap::new();
        let mut rows = BTreeMap::new();
        let mut cols = BTreeMap::new();
        let mut n = 0;
        for (&x, &y) in a.iter().zip(b) {
            *counts.entry((x, y)).or_insert(0) += 1;
            *rows.entry(x).or_insert(0) += 1;
            *cols.entry(y).or_insert(0) += 1;
            n += 1;
        }
        Self {
            counts,
            rows,
            cols,
            n,
        }
    }

    /// Observations labeled `x` in `a` and `y` in `b`.
    pub fn count(&self, x: usize, y: usize) -> usize {
        self.counts.get(&(x, y)).copied().unwrap_or(0)
    }

    /// Row labels (labels of `a`), ascending.
    pub fn row_labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    /// Column labels (labels of `b`), ascending.
    pub fn col_labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.cols.keys().copied()
    }

    /// Number of observations tabulated.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Column label with the largest overlap with row label `x` (lowest
    /// label on ties). `None` if `x` does not occur.
    pub fn best_match(&self, x: usize) -> Option<usize> {
        self.counts
            .range((x, 0)..=(x, usize::MAX))
            .fold(None, |best: Option<(usize, usize)>, (&(_, y), &c)| match best {
                Some((_, bc)) if bc >= c => best,
                _ => Some((y, c)),
            })
            .map(|(y, _)| y)
    }
}

/// Adjusted Rand Index between two labelings.
///
/// 0 is the expected value for independent partitions, 1 is identical
/// partitions up to relabeling.
pub fn adjusted_rand_index(a: &[usize], b: &[usize]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let table = Contingency::new(a, b);

    let sum_comb_ij: f64 = table.counts.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_a: f64 = table.rows.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_b: f64 = table.cols.values().map(|&c| comb2(c) as f64).sum();
    let comb_n = comb2(table.n) as f64;
    if comb_n == 0.0 {
        return 1.0;
    }

    // ARI = (index - expected) / (max - expected)
    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;
    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }
    (sum_comb_ij - expected) / denom
}

/// Normalized Mutual Information, `2 I(A; B) / (H(A) + H(B))`.
pub fn nmi(a: &[usize], b: &[usize]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let table = Contingency::new(a, b);
    let n = table.n as f64;

    let h_a = entropy(table.rows.values(), n);
    let h_b = entropy(table.cols.values(), n);

    let mut mi = 0.0;
    for (&(x, y), &c) in &table.counts {
        let p_xy = c as f64 / n;
        let p_x = table.rows[&x] as f64 / n;
        let p_y = table.cols[&y] as f64 / n;
        mi += p_xy * (p_xy / (p_x * p_y)).ln();
    }

    let denom = h_a + h_b;
    if denom > 0.0 {
        2.0 * mi / denom
    } else {
        1.0
    }
}

/// Purity of `pred` with respect to `truth`: the share of observations that
/// belong to the majority `truth` class of their `pred` cluster.
///
/// Purity increases with more clusters and is 1.0 when each point is its
/// own cluster.
pub fn purity(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }
    let table = Contingency::new(pred, truth);
    let correct: usize = table
        .row_labels()
        .filter_map(|x| table.best_match(x).map(|y| table.count(x, y)))
        .sum();
    correct as f64 / table.n as f64
}

fn entropy<'a>(counts: impl Iterator<Item = &'a usize>, n: f64) -> f64 {
    counts
        .map(|&c| {
            let p = c as f64 / n;
            if p > 0.0 {
                -p * p.ln()
            } else {
                0.0
            }
        })
        .sum()
}

fn comb2(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ari_perfect_and_permuted() {
        assert_eq!(adjusted_rand_index(&[0, 0, 1, 1], &[0, 0, 1, 1]), 1.0);
        assert_eq!(adjusted_rand_index(&[1, 1, 0, 0, 2, 2], &[0, 0, 1, 1, 2, 2]), 1.0);
    }

    #[test]
    fn test_ari_disagreement_is_low() {
        let ari = adjusted_rand_index(&[0, 1, 0, 1, 0, 1], &[0, 0, 0, 1, 1, 1]);
        assert!(ari < 0.1, "{ari}");
    }

    #[test]
    fn test_nmi_permuted() {
        // Same clustering, different labels
        let pred = [1, 1, 0, 0, 2, 2];
        let truth = [0, 0, 1, 1, 2, 2];
        assert!((nmi(&pred, &truth) - 1.0).abs() < 1e-12);
        assert!(nmi(&[0, 1, 0, 1], &[0, 0, 1, 1]) < 0.5);
    }

    #[test]
    fn test_purity_overclustering() {
        // Each point is its own cluster
        assert_eq!(purity(&[0, 1, 2, 3], &[0, 0, 1, 1]), 1.0);
        assert_eq!(purity(&[0, 0, 0, 0], &[0, 0, 1, 1]), 0.5);
    }

    #[test]
    fn contingency_counts_and_matches() {
        let t = Contingency::new(&[0, 0, 0, 1, 1], &[5, 5, 6, 6, 6]);
        assert_eq!(t.count(0, 5), 2);
        assert_eq!(t.count(1, 5), 0);
        assert_eq!(t.best_match(0), Some(5));
        assert_eq!(t.best_match(1), Some(6));
        assert_eq!(t.best_match(9), None);
        assert_eq!(t.row_labels().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(t.col_labels().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(t.n(), 5);
    }
}
