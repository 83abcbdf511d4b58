//! Hard cluster assignments.
//!
//! Labels are arbitrary: cluster 0 of one run has nothing to do with cluster 0
//! of another run or of another k. Compare partitions with
//! [`crate::metrics::Contingency`] or [`crate::metrics::adjusted_rand_index`],
//! never by label equality.

use crate::error::{Error, Result};

/// Mapping from observation index to a label in `0..k`, every label used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    k: usize,
}

impl ClusterAssignment {
    /// Validate `labels` against `k`.
    ///
    /// Every label must be `< k` and every cluster `0..k` must have at least
    /// one member.
    pub fn new(labels: Vec<usize>, k: usize) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::invalid_input("assignment has no observations"));
        }
        if k == 0 || k > labels.len() {
            return Err(Error::InvalidK {
                k,
                min: 1,
                max: labels.len(),
            });
        }
        let mut sizes = vec![0usize; k];
        for (i, &l) in labels.iter().enumerate() {
            if l >= k {
                return Err(Error::invalid_input(format!(
                    "observation {i} has label {l}, expected < {k}"
                )));
            }
            sizes[l] += 1;
        }
        if let Some(empty) = sizes.iter().position(|&s| s == 0) {
            return Err(Error::invalid_input(format!("cluster {empty} has no members")));
        }
        Ok(Self { labels, k })
    }

    /// Build from arbitrary labels, renumbering them to `0..k` in order of
    /// first appearance.
    pub fn from_labels(labels: &[usize]) -> Result<Self> {
        let mut seen: Vec<usize> = Vec::new();
        let canonical: Vec<usize> = labels
            .iter()
            .map(|l| match seen.iter().position(|s| s == l) {
                Some(p) => p,
                None => {
                    seen.push(*l);
                    seen.len() - 1
                }
            })
            .collect();
        Self::new(canonical, seen.len())
    }

    /// Label of every observation.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Label of observation `i`.
    pub fn label(&self, i: usize) -> usize {
        self.labels[i]
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of observations.
    pub fn n_obs(&self) -> usize {
        self.labels.len()
    }

    /// Members per cluster.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }

    /// Observation indices of cluster `c`, ascending.
    pub fn members(&self, c: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| (l == c).then_some(i))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn validates_labels() {
        assert!(ClusterAssignment::new(vec![0, 1, 1], 2).is_ok());
        assert!(ClusterAssignment::new(vec![0, 2, 2], 3).is_err());
        assert!(ClusterAssignment::new(vec![0, 3], 2).is_err());
        assert!(matches!(
            ClusterAssignment::new(vec![0, 0], 0),
            Err(Error::InvalidK { k: 0, .. })
        ));
    }

    #[test]
    fn from_labels_renumbers_by_first_appearance() {
        let a = ClusterAssignment::from_labels(&[7, 3, 7, 9]).unwrap();
        assert_eq!(a.labels(), &[0, 1, 0, 2]);
        assert_eq!(a.k(), 3);
        assert_eq!(a.sizes(), vec![2, 1, 1]);
        assert_eq!(a.members(0), vec![0, 2]);
    }
}
