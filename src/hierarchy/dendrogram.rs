//! Dendrogram (merge tree) produced by agglomerative clustering.
//!
//! A dendrogram over n observations records n - 1 merges. Ids follow the
//! SciPy/`kodama` convention: leaves are `0..n` and merge `s` creates
//! cluster `n + s`.

use crate::assignment::ClusterAssignment;
use crate::error::{Error, Result};

/// Merge history of an agglomerative clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    merges: Vec<Merge>,
    n_items: usize,
}

/// A single merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Smaller id of the two merged clusters.
    pub left: usize,
    /// Larger id of the two merged clusters.
    pub right: usize,
    /// Dissimilarity at which the merge happened.
    pub height: f64,
    /// Number of observations in the merged cluster.
    pub size: usize,
}

impl Dendrogram {
    /// Empty dendrogram over `n_items` leaves.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Record the next merge. The new cluster id is `n_items + n_merges()`.
    ///
    /// Both ids must name distinct clusters that exist and have not been
    /// merged yet, and the tree must not be complete already.
    pub fn add_merge(&mut self, a: usize, b: usize, height: f64, size: usize) -> Result<()> {
        let next = self.merge_id(self.merges.len());
        if self.merges.len() + 1 >= self.n_items.max(1) {
            return Err(Error::invalid_input(format!(
                "dendrogram over {} items already has all its merges",
                self.n_items
            )));
        }
        if a == b {
            return Err(Error::invalid_input(format!("cannot merge cluster {a} with itself")));
        }
        for id in [a, b] {
            if id >= next {
                return Err(Error::invalid_input(format!(
                    "cluster {id} does not exist before merge {}",
                    self.merges.len()
                )));
            }
            if self.merges.iter().any(|m| m.left == id || m.right == id) {
                return Err(Error::invalid_input(format!("cluster {id} was already merged")));
            }
        }
        if !height.is_finite() || height < 0.0 {
            return Err(Error::invalid_input(format!(
                "merge height {height} is not a valid dissimilarity"
            )));
        }
        self.merges.push(Merge {
            left: a.min(b),
            right: a.max(b),
            height,
            size,
        });
        Ok(())
    }

    /// Id of the cluster created by merge `step`.
    pub fn merge_id(&self, step: usize) -> usize {
        self.n_items + step
    }

    /// Number of original observations.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges in the order they happened.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Merge heights in merge order.
    pub fn heights(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.height).collect()
    }

    /// Assignment into exactly `k` clusters, obtained by undoing the last
    /// `k - 1` merges.
    ///
    /// Labels are numbered in order of first appearance over observations,
    /// so observation 0 is always in cluster 0.
    pub fn cut_to_k(&self, k: usize) -> Result<ClusterAssignment> {
        if k == 0 || k > self.n_items {
            return Err(Error::InvalidK {
                k,
                min: 1,
                max: self.n_items,
            });
        }
        let steps = self.n_items - k;
        if steps > self.merges.len() {
            return Err(Error::invalid_input(format!(
                "dendrogram has {} merges, cutting to {k} clusters needs {steps}",
                self.merges.len()
            )));
        }
        self.components(steps)
    }

    /// Assignment obtained by applying every merge up to and including the
    /// last one with `height <= threshold`.
    pub fn cut_at_height(&self, threshold: f64) -> Result<ClusterAssignment> {
        let steps = self
            .merges
            .iter()
            .take_while(|m| m.height <= threshold)
            .count();
        self.components(steps)
    }

    /// Agglomerative coefficient (Kaufman & Rousseeuw).
    ///
    /// For each observation, `m(i)` is the height of the merge in which it
    /// first joins another cluster. The coefficient is
    /// `1 - mean(m(i) / final_height)`, in [0, 1]; values near 1 mean
    /// observations merge early relative to the final merge, i.e. strong
    /// clustering structure. Returns 0 when the final height is 0.
    pub fn agglomerative_coefficient(&self) -> Result<f64> {
        let Some(last) = self.merges.last() else {
            return Err(Error::invalid_input("dendrogram has no merges"));
        };
        if self.merges.len() + 1 != self.n_items {
            return Err(Error::invalid_input("dendrogram is incomplete"));
        }
        let final_height = last.height;
        if final_height <= 0.0 {
            return Ok(0.0);
        }

        let mut first = vec![f64::NAN; self.n_items];
        for m in &self.merges {
            for id in [m.left, m.right] {
                if id < self.n_items && first[id].is_nan() {
                    first[id] = m.height;
                }
            }
        }
        let mean_ratio =
            first.iter().map(|h| h / final_height).sum::<f64>() / self.n_items as f64;
        Ok(1.0 - mean_ratio)
    }

    /// Connected components after applying the first `steps` merges.
    fn components(&self, steps: usize) -> Result<ClusterAssignment> {
        let total = self.n_items + self.merges.len();
        let mut parent: Vec<usize> = (0..total).collect();
        for (s, m) in self.merges.iter().take(steps).enumerate() {
            let id = self.merge_id(s);
            if m.left >= id || m.right >= id {
                return Err(Error::invalid_input(format!(
                    "merge {s} references a cluster that does not exist yet"
                )));
            }
            parent[m.left] = id;
            parent[m.right] = id;
        }

        let roots: Vec<usize> = (0..self.n_items)
            .map(|leaf| {
                let mut c = leaf;
                while parent[c] != c {
                    c = parent[c];
                }
                c
            })
            .collect();
        ClusterAssignment::from_labels(&roots)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// ((0 1) 2) (3 4) joined at the top.
    fn five() -> Dendrogram {
        let mut d = Dendrogram::new(5);
        d.add_merge(0, 1, 1.0, 2).unwrap(); // 5
        d.add_merge(3, 4, 2.0, 2).unwrap(); // 6
        d.add_merge(5, 2, 3.0, 3).unwrap(); // 7
        d.add_merge(6, 7, 10.0, 5).unwrap(); // 8
        d
    }

    #[test]
    fn add_merge_orders_ids() {
        let d = five();
        let m: Vec<_> = d.merges().copied().collect();
        assert_eq!((m[2].left, m[2].right), (2, 5));
        assert_eq!(d.merge_id(3), 8);
    }

    #[test]
    fn cut_to_k_undoes_last_merges() {
        let d = five();
        assert_eq!(d.cut_to_k(1).unwrap().labels(), &[0, 0, 0, 0, 0]);
        assert_eq!(d.cut_to_k(2).unwrap().labels(), &[0, 0, 0, 1, 1]);
        assert_eq!(d.cut_to_k(3).unwrap().labels(), &[0, 0, 1, 2, 2]);
        assert_eq!(d.cut_to_k(5).unwrap().labels(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn cut_to_k_rejects_out_of_range() {
        let d = five();
        assert!(matches!(d.cut_to_k(0), Err(Error::InvalidK { k: 0, .. })));
        assert!(matches!(d.cut_to_k(6), Err(Error::InvalidK { k: 6, .. })));
    }

    #[test]
    fn cut_at_height_matches_cut_to_k() {
        let d = five();
        assert_eq!(d.cut_at_height(2.5).unwrap(), d.cut_to_k(3).unwrap());
        assert_eq!(d.cut_at_height(0.5).unwrap(), d.cut_to_k(5).unwrap());
        assert_eq!(d.cut_at_height(100.0).unwrap(), d.cut_to_k(1).unwrap());
    }

    #[test]
    fn agglomerative_coefficient_by_hand() {
        // first-merge heights: 1, 1, 3, 2, 2 over final height 10
        let ac = five().agglomerative_coefficient().unwrap();
        assert!((ac - (1.0 - 9.0 / 50.0)).abs() < 1e-12);
    }

    #[test]
    fn agglomerative_coefficient_is_one_when_groups_are_points() {
        let mut d = Dendrogram::new(4);
        d.add_merge(0, 1, 0.0, 2).unwrap();
        d.add_merge(2, 3, 0.0, 2).unwrap();
        d.add_merge(4, 5, 7.0, 4).unwrap();
        assert_eq!(d.agglomerative_coefficient().unwrap(), 1.0);
    }

    #[test]
    fn add_merge_rejects_malformed_trees() {
        let mut d = Dendrogram::new(3);
        // id 7 does not exist before the first merge (only 0..3 do)
        assert!(matches!(d.add_merge(0, 7, 1.0, 2), Err(Error::InvalidInput { .. })));
        assert!(matches!(d.add_merge(1, 1, 1.0, 2), Err(Error::InvalidInput { .. })));
        assert!(matches!(d.add_merge(0, 1, f64::NAN, 2), Err(Error::InvalidInput { .. })));
        assert_eq!(d.n_merges(), 0);

        d.add_merge(0, 1, 1.0, 2).unwrap();
        assert!(matches!(d.add_merge(1, 2, 2.0, 2), Err(Error::InvalidInput { .. })));
        d.add_merge(3, 2, 2.0, 3).unwrap();
        assert!(matches!(d.add_merge(4, 0, 3.0, 4), Err(Error::InvalidInput { .. })));

        // the rejected calls left nothing behind
        assert_eq!(d.heights(), vec![1.0, 2.0]);
        assert!(crate::hierarchy::cophenetic(&d).is_ok());
        assert!((d.agglomerative_coefficient().unwrap() - (1.0 - 4.0 / 6.0)).abs() < 1e-12);
    }

    #[test]
    fn incomplete_tree_is_rejected_by_tree_statistics() {
        let mut d = Dendrogram::new(3);
        d.add_merge(0, 1, 1.0, 2).unwrap();
        assert!(d.agglomerative_coefficient().is_err());
        assert!(crate::hierarchy::cophenetic(&d).is_err());
    }
}
