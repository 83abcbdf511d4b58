//! Hierarchical (agglomerative) clustering.
//!
//! Bottom-up clustering that builds a **dendrogram** by iteratively
//! merging the closest clusters. Unlike K-means, you don't need to
//! specify k in advance: cut the tree at any height.
//!
//! # Linkage Methods
//!
//! | Linkage | Formula | Effect |
//! |---------|---------|--------|
//! | Single | min(d(a,b)) for a∈A, b∈B | Chaining; elongated clusters |
//! | Complete | max(d(a,b)) | Compact, spherical clusters |
//! | Average | mean(d(a,b)) | Balanced compromise |
//! | Ward | Δ within-cluster SS | Minimizes within-cluster variance |
//!
//! # Lance–Williams Updates
//!
//! After merging i and j, the dissimilarity from the new cluster to every
//! other active cluster k is derived from the old row values alone:
//!
//! ```text
//! single   : min(d(k,i), d(k,j))
//! complete : max(d(k,i), d(k,j))
//! average  : (nᵢ d(k,i) + nⱼ d(k,j)) / (nᵢ + nⱼ)
//! ward     : d²(k,ij) = ((nᵢ+nₖ) d²(k,i) + (nⱼ+nₖ) d²(k,j) − nₖ d²(i,j)) / (nᵢ+nⱼ+nₖ)
//! ```
//!
//! Ward works on squared distances internally and reports `sqrt(d²)` as the
//! merge height, so heights stay on the distance scale. The increase in total
//! within-cluster sum of squares caused by a Ward merge is `height² / 2`.
//!
//! # Ties
//!
//! When several active pairs share the minimal dissimilarity, the pair whose
//! `(smaller id, larger id)` is lexicographically smallest is merged first.
//! Ids are the dendrogram ids: leaves `0..n`, merge `s` creates `n + s`.
//! This makes the tree shape reproducible on symmetric or degenerate data.
//!
//! The pair search is exhaustive, O(n³) overall with O(n²) memory, which is
//! the price of the exact tie-breaking rule.

use super::traits::Clustering;
use crate::assignment::ClusterAssignment;
use crate::distance::DistanceMatrix;
use crate::error::Result;
use crate::hierarchy::Dendrogram;
use crate::matrix::FeatureMatrix;

/// Linkage method for hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Single linkage: minimum distance between clusters.
    Single,
    /// Complete linkage: maximum distance between clusters.
    Complete,
    /// Average linkage (UPGMA): mean distance between clusters.
    Average,
    /// Ward's method: minimize the increase in within-cluster variance.
    Ward,
}

impl Linkage {
    /// Lance–Williams update for the dissimilarity between cluster k and the
    /// union of i and j. Ward values are squared distances.
    #[inline]
    fn update(self, d_ki: f64, d_kj: f64, d_ij: f64, n_i: f64, n_j: f64, n_k: f64) -> f64 {
        match self {
            Linkage::Single => d_ki.min(d_kj),
            Linkage::Complete => d_ki.max(d_kj),
            Linkage::Average => (n_i * d_ki + n_j * d_kj) / (n_i + n_j),
            Linkage::Ward => {
                ((n_i + n_k) * d_ki + (n_j + n_k) * d_kj - n_k * d_ij) / (n_i + n_j + n_k)
            }
        }
    }
}

/// Hierarchical (agglomerative) clustering.
#[derive(Debug, Clone)]
pub struct HierarchicalClustering {
    /// Number of clusters produced by `fit_predict`.
    n_clusters: usize,
    /// Linkage method.
    linkage: Linkage,
}

impl HierarchicalClustering {
    /// Create a new hierarchical clusterer (Ward linkage).
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            linkage: Linkage::Ward,
        }
    }

    /// Set linkage method.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// The configured linkage.
    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// Build the full dendrogram from a distance matrix.
    pub fn fit_dendrogram(&self, distances: &DistanceMatrix) -> Result<Dendrogram> {
        let n = distances.n();
        let ward = self.linkage == Linkage::Ward;

        // Working dissimilarities indexed by slot. A slot holds one active
        // cluster; the merged cluster reuses the slot of its first member.
        let mut work = distances.to_square();
        if ward {
            work.mapv_inplace(|d| d * d);
        }
        let mut ids: Vec<usize> = (0..n).collect();
        let mut sizes = vec![1usize; n];
        let mut active = vec![true; n];

        let mut dendro = Dendrogram::new(n);
        for step in 0..(n - 1) {
            // (value, lo id, hi id, slot a, slot b)
            let mut best: Option<(f64, usize, usize, usize, usize)> = None;
            for a in (0..n).filter(|&a| active[a]) {
                for b in ((a + 1)..n).filter(|&b| active[b]) {
                    let v = work[[a, b]];
                    let (lo, hi) = (ids[a].min(ids[b]), ids[a].max(ids[b]));
                    let better = match best {
                        None => true,
                        Some((bv, blo, bhi, _, _)) => {
                            v < bv || (v == bv && (lo, hi) < (blo, bhi))
                        }
                    };
                    if better {
                        best = Some((v, lo, hi, a, b));
                    }
                }
            }
            let Some((value, lo, hi, a, b)) = best else {
                break;
            };

            let (n_a, n_b) = (sizes[a] as f64, sizes[b] as f64);
            for k in (0..n).filter(|&k| active[k] && k != a && k != b) {
                let updated =
                    self.linkage
                        .update(work[[k, a]], work[[k, b]], value, n_a, n_b, sizes[k] as f64);
                work[[k, a]] = updated;
                work[[a, k]] = updated;
            }

            let height = if ward { value.max(0.0).sqrt() } else { value };
            let size = sizes[a] + sizes[b];
            dendro.add_merge(lo, hi, height, size)?;

            ids[a] = dendro.merge_id(step);
            sizes[a] = size;
            active[b] = false;
        }

        log::debug!(
            "{:?} linkage over {n} observations: final height {:.4}",
            self.linkage,
            dendro.heights().last().copied().unwrap_or(0.0)
        );
        Ok(dendro)
    }
}

impl Clustering for HierarchicalClustering {
    fn fit_predict(&self, data: &FeatureMatrix) -> Result<ClusterAssignment> {
        let distances = DistanceMatrix::from_features(data)?;
        self.fit_dendrogram(&distances)?.cut_to_k(self.n_clusters)
    }

    fn n_clusters(&self) -> usize {
        self.n_clusters
    }
}
