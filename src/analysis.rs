//! End-to-end exploratory run over a range of k.
//!
//! ```text
//! FeatureMatrix ─► DistanceMatrix ─┬─► linkage ─► Dendrogram ─► cut to k ─┐
//!        │                         ├─► classical MDS ─► Embedding         ├─► QualityReport
//!        └──────────► k-means (per k) ────────────────────────────────────┘
//! ```
//!
//! The distance matrix and the dendrogram are computed once and shared by
//! every k. For each k the hierarchical cut and the best k-means partition
//! are evaluated with the same quality measures and compared through the
//! adjusted Rand index.

use crate::assignment::ClusterAssignment;
use crate::cluster::{HierarchicalClustering, Kmeans, KmeansFit, Linkage};
use crate::distance::DistanceMatrix;
use crate::error::{Error, Result};
use crate::hierarchy::{cophenetic_correlation, Dendrogram};
use crate::matrix::FeatureMatrix;
use crate::mds::{ClassicalMds, Embedding};
use crate::metrics::adjusted_rand_index;
use crate::quality::QualityReport;
use std::ops::RangeInclusive;

/// Configuration of an [`Analysis`].
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Linkage used for the dendrogram.
    pub linkage: Linkage,
    /// Cluster counts to evaluate.
    pub k_range: RangeInclusive<usize>,
    /// K-means restarts per k.
    pub restarts: usize,
    /// Maximum Lloyd iterations per restart.
    pub max_iter: usize,
    /// Dimension of the MDS embedding.
    pub mds_dim: usize,
    /// K-means master seed. `None` draws one and records it per k.
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            linkage: Linkage::Ward,
            k_range: 2..=6,
            restarts: 10,
            max_iter: 1000,
            mds_dim: 2,
            seed: None,
        }
    }
}

impl AnalysisConfig {
    /// Set linkage.
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Set the range of k to evaluate.
    pub fn with_k_range(mut self, k_range: RangeInclusive<usize>) -> Self {
        self.k_range = k_range;
        self
    }

    /// Set k-means restarts.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set maximum k-means iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the MDS dimension.
    pub fn with_mds_dim(mut self, mds_dim: usize) -> Self {
        self.mds_dim = mds_dim;
        self
    }

    /// Set the k-means seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// An assignment and its quality.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    /// The partition.
    pub assignment: ClusterAssignment,
    /// Its quality measures.
    pub report: QualityReport,
}

/// Results for one k.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Number of clusters.
    pub k: usize,
    /// Dendrogram cut to k clusters.
    pub hierarchical: Evaluated,
    /// Best k-means partition.
    pub kmeans: Evaluated,
    /// Full k-means fit (centroids, convergence, seed).
    pub kmeans_fit: KmeansFit,
    /// Adjusted Rand index between the two partitions.
    pub agreement: f64,
}

/// Output of [`Analysis::run`].
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Shared dissimilarities.
    pub distances: DistanceMatrix,
    /// Merge tree under the configured linkage.
    pub tree: Dendrogram,
    /// Cophenetic correlation of the tree.
    pub cophenetic_correlation: f64,
    /// Low-dimensional projection for inspection.
    pub embedding: Embedding,
    /// One entry per k, ascending.
    pub solutions: Vec<Solution>,
}

impl Analysis {
    /// Run the whole exploration.
    pub fn run(data: &FeatureMatrix, config: &AnalysisConfig) -> Result<Self> {
        let n = data.n_obs();
        let (&lo, &hi) = (config.k_range.start(), config.k_range.end());
        if lo > hi {
            return Err(Error::InvalidParameter {
                name: "k_range",
                message: "range is empty",
            });
        }
        if lo == 0 || hi >= n {
            let k = if lo == 0 { lo } else { hi };
            return Err(Error::InvalidK {
                k,
                min: 1,
                max: n - 1,
            });
        }

        let distances = DistanceMatrix::from_features(data)?;
        let tree = HierarchicalClustering::new(lo)
            .with_linkage(config.linkage)
            .fit_dendrogram(&distances)?;
        let cophenetic_correlation = cophenetic_correlation(&tree, &distances)?;
        let embedding = ClassicalMds::new(config.mds_dim).embed(&distances)?;
        log::info!(
            "{n} observations: {:?} tree with cophenetic correlation {cophenetic_correlation:.3}, MDS fit {:.3}",
            config.linkage,
            embedding.goodness_of_fit
        );

        let mut solutions = Vec::with_capacity(hi - lo + 1);
        for k in lo..=hi {
            let cut = tree.cut_to_k(k)?;
            let hierarchical = Evaluated {
                report: QualityReport::evaluate(data, &distances, &cut, Some(&tree))?,
                assignment: cut,
            };

            let mut kmeans = Kmeans::new(k)
                .with_restarts(config.restarts)
                .with_max_iter(config.max_iter);
            if let Some(seed) = config.seed {
                kmeans = kmeans.with_seed(seed);
            }
            let kmeans_fit = kmeans.fit(data)?;
            let kmeans = Evaluated {
                report: QualityReport::evaluate(data, &distances, &kmeans_fit.assignment, None)?,
                assignment: kmeans_fit.assignment.clone(),
            };

            let agreement = adjusted_rand_index(
                hierarchical.assignment.labels(),
                kmeans.assignment.labels(),
            );
            log::info!(
                "k={k}: silhouette hierarchical {:?} k-means {:?}, ARI {agreement:.3}",
                hierarchical.report.mean_silhouette(),
                kmeans.report.mean_silhouette()
            );
            solutions.push(Solution {
                k,
                hierarchical,
                kmeans,
                kmeans_fit,
                agreement,
            });
        }

        Ok(Self {
            distances,
            tree,
            cophenetic_correlation,
            embedding,
            solutions,
        })
    }

    /// Solution for `k`, if it was evaluated.
    pub fn solution(&self, k: usize) -> Option<&Solution> {
        self.solutions.iter().find(|s| s.k == k)
    }

    /// k whose hierarchical cut has the highest mean silhouette (smallest k
    /// on ties). `None` when no evaluated k has a silhouette.
    pub fn best_k(&self) -> Option<usize> {
        self.solutions
            .iter()
            .filter_map(|s| s.hierarchical.report.mean_silhouette().map(|m| (s.k, m)))
            .fold(None, |best: Option<(usize, f64)>, (k, m)| match best {
                Some((_, bm)) if bm >= m => best,
                _ => Some((k, m)),
            })
            .map(|(k, _)| k)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn three_groups() -> FeatureMatrix {
        let centers = [(0.0, 0.0), (8.0, 0.0), (4.0, 7.0)];
        let rows: Vec<Vec<f64>> = (0..30)
            .map(|i| {
                let (cx, cy) = centers[i % 3];
                let jitter = (i / 3) as f64 * 0.07;
                vec![cx + jitter, cy - jitter * 0.5]
            })
            .collect();
        FeatureMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn finds_three_groups() {
        let config = AnalysisConfig::default().with_k_range(2..=5).with_seed(11);
        let analysis = Analysis::run(&three_groups(), &config).unwrap();

        assert_eq!(analysis.solutions.len(), 4);
        assert_eq!(analysis.best_k(), Some(3));
        let three = analysis.solution(3).unwrap();
        assert_eq!(three.agreement, 1.0);
        assert!(three.hierarchical.report.agglomerative_coefficient.unwrap() > 0.9);
        assert!(three.kmeans.report.agglomerative_coefficient.is_none());
        assert_eq!(analysis.embedding.coords.dim(), (30, 2));
        assert!(analysis.cophenetic_correlation > 0.9);
    }

    #[test]
    fn rejects_k_range_outside_data() {
        let data = three_groups();
        let config = AnalysisConfig::default().with_k_range(2..=30);
        assert!(matches!(
            Analysis::run(&data, &config),
            Err(Error::InvalidK { k: 30, .. })
        ));
        let config = AnalysisConfig::default().with_k_range(0..=2);
        assert!(matches!(
            Analysis::run(&data, &config),
            Err(Error::InvalidK { k: 0, .. })
        ));
    }
}
