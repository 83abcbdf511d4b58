//! # cohort
//!
//! Exploratory clustering of multivariate observations: hierarchical
//! agglomeration, seeded K-means, classical MDS, and the quality measures
//! needed to compare them.
//!
//! ```text
//! raw table ─► FeatureMatrix (standardized) ─► DistanceMatrix
//!                                               │
//!      ┌────────────────────────────────────────┼───────────────────┐
//!      ▼                                        ▼                   ▼
//!  Dendrogram ─► cut_to_k              Kmeans (multi-start)   ClassicalMds
//!      │              │                         │
//!      └──────► ClusterAssignment ◄─────────────┘
//!                     │
//!          QualityReport / summarize_by_cluster / adjusted_rand_index
//! ```
//!
//! ```rust
//! use cohort::{ClassicalMds, DistanceMatrix, FeatureMatrix, HierarchicalClustering, Kmeans};
//!
//! let data = FeatureMatrix::from_rows(&[
//!     vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0],
//!     vec![10.0, 10.0], vec![10.0, 11.0], vec![11.0, 10.0],
//! ]).unwrap();
//! let distances = DistanceMatrix::from_features(&data).unwrap();
//!
//! let tree = HierarchicalClustering::new(2).fit_dendrogram(&distances).unwrap();
//! let ward = tree.cut_to_k(2).unwrap();
//! let kmeans = Kmeans::new(2).with_seed(7).fit(&data).unwrap();
//! assert_eq!(cohort::adjusted_rand_index(ward.labels(), kmeans.assignment.labels()), 1.0);
//!
//! let map = ClassicalMds::new(2).embed(&distances).unwrap();
//! assert_eq!(map.coords.dim(), (6, 2));
//! ```
//!
//! Observations are indexed `0..n` throughout; cluster labels are `0..k`.
//! With the `parallel` feature, K-means restarts run on rayon.

pub mod analysis;
pub mod assignment;
pub mod cluster;
pub mod distance;
/// Error types used across `cohort`.
pub mod error;
pub mod hierarchy;
pub mod matrix;
pub mod mds;
pub mod metrics;
pub mod quality;
pub mod summarize;

pub use analysis::{Analysis, AnalysisConfig, Evaluated, Solution};
pub use assignment::ClusterAssignment;
pub use cluster::{Clustering, HierarchicalClustering, Init, Kmeans, KmeansFit, Linkage};
pub use distance::DistanceMatrix;
pub use error::{Error, Result};
pub use hierarchy::{cophenetic, cophenetic_correlation, Dendrogram, Merge};
pub use matrix::FeatureMatrix;
pub use mds::{ClassicalMds, Embedding};
pub use metrics::{adjusted_rand_index, nmi, purity, Contingency};
pub use quality::{silhouette, sum_of_squares, QualityReport, Silhouette, SumOfSquares};
pub use summarize::{summarize_by_cluster, MeanSummarizer, ProportionSummarizer, Summarizer};
