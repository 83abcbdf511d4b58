//! Clustering algorithms.
//!
//! ## K-means
//!
//! The classic algorithm: assign each point to the nearest centroid, then
//! update centroids to the mean of their points. Repeat.
//!
//! **Objective**: Minimize within-cluster sum of squares:
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! **Assumptions**: clusters are roughly spherical and of similar size, and
//! k is known in advance. Run it over a range of k and compare silhouettes.
//!
//! ## Hierarchical (Agglomerative) Clustering
//!
//! Bottom-up: start with each point as its own cluster, repeatedly merge
//! the two closest clusters until one remains. The merge history forms a
//! **dendrogram** you can cut at any height to get k clusters.
//!
//! | Linkage | Distance | Effect |
//! |---------|----------|--------|
//! | Single | min(pairwise) | Chaining; elongated clusters |
//! | Complete | max(pairwise) | Compact, spherical clusters |
//! | Average | mean(pairwise) | Balanced compromise |
//! | Ward | Variance increase | Minimizes within-cluster variance |
//!
//! ## Usage
//!
//! ```rust
//! use cohort::cluster::{Clustering, HierarchicalClustering, Kmeans, Linkage};
//! use cohort::metrics::adjusted_rand_index;
//! use cohort::FeatureMatrix;
//!
//! let data = FeatureMatrix::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ])
//! .unwrap();
//!
//! let km = Kmeans::new(2).with_seed(7).fit_predict(&data).unwrap();
//! let hc = HierarchicalClustering::new(2)
//!     .with_linkage(Linkage::Ward)
//!     .fit_predict(&data)
//!     .unwrap();
//!
//! // Labels are arbitrary; compare partitions, not label values.
//! assert_eq!(adjusted_rand_index(km.labels(), hc.labels()), 1.0);
//! ```

mod hierarchical;
mod kmeans;
mod traits;

pub use hierarchical::{HierarchicalClustering, Linkage};
pub use kmeans::{Init, Kmeans, KmeansFit};
pub use traits::Clustering;
