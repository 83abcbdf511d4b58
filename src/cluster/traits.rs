//! Clustering traits.

use crate::assignment::ClusterAssignment;
use crate::error::Result;
use crate::matrix::FeatureMatrix;

/// Trait for hard clustering algorithms.
pub trait Clustering {
    /// Fit the model to data and return one label per observation.
    fn fit_predict(&self, data: &FeatureMatrix) -> Result<ClusterAssignment>;

    /// Get the number of clusters.
    fn n_clusters(&self) -> usize;
}
