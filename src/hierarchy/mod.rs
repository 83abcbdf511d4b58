//! Merge trees from agglomerative clustering.
//!
//! A [`Dendrogram`] records the complete merge history over n observations:
//!
//! ```text
//!         8 (height=10.0)
//!        / \
//!       7   \      (height=3.0)
//!      / \   6     (height=2.0)
//!     5   \ / \    (height=1.0)
//!    / \  | |  \
//!   0   1 2 3   4  (leaves)
//! ```
//!
//! Key property: cut at any height (or to any k) to get a flat partition.
//! The tree also induces an ultrametric, the [`cophenetic()`] distance, whose
//! correlation with the input dissimilarities is a standard check of how well
//! the tree summarizes them.

mod cophenetic;
mod dendrogram;

pub use cophenetic::{cophenetic, cophenetic_correlation, is_ultrametric};
pub use dendrogram::{Dendrogram, Merge};
