use core::fmt;

/// Result alias for `cohort`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering, embedding and quality primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was malformed: non-finite values, too few observations, and so on.
    InvalidInput {
        /// What was wrong with the input.
        reason: String,
    },

    /// Row or column length mismatch.
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Requested number of clusters is outside the valid range for the operation.
    InvalidK {
        /// Requested count.
        k: usize,
        /// Smallest accepted count.
        min: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// A k-means run ended with fewer than `k` non-empty clusters.
    EmptyCluster {
        /// Requested number of clusters.
        k: usize,
        /// Number of clusters that still had members.
        non_empty: usize,
    },

    /// Classical MDS cannot embed into the requested dimension because the
    /// spectrum has a materially negative eigenvalue within the top `requested`.
    NonEmbeddable {
        /// Requested dimension.
        requested: usize,
        /// Number of strictly positive eigenvalues.
        available: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidK { k, min, max } => {
                write!(f, "invalid cluster count {k}: must lie in {min}..={max}")
            }
            Error::EmptyCluster { k, non_empty } => {
                write!(f, "only {non_empty} of {k} clusters kept members")
            }
            Error::NonEmbeddable {
                requested,
                available,
            } => write!(
                f,
                "cannot embed into {requested} dimensions: only {available} positive eigenvalues"
            ),
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_values() {
        let e = Error::InvalidK { k: 7, min: 1, max: 5 };
        assert_eq!(e.to_string(), "invalid cluster count 7: must lie in 1..=5");

        let e = Error::NonEmbeddable {
            requested: 3,
            available: 2,
        };
        assert!(e.to_string().contains("3 dimensions"));
    }
}
