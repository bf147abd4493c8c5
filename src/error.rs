use thiserror::Error;

/// Errors returned by clustering and evaluation algorithms in this crate.
///
/// Every variant is a configuration error detected before any algorithm work
/// starts. Cancellation is not an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Input has no tuples, or no tuple survives the mask.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} included items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of included items in the dataset.
        n_items: usize,
    },

    /// A buffer has a length inconsistent with the dataset shape.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// An explicit initial representative index cannot be used.
    #[error("invalid initial index {index}: {reason}")]
    InvalidInitialization {
        /// Offending tuple index.
        index: usize,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A cluster label lies outside `0..=max`.
    #[error("invalid label {label} at tuple {index}: labels must lie in 0..={max}")]
    InvalidLabel {
        /// Tuple index carrying the label.
        index: usize,
        /// The label found.
        label: i32,
        /// Largest accepted label.
        max: usize,
    },

    /// Metric selector does not name one of the supported metrics.
    #[error("unknown distance metric: {0}")]
    UnknownMetric(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
