//! Metric-pluggable clustering over flat, masked tuple buffers.
//!
//! `clustra` clusters and evaluates N tuples of C numeric components stored
//! row-major in one slice, with an optional per-tuple inclusion mask. Any of
//! the primitive integer or float types can be the element type; all distance
//! math is done in `f64`.
//!
//! - [`metric`]: the six [`DistanceMetric`]s
//! - [`dataset`]: the [`MaskedDataset`] view
//! - [`cluster`]: DBSCAN, k-means and k-medoids
//! - [`eval`]: the k-distance graph and silhouette scores
//! - [`interrupt`]: cooperative cancellation shared with the caller
//!
//! ```rust
//! use clustra::{DistanceMetric, Kmedoids, MaskedDataset, Silhouette};
//!
//! let values = [1u16, 2, 3, 40, 41, 42];
//! let data = MaskedDataset::new(&values, 1).unwrap();
//!
//! let fit = Kmedoids::new(2)
//!     .with_metric(DistanceMetric::Manhattan)
//!     .with_seed(1)
//!     .fit(&data)
//!     .unwrap();
//! let scores = Silhouette::new(2)
//!     .with_metric(DistanceMetric::Manhattan)
//!     .evaluate(&data, &fit.labels)
//!     .unwrap();
//! assert!(scores.mean > 0.9);
//! ```

#![forbid(unsafe_code)]

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod interrupt;
pub mod metric;

pub use cluster::{
    Clustering, Dbscan, DbscanExt, DbscanFit, Init, Kmeans, KmeansFit, Kmedoids, KmedoidsFit,
    Representatives, NOISE,
};
pub use dataset::MaskedDataset;
pub use error::{Error, Result};
pub use eval::{KDistanceGraph, KDistances, Silhouette, SilhouetteScores};
pub use interrupt::Interrupt;
pub use metric::{DistanceMetric, Scalar};
