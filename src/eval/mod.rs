//! Tools for judging a dataset or a clustering rather than producing one.
//!
//! - [`KDistanceGraph`]: k-th nearest neighbor distance per tuple, for picking
//!   DBSCAN's epsilon from the knee of the sorted curve.
//! - [`Silhouette`]: per-tuple cohesion versus separation for an existing
//!   label assignment.

mod kdistance;
mod silhouette;

pub use kdistance::{KDistanceGraph, KDistances};
pub use silhouette::{Silhouette, SilhouetteScores};
