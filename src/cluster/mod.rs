//! Clustering algorithms for grouping similar tuples.
//!
//! Every algorithm here works on a [`MaskedDataset`](crate::dataset::MaskedDataset),
//! takes a [`DistanceMetric`](crate::metric::DistanceMetric), and reports one
//! `i32` label per tuple. Label `0` means noise, unassigned or masked out;
//! clusters are numbered from `1`.
//!
//! ## Algorithms
//!
//! ### K-means
//!
//! Assign each tuple to the nearest mean, then move each mean to the
//! component-wise average of its members. Repeat.
//!
//! **Objective** (for the Euclidean family):
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} d(x, μ_k)
//! ```
//!
//! Means are real-valued whatever the input type. With a non-Euclidean metric
//! the mean update is still the arithmetic average, so the objective is not
//! guaranteed to decrease.
//!
//! ### K-medoids
//!
//! Same alternation, but representatives are actual member tuples, chosen to
//! minimize total in-cluster distance. Works with any metric and tolerates
//! outliers better than k-means.
//!
//! ### DBSCAN
//!
//! Density-based clustering that discovers non-convex clusters and labels
//! outliers as noise. The number of clusters is not specified in advance.
//!
//! ## Usage
//!
//! ```rust
//! use clustra::cluster::{Clustering, Dbscan, Kmeans};
//! use clustra::dataset::MaskedDataset;
//!
//! let values = [0.0, 0.0, 0.1, 0.1, 10.0, 10.0, 10.1, 10.1];
//! let data = MaskedDataset::new(&values, 2).unwrap();
//!
//! let labels = Kmeans::new(2).with_seed(7).fit_labels(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let fit = Dbscan::new(0.5, 2).fit(&data).unwrap();
//! assert_eq!(fit.num_clusters, 2);
//! assert_eq!(fit.noise_count, 0);
//! ```

mod dbscan;
mod kmeans;
mod kmedoids;
mod representatives;
mod seeding;
mod traits;
pub(crate) mod util;

pub use dbscan::{Dbscan, DbscanExt, DbscanFit, NOISE};
pub use kmeans::{Kmeans, KmeansFit};
pub use kmedoids::{Kmedoids, KmedoidsFit};
pub use representatives::Representatives;
pub use seeding::Init;
pub use traits::Clustering;
