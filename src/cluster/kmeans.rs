//! K-means clustering.
//!
//! Partitions the included tuples into k clusters around synthetic centroids
//! (componentwise means), using any [`DistanceMetric`] for assignment.
//!
//! # Lloyd's Algorithm
//!
//! 1. Initialize k means from k distinct included tuples
//! 2. **Assign**: each included tuple → nearest mean (ties → lowest cluster id)
//! 3. **Update**: each mean → componentwise average of its included tuples
//! 4. Repeat until the means stop moving
//!
//! A cluster that loses all its tuples gets an all-zero mean rather than NaN.
//!
//! # Convergence
//!
//! The stopping test compares only component 0 of each cluster's mean before
//! and after the update, within an absolute tolerance. This is cheaper than a
//! full-vector shift but can stop early when component 0 settles before the
//! others do. `max_iter` bounds the loop in case it never settles.
//!
//! # Failure Modes
//!
//! - **Local optima**: Lloyd finds a local minimum only; random seeding means
//!   repeated unseeded runs may disagree
//! - **Wrong k**: Must specify k in advance; use silhouette to compare
//! - **Non-spherical clusters**: Assumes roughly spherical, equal-sized clusters

use tracing::{debug, warn};

use super::representatives::Representatives;
use super::seeding::{initial_indices, Init};
use super::traits::Clustering;
use super::util::{assign_nearest, cluster_means};
use crate::dataset::MaskedDataset;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::metric::{DistanceMetric, Scalar};

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    metric: DistanceMetric,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence tolerance on component 0 of each mean.
    tol: f64,
    /// Random seed.
    seed: Option<u64>,
    init: Init,
    interrupt: Interrupt,
}

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansFit {
    /// One label per tuple: `1..=k` for included tuples, `0` for masked-out ones.
    pub labels: Vec<i32>,
    /// `(k + 1) × C` table of means; row 0 is unused.
    pub means: Representatives<f64>,
    /// Lloyd iterations performed.
    pub iterations: usize,
    /// Whether the stopping test passed before `max_iter`.
    pub converged: bool,
    /// The run observed its interrupt and stopped early; results are partial.
    pub cancelled: bool,
}

impl Kmeans {
    /// Create a new K-means clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: DistanceMetric::Euclidean,
            max_iter: 1000,
            tol: f64::EPSILON,
            seed: None,
            init: Init::Random,
            interrupt: Interrupt::default(),
        }
    }

    /// Set the distance metric used for assignment.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Choose how initial means are picked.
    pub fn with_init(mut self, init: Init) -> Self {
        self.init = init;
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be at least 1",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be at least 1",
            });
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tol",
                message: "must be finite and non-negative",
            });
        }
        Ok(())
    }

    /// Cluster the included tuples of `data`.
    pub fn fit<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<KmeansFit> {
        self.validate()?;
        let included = data.require_included()?;
        if included < self.k {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: included,
            });
        }

        let seeds = initial_indices(data, self.k, &self.init, self.seed)?;
        let mut means = Representatives::zeros(self.k, data.n_components());
        for (slot, &idx) in seeds.iter().enumerate() {
            for (out, v) in means.row_mut(slot + 1).iter_mut().zip(data.tuple(idx)) {
                *out = v.to_f64();
            }
        }

        let mut labels = vec![0i32; data.len()];
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iter {
            if self.interrupt.is_raised() {
                debug!(iterations, "k-means interrupted");
                return Ok(KmeansFit {
                    labels,
                    means,
                    iterations,
                    converged: false,
                    cancelled: true,
                });
            }
            iterations += 1;

            labels = assign_nearest(data, &means, self.metric);
            let updated = cluster_means(data, &labels, self.k);

            let mut shift = 0.0;
            let mut settled = 0;
            for c in 1..=self.k {
                let diff = means.row(c)[0] - updated.row(c)[0];
                shift += diff;
                if diff.abs() < self.tol || diff == 0.0 {
                    settled += 1;
                }
            }
            means = updated;

            debug!(iteration = iterations, mean_shift = shift, "k-means iteration");
            if settled == self.k {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = self.max_iter,
                k = self.k,
                "k-means stopped at the iteration cap before converging"
            );
        }

        Ok(KmeansFit {
            labels,
            means,
            iterations,
            converged,
            cancelled: false,
        })
    }
}

impl Default for Kmeans {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Clustering for Kmeans {
    fn fit_labels<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<Vec<i32>> {
        self.fit(data).map(|fit| fit.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}
