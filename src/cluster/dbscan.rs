//! DBSCAN: Density-Based Spatial Clustering of Applications with Noise.
//!
//! # The Algorithm (Ester et al., 1996)
//!
//! DBSCAN groups tuples by neighborhood density. Unlike k-means, it:
//!
//! - Discovers clusters of arbitrary shape
//! - Automatically determines the number of clusters
//! - Identifies noise points (outliers)
//!
//! ## Core Concepts
//!
//! - **Epsilon (ε)**: A tuple `q` is a neighbor of `p` when `distance(p, q) < ε`.
//! - **MinPts**: Minimum neighborhood size for a tuple to be "core". The
//!   neighborhood contains the tuple itself.
//! - **Core point**: Has at least MinPts neighbors.
//! - **Border point**: Reached from a core point but not core itself.
//! - **Noise point**: Not core, and visited before any cluster reached it.
//!
//! ## Traversal
//!
//! Included tuples are scanned in index order. Each unvisited tuple is marked
//! visited; if it is not core it is labeled noise (`0`), otherwise it opens
//! cluster `c` (ids start at 1, in discovery order) and the cluster grows from
//! a seed list: every unlabeled seed is labeled `c`, every unvisited seed is
//! marked visited and, if core, its neighborhood is appended to the seeds.
//!
//! A tuple is labeled exactly once. In particular a tuple already labeled
//! noise stays noise even if a later cluster reaches it, and a border tuple
//! reachable from two dense regions belongs to whichever region is scanned
//! first, not to the nearer one.
//!
//! ## Complexity
//!
//! - **Time**: O(n²) distance evaluations; there is no spatial index.
//! - **Space**: O(Σ |neighborhood|) for the precomputed neighborhoods.
//!
//! ## Limitations
//!
//! - Struggles with varying densities
//! - ε is sensitive and dataset-dependent; see
//!   [`KDistanceGraph`](crate::eval::KDistanceGraph) for the usual knee plot.
//!
//! ## References
//!
//! Ester et al. (1996). "A Density-Based Algorithm for Discovering Clusters
//! in Large Spatial Databases with Noise." KDD-96.

use tracing::debug;

use super::traits::Clustering;
use super::util::map_indices;
use crate::dataset::MaskedDataset;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::metric::{DistanceMetric, Scalar};

/// Label given to noise and to masked-out tuples.
pub const NOISE: i32 = 0;

/// DBSCAN clustering algorithm.
#[derive(Debug, Clone)]
pub struct Dbscan {
    /// Epsilon: exclusive neighborhood radius.
    epsilon: f64,
    /// Minimum neighborhood size (self included) for a core point.
    min_pts: usize,
    metric: DistanceMetric,
    interrupt: Interrupt,
}

/// Result of a DBSCAN run.
#[derive(Debug, Clone, PartialEq)]
pub struct DbscanFit {
    /// One label per tuple: `0` for noise or masked-out, `1..=num_clusters` otherwise.
    pub labels: Vec<i32>,
    /// Number of clusters discovered.
    pub num_clusters: usize,
    /// Included tuples labeled noise.
    pub noise_count: usize,
    /// The run observed its interrupt and stopped early; labels are partial.
    pub cancelled: bool,
}

impl Dbscan {
    /// Create a new DBSCAN clusterer.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Exclusive neighborhood radius under the configured metric.
    /// * `min_pts` - Minimum neighborhood size, counting the tuple itself.
    ///
    /// # Typical Values
    ///
    /// - `epsilon`: Often read off a k-distance plot (k = min_pts - 1).
    /// - `min_pts`: 2 * dimension is a common heuristic.
    pub fn new(epsilon: f64, min_pts: usize) -> Self {
        Self {
            epsilon,
            min_pts,
            metric: DistanceMetric::Euclidean,
            interrupt: Interrupt::default(),
        }
    }

    /// Set epsilon (neighborhood radius).
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set minimum points for core classification.
    pub fn with_min_pts(mut self, min_pts: usize) -> Self {
        self.min_pts = min_pts;
        self
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be positive and finite",
            });
        }
        if self.min_pts <= 1 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be greater than 1",
            });
        }
        Ok(())
    }

    /// Run DBSCAN over the included tuples of `data`.
    pub fn fit<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<DbscanFit> {
        self.validate()?;
        data.require_included()?;

        let n = data.len();
        let labels = vec![NOISE; n];

        let neighborhoods = map_indices(0..n, |i| {
            if data.is_included(i) {
                self.region_query(data, i)
            } else {
                Vec::new()
            }
        });
        if self.interrupt.is_raised() {
            debug!("dbscan interrupted during neighborhood scan");
            return Ok(DbscanFit::partial(labels, 0));
        }

        Ok(self.traverse(data, &neighborhoods, labels))
    }

    /// Label clusters in index order from precomputed neighborhoods.
    fn traverse<T: Scalar>(
        &self,
        data: &MaskedDataset<'_, T>,
        neighborhoods: &[Vec<usize>],
        mut labels: Vec<i32>,
    ) -> DbscanFit {
        let n = data.len();
        let mut visited = vec![false; n];
        let mut labeled = vec![false; n];
        let mut cluster_id: i32 = 0;

        for point_idx in 0..n {
            if self.interrupt.is_raised() {
                debug!(point_idx, "dbscan interrupted during traversal");
                return DbscanFit::partial(labels, cluster_id as usize);
            }
            if !data.is_included(point_idx) || visited[point_idx] {
                continue;
            }
            visited[point_idx] = true;

            if neighborhoods[point_idx].len() < self.min_pts {
                labels[point_idx] = NOISE;
                labeled[point_idx] = true;
                continue;
            }

            cluster_id += 1;
            let finished = self.expand_cluster(
                point_idx,
                neighborhoods,
                &mut labels,
                cluster_id,
                &mut visited,
                &mut labeled,
            );
            if !finished {
                debug!(cluster_id, "dbscan interrupted during cluster expansion");
                return DbscanFit::partial(labels, cluster_id as usize);
            }
        }

        let noise_count = (0..n)
            .filter(|&i| data.is_included(i) && labels[i] == NOISE)
            .count();
        debug!(
            clusters = cluster_id,
            noise = noise_count,
            epsilon = self.epsilon,
            min_pts = self.min_pts,
            metric = %self.metric,
            "dbscan finished"
        );

        DbscanFit {
            labels,
            num_clusters: cluster_id as usize,
            noise_count,
            cancelled: false,
        }
    }

    /// All included tuples strictly closer than epsilon, the query tuple included.
    fn region_query<T: Scalar>(&self, data: &MaskedDataset<'_, T>, point_idx: usize) -> Vec<usize> {
        if self.interrupt.is_raised() {
            return Vec::new();
        }
        let point = data.tuple(point_idx);
        (0..data.len())
            .filter(|&idx| {
                data.is_included(idx) && self.metric.distance(point, data.tuple(idx)) < self.epsilon
            })
            .collect()
    }

    /// Grow cluster `cluster_id` from the core point `point_idx`.
    ///
    /// Returns `false` if the interrupt was raised mid-expansion.
    fn expand_cluster(
        &self,
        point_idx: usize,
        neighborhoods: &[Vec<usize>],
        labels: &mut [i32],
        cluster_id: i32,
        visited: &mut [bool],
        labeled: &mut [bool],
    ) -> bool {
        labels[point_idx] = cluster_id;
        labeled[point_idx] = true;

        // The seed list only grows; a cursor walks it in insertion order.
        let mut seeds: Vec<usize> = neighborhoods[point_idx].clone();
        let mut cursor = 0;

        while cursor < seeds.len() {
            if self.interrupt.is_raised() {
                return false;
            }
            let idx = seeds[cursor];
            cursor += 1;

            if !visited[idx] {
                visited[idx] = true;
                let reach = &neighborhoods[idx];
                if reach.len() >= self.min_pts {
                    // Seeds already visited and labeled would be no-ops.
                    seeds.extend(reach.iter().copied().filter(|&q| !visited[q] || !labeled[q]));
                }
            }

            if !labeled[idx] {
                labels[idx] = cluster_id;
                labeled[idx] = true;
            }
        }
        true
    }
}

impl DbscanFit {
    fn partial(labels: Vec<i32>, num_clusters: usize) -> Self {
        Self {
            labels,
            num_clusters,
            noise_count: 0,
            cancelled: true,
        }
    }
}

impl Default for Dbscan {
    fn default() -> Self {
        Self::new(0.01, 50)
    }
}

impl Clustering for Dbscan {
    fn fit_labels<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<Vec<i32>> {
        self.fit(data).map(|fit| fit.labels)
    }

    /// DBSCAN discovers clusters dynamically, so this returns 0.
    ///
    /// To get the actual number of clusters, see [`DbscanFit::num_clusters`].
    fn n_clusters(&self) -> usize {
        0 // Unknown until fit
    }
}

/// Extended DBSCAN interface with noise detection.
pub trait DbscanExt {
    /// Fit and predict, returning zero-based cluster indices with noise and
    /// masked-out tuples as `None`.
    fn fit_predict_with_noise<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<Vec<Option<usize>>>;

    /// Check if a label represents noise.
    fn is_noise(label: i32) -> bool {
        label == NOISE
    }
}

impl DbscanExt for Dbscan {
    fn fit_predict_with_noise<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<Vec<Option<usize>>> {
        let fit = self.fit(data)?;
        Ok(fit
            .labels
            .into_iter()
            .map(|l| if l > NOISE { Some(l as usize - 1) } else { None })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::needless_range_loop)]
mod tests {
    use super::*;

    fn flatten(points: &[[f64; 2]]) -> Vec<f64> {
        points.iter().flatten().copied().collect()
    }

    #[test]
    fn test_dbscan_two_clusters() {
        // Two well-separated clusters
        let values = flatten(&[
            // Cluster 1: around (0, 0)
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [0.1, 0.1],
            [0.05, 0.05],
            // Cluster 2: around (5, 5)
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1],
            [5.1, 5.1],
            [5.05, 5.05],
        ]);
        let data = MaskedDataset::new(&values, 2).unwrap();

        let fit = Dbscan::new(0.3, 3).fit(&data).unwrap();
        assert_eq!(fit.num_clusters, 2);
        assert_eq!(fit.noise_count, 0);
        assert!(!fit.cancelled);

        // Discovery order fixes the ids.
        assert!(fit.labels[..5].iter().all(|&l| l == 1));
        assert!(fit.labels[5..].iter().all(|&l| l == 2));
    }

    #[test]
    fn test_dbscan_with_noise() {
        let values = flatten(&[
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [0.1, 0.1],
            // Outlier
            [100.0, 100.0],
            [5.0, 5.0],
            [5.1, 5.0],
            [5.0, 5.1],
            [5.1, 5.1],
        ]);
        let data = MaskedDataset::new(&values, 2).unwrap();

        let labels = Dbscan::new(0.3, 3).fit_predict_with_noise(&data).unwrap();
        assert_eq!(labels.len(), 9);
        assert!(labels[4].is_none());
        for (i, label) in labels.iter().enumerate() {
            if i != 4 {
                assert!(label.is_some());
            }
        }
        assert_eq!(labels[0], Some(0));
        assert_eq!(labels[5], Some(1));
    }

    #[test]
    fn test_dbscan_all_noise() {
        // Points too far apart
        let values = flatten(&[[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [10.0, 10.0]]);
        let data = MaskedDataset::new(&values, 2).unwrap();

        let fit = Dbscan::new(0.5, 2).fit(&data).unwrap();
        assert_eq!(fit.num_clusters, 0);
        assert_eq!(fit.noise_count, 4);
        assert!(fit.labels.iter().all(|&l| l == NOISE));
    }

    #[test]
    fn test_dbscan_neighborhood_is_exclusive() {
        // Exactly epsilon apart: not neighbors.
        let values = [0.0f64, 1.0];
        let data = MaskedDataset::new(&values, 1).unwrap();
        let fit = Dbscan::new(1.0, 2).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![0, 0]);

        let fit = Dbscan::new(1.0 + 1e-9, 2).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![1, 1]);
    }

    #[test]
    fn test_dbscan_chain() {
        // Chain of points - DBSCAN should connect them
        let values: Vec<f32> = (0..10).map(|i| i as f32 * 0.3).collect();
        let data = MaskedDataset::new(&values, 1).unwrap();

        let labels = Dbscan::new(0.5, 2).fit_labels(&data).unwrap();
        assert!(labels.iter().all(|&l| l == 1));
    }

    #[test]
    fn test_dbscan_noise_is_never_promoted() {
        // Tuple 0 is visited first and is not core; tuple 1 later opens a
        // cluster that reaches it.
        let values = [0.0f64, 0.9, 1.0, 1.1];
        let data = MaskedDataset::new(&values, 1).unwrap();

        let fit = Dbscan::new(0.95, 4).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![0, 1, 1, 1]);
        assert_eq!(fit.noise_count, 1);
    }

    #[test]
    fn test_dbscan_border_point_goes_to_first_cluster() {
        // Tuple 4 is within reach of both dense groups but is not core itself.
        let values = [0.0f64, 0.1, 0.2, 0.3, 1.1, 1.9, 2.0, 2.1, 2.2];
        let data = MaskedDataset::new(&values, 1).unwrap();

        let fit = Dbscan::new(0.85, 4).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![1, 1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(fit.num_clusters, 2);
    }

    #[test]
    fn test_dbscan_mask_excludes_tuples() {
        let values = [0.0f64, 0.1, 0.2, 0.3];
        let full = MaskedDataset::new(&values, 1).unwrap();
        let fit = Dbscan::new(0.25, 3).fit(&full).unwrap();
        assert_eq!(fit.labels, vec![1, 1, 1, 1]);

        // Without tuple 1, tuple 0 only reaches itself and tuple 2, so it is
        // visited as noise before tuple 2 opens the cluster.
        let mask = [true, false, true, true];
        let masked = full.with_mask(&mask).unwrap();
        let fit = Dbscan::new(0.25, 3).fit(&masked).unwrap();
        assert_eq!(fit.labels, vec![NOISE, NOISE, 1, 1]);
        assert_eq!(fit.noise_count, 1);
    }

    #[test]
    fn test_dbscan_cosine_metric() {
        // Direction matters, magnitude does not.
        let values = flatten(&[[1.0, 0.0], [5.0, 0.1], [10.0, 0.0], [0.0, 1.0], [0.1, 7.0], [0.0, 3.0]]);
        let data = MaskedDataset::new(&values, 2).unwrap();

        let fit = Dbscan::new(0.01, 2)
            .with_metric(DistanceMetric::Cosine)
            .fit(&data)
            .unwrap();
        assert_eq!(fit.num_clusters, 2);
        assert_eq!(fit.labels, vec![1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_dbscan_empty() {
        let values: Vec<f64> = vec![];
        let data = MaskedDataset::new(&values, 2).unwrap();
        assert_eq!(Dbscan::new(0.5, 3).fit(&data), Err(Error::EmptyInput));
    }

    #[test]
    fn test_dbscan_invalid_params() {
        let values = [0.0f64, 0.0];
        let data = MaskedDataset::new(&values, 2).unwrap();

        assert!(Dbscan::new(0.0, 3).fit(&data).is_err());
        assert!(Dbscan::new(-1.0, 3).fit(&data).is_err());
        assert!(Dbscan::new(f64::NAN, 3).fit(&data).is_err());
        assert!(Dbscan::new(0.5, 1).fit(&data).is_err());
        assert!(Dbscan::new(0.5, 0).fit(&data).is_err());
    }

    #[test]
    fn test_dbscan_cancelled_returns_partial() {
        let values: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let data = MaskedDataset::new(&values, 1).unwrap();
        let interrupt = Interrupt::new();
        interrupt.raise();

        let fit = Dbscan::new(0.5, 2)
            .with_interrupt(interrupt)
            .fit(&data)
            .unwrap();
        assert!(fit.cancelled);
        assert_eq!(fit.labels.len(), 50);
    }

    #[test]
    fn test_dbscan_cancelled_during_traversal() {
        let values = [0.0f64, 0.1, 0.2, 5.0];
        let data = MaskedDataset::new(&values, 1).unwrap();
        let model = Dbscan::new(0.5, 2);
        let neighborhoods: Vec<Vec<usize>> = (0..4).map(|i| model.region_query(&data, i)).collect();

        model.interrupt.raise();
        let fit = model.traverse(&data, &neighborhoods, vec![NOISE; 4]);
        assert!(fit.cancelled);
        assert_eq!(fit.labels, vec![0, 0, 0, 0]);
        assert_eq!(fit.num_clusters, 0);
    }

    #[test]
    fn test_dbscan_cancelled_during_expansion() {
        let values = [0.0f64, 0.1, 0.2];
        let data = MaskedDataset::new(&values, 1).unwrap();
        let model = Dbscan::new(0.5, 2);
        let neighborhoods: Vec<Vec<usize>> = (0..3).map(|i| model.region_query(&data, i)).collect();
        let mut labels = vec![NOISE; 3];
        let mut visited = vec![true, false, false];
        let mut labeled = vec![false; 3];

        model.interrupt.raise();
        let finished = model.expand_cluster(0, &neighborhoods, &mut labels, 1, &mut visited, &mut labeled);
        assert!(!finished);
        // The core point is labeled before the seed list is walked.
        assert_eq!(labels, vec![1, 0, 0]);
        assert_eq!(visited, vec![true, false, false]);
    }

    #[test]
    fn test_dbscan_interrupt_from_another_thread() {
        let values: Vec<f64> = (0..4000).map(|i| (i % 97) as f64 * 0.01).collect();
        let data = MaskedDataset::new(&values, 1).unwrap();
        let interrupt = Interrupt::new();
        let model = Dbscan::new(0.05, 3).with_interrupt(interrupt.clone());

        let fit = std::thread::scope(|scope| {
            scope.spawn(|| interrupt.raise());
            model.fit(&data).unwrap()
        });
        assert!(interrupt.is_raised());
        assert_eq!(fit.labels.len(), 4000);
        if fit.cancelled {
            assert_eq!(fit.noise_count, 0);
        } else {
            assert!(fit.num_clusters > 0);
        }
    }
}
