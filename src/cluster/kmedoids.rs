//! K-medoids clustering (PAM-style alternation).
//!
//! Like k-means, but every cluster representative is an actual member tuple
//! (a *medoid*), which makes the method usable with any dissimilarity and
//! less sensitive to outliers.
//!
//! # Algorithm
//!
//! 1. Initialize k medoids from k distinct included tuples
//! 2. **Assign**: each included tuple → nearest medoid (ties → lowest cluster id)
//! 3. **Optimize**: within each cluster, the member with the smallest total
//!    distance to all members of that cluster becomes the new medoid
//! 4. Repeat until the set of medoid indices is exactly unchanged
//!
//! A cluster left without members keeps its previous medoid, and its cost
//! stays at `f64::MAX`.
//!
//! # Complexity
//!
//! O(|C|²) distance evaluations per cluster per iteration.

use tracing::{debug, warn};

use super::representatives::Representatives;
use super::seeding::{initial_indices, Init};
use super::traits::Clustering;
use super::util::{assign_nearest, map_indices, members};
use crate::dataset::MaskedDataset;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::metric::{DistanceMetric, Scalar};

/// K-medoids clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmedoids {
    k: usize,
    metric: DistanceMetric,
    max_iter: usize,
    seed: Option<u64>,
    init: Init,
    interrupt: Interrupt,
}

/// Result of a k-medoids run.
#[derive(Debug, Clone, PartialEq)]
pub struct KmedoidsFit<T> {
    /// One label per tuple: `1..=k` for included tuples, `0` for masked-out ones.
    pub labels: Vec<i32>,
    /// `(k + 1) × C` table of medoid tuples in their native type; row 0 is unused.
    pub medoids: Representatives<T>,
    /// Tuple index of the medoid of cluster `c` at position `c - 1`.
    pub medoid_indices: Vec<usize>,
    /// Total distance from each medoid to its cluster's members, at position `c - 1`.
    pub costs: Vec<f64>,
    /// Assign/optimize rounds performed.
    pub iterations: usize,
    /// Whether the medoid set stopped changing before `max_iter`.
    pub converged: bool,
    /// The run observed its interrupt and stopped early; results are partial.
    pub cancelled: bool,
}

impl<T> KmedoidsFit<T> {
    /// Sum of the per-cluster costs, skipping clusters left without members.
    pub fn total_cost(&self) -> f64 {
        self.costs.iter().filter(|&&c| c < f64::MAX).sum()
    }
}

impl Kmedoids {
    /// Create a new K-medoids clusterer.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: DistanceMetric::Euclidean,
            max_iter: 1000,
            seed: None,
            init: Init::Random,
            interrupt: Interrupt::default(),
        }
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set maximum assign/optimize rounds.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Choose how initial medoids are picked.
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
        Ok(())
    }

    /// Cluster the included tuples of `data`.
    pub fn fit<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<KmedoidsFit<T>> {
        self.validate()?;
        let included = data.require_included()?;
        if included < self.k {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: included,
            });
        }

        let mut indices = initial_indices(data, self.k, &self.init, self.seed)?;
        let mut medoids = Representatives::zeros(self.k, data.n_components());
        copy_medoids(data, &indices, &mut medoids);

        let mut fit = KmedoidsFit {
            labels: vec![0; data.len()],
            medoids,
            medoid_indices: Vec::new(),
            costs: vec![f64::MAX; self.k],
            iterations: 0,
            converged: false,
            cancelled: false,
        };

        while fit.iterations < self.max_iter {
            if self.interrupt.is_raised() {
                debug!(iterations = fit.iterations, "k-medoids interrupted");
                fit.cancelled = true;
                break;
            }
            fit.iterations += 1;

            fit.labels = assign_nearest(data, &fit.medoids, self.metric);

            let previous = indices.clone();
            match self.optimize(data, &fit.labels, &mut indices) {
                Some(costs) => fit.costs = costs,
                None => {
                    debug!(iterations = fit.iterations, "k-medoids interrupted");
                    fit.cancelled = true;
                    break;
                }
            }
            copy_medoids(data, &indices, &mut fit.medoids);

            debug!(
                iteration = fit.iterations,
                total_cost = fit.total_cost(),
                "k-medoids iteration"
            );
            if indices == previous {
                fit.converged = true;
                break;
            }
        }

        if !fit.converged && !fit.cancelled {
            warn!(
                max_iter = self.max_iter,
                k = self.k,
                "k-medoids stopped at the iteration cap before converging"
            );
        }

        fit.medoid_indices = indices;
        Ok(fit)
    }

    /// Move each cluster's medoid to its minimal-cost member.
    ///
    /// Returns per-cluster minimal costs, or `None` if interrupted.
    fn optimize<T: Scalar>(
        &self,
        data: &MaskedDataset<'_, T>,
        labels: &[i32],
        indices: &mut [usize],
    ) -> Option<Vec<f64>> {
        let mut min_costs = vec![f64::MAX; self.k];

        for (slot, medoid) in indices.iter_mut().enumerate() {
            if self.interrupt.is_raised() {
                return None;
            }
            let cluster = members(data, labels, slot as i32 + 1);

            let costs = map_indices(0..cluster.len(), |a| {
                let candidate = data.tuple(cluster[a]);
                cluster
                    .iter()
                    .map(|&m| self.metric.distance(data.tuple(m), candidate))
                    .sum::<f64>()
            });

            // Ascending member order keeps the lowest index on ties.
            for (&candidate, &cost) in cluster.iter().zip(&costs) {
                if cost < min_costs[slot] {
                    min_costs[slot] = cost;
                    *medoid = candidate;
                }
            }
        }
        Some(min_costs)
    }
}

fn copy_medoids<T: Scalar>(data: &MaskedDataset<'_, T>, indices: &[usize], medoids: &mut Representatives<T>) {
    for (slot, &idx) in indices.iter().enumerate() {
        medoids.row_mut(slot + 1).copy_from_slice(data.tuple(idx));
    }
}

impl Default for Kmedoids {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Clustering for Kmedoids {
    fn fit_labels<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<Vec<i32>> {
        self.fit(data).map(|fit| fit.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<i32> {
        // Two groups on a line; 2 and 12 are the true medoids.
        vec![0, 2, 3, 10, 12, 13, 14]
    }

    #[test]
    fn test_kmedoids_finds_true_medoids() {
        let values = line();
        let data = MaskedDataset::new(&values, 1).unwrap();

        let fit = Kmedoids::new(2)
            .with_init(Init::Indices(vec![0, 6]))
            .fit(&data)
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.labels, vec![1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(fit.medoid_indices, vec![1, 4]);
        assert_eq!(fit.medoids.row(1), &[2]);
        assert_eq!(fit.medoids.row(2), &[12]);
        assert_eq!(fit.medoids.row(0), &[0]);
        // |0-2| + |3-2| and |10-12| + |13-12| + |14-12|
        assert_eq!(fit.costs, vec![3.0, 5.0]);
        assert_eq!(fit.total_cost(), 8.0);
    }

    #[test]
    fn test_kmedoids_medoid_belongs_to_own_cluster() {
        let values: Vec<f64> = (0..30).map(|i| ((i * 7919) % 101) as f64).collect();
        let data = MaskedDataset::new(&values, 2).unwrap();

        let fit = Kmedoids::new(3).with_seed(3).fit(&data).unwrap();
        for (slot, &idx) in fit.medoid_indices.iter().enumerate() {
            assert_eq!(fit.labels[idx], slot as i32 + 1);
        }
    }

    #[test]
    fn test_kmedoids_outlier_in_masked_tuple_is_ignored() {
        let mut values = line();
        let mut poisoned = values.clone();
        values.push(5);
        poisoned.push(i32::MAX);
        let mask = [true, true, true, true, true, true, true, false];

        let clean = MaskedDataset::new(&values, 1).unwrap().with_mask(&mask).unwrap();
        let dirty = MaskedDataset::new(&poisoned, 1).unwrap().with_mask(&mask).unwrap();

        let a = Kmedoids::new(2).with_seed(11).fit(&clean).unwrap();
        let b = Kmedoids::new(2).with_seed(11).fit(&dirty).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.medoid_indices, b.medoid_indices);
        assert_eq!(a.labels[7], 0);
    }

    #[test]
    fn test_kmedoids_fixed_init_is_idempotent() {
        let values: Vec<f32> = (0..40).map(|i| (i as f32 * 1.7).cos() * 5.0).collect();
        let data = MaskedDataset::new(&values, 2).unwrap();
        let model = Kmedoids::new(3)
            .with_metric(DistanceMetric::SquaredEuclidean)
            .with_init(Init::Indices(vec![0, 7, 15]));

        assert_eq!(model.fit(&data).unwrap(), model.fit(&data).unwrap());
    }

    #[test]
    fn test_kmedoids_empty_cluster_keeps_medoid() {
        // Seeds 0 and 1 hold the same value, so cluster 2 never gets members.
        let values = [4u8, 4, 6];
        let data = MaskedDataset::new(&values, 1).unwrap();

        let fit = Kmedoids::new(2)
            .with_init(Init::Indices(vec![0, 1]))
            .fit(&data)
            .unwrap();
        assert_eq!(fit.labels, vec![1, 1, 1]);
        assert_eq!(fit.medoid_indices[1], 1);
        assert_eq!(fit.costs[1], f64::MAX);
        // 0 + |4 - 4| + |6 - 4|; the empty cluster adds nothing.
        assert_eq!(fit.total_cost(), 2.0);
    }

    #[test]
    fn test_kmedoids_invalid_params() {
        let values = [0.0f64, 1.0];
        let data = MaskedDataset::new(&values, 1).unwrap();
        assert!(Kmedoids::new(0).fit(&data).is_err());
        assert!(matches!(
            Kmedoids::new(1).with_max_iter(0).fit(&data),
            Err(Error::InvalidParameter { name: "max_iter", .. })
        ));
        assert!(matches!(
            Kmedoids::new(3).fit(&data),
            Err(Error::InvalidClusterCount { requested: 3, n_items: 2 })
        ));
    }

    #[test]
    fn test_kmedoids_cancelled() {
        let values = line();
        let data = MaskedDataset::new(&values, 1).unwrap();
        let interrupt = Interrupt::new();
        interrupt.raise();

        let fit = Kmedoids::new(2)
            .with_seed(5)
            .with_interrupt(interrupt)
            .fit(&data)
            .unwrap();
        assert!(fit.cancelled);
        assert!(!fit.converged);
        assert_eq!(fit.medoid_indices.len(), 2);
    }
}
