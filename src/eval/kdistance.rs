//! K-distance graph: distance from each tuple to its k-th nearest neighbor.
//!
//! Sorting these distances and looking for the knee of the curve is the usual
//! way to pick DBSCAN's epsilon (with `k = min_pts - 1`).
//!
//! Each tuple's candidate list contains the tuple itself at distance zero, so
//! index 0 is always the self distance and `k = 1` is the nearest *other*
//! included tuple. When `k` reaches past the end of the list the farthest
//! distance is reported instead.
//!
//! O(n²) distance evaluations plus an O(n log n) sort per tuple.

use tracing::debug;

use crate::cluster::util::map_indices;
use crate::dataset::MaskedDataset;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::metric::{DistanceMetric, Scalar};

/// K-distance graph calculator.
#[derive(Debug, Clone)]
pub struct KDistanceGraph {
    k: usize,
    metric: DistanceMetric,
    interrupt: Interrupt,
}

/// Per-tuple k-th neighbor distances.
#[derive(Debug, Clone, PartialEq)]
pub struct KDistances {
    /// One distance per tuple; masked-out tuples hold `0.0`.
    pub distances: Vec<f64>,
    included: Vec<usize>,
    /// The run observed its interrupt and stopped early; values are partial.
    pub cancelled: bool,
}

impl KDistances {
    /// Included tuples' distances sorted in descending order, the curve whose
    /// knee suggests an epsilon.
    pub fn knee_curve(&self) -> Vec<f64> {
        let mut curve: Vec<f64> = self.included.iter().map(|&i| self.distances[i]).collect();
        curve.sort_by(|a, b| b.total_cmp(a));
        curve
    }
}

impl KDistanceGraph {
    /// Distance to the `k`-th nearest neighbor, self counted at position 0.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: DistanceMetric::Euclidean,
            interrupt: Interrupt::default(),
        }
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

    /// Compute the k-th neighbor distance of every included tuple.
    pub fn compute<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<KDistances> {
        if self.k == 0 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "kth nearest neighbor must be greater than 0",
            });
        }
        data.require_included()?;

        let included = data.included_indices();
        let distances = map_indices(0..data.len(), |i| {
            if !data.is_included(i) || self.interrupt.is_raised() {
                return 0.0;
            }
            let point = data.tuple(i);
            let mut row: Vec<f64> = included
                .iter()
                .map(|&j| self.metric.distance(data.tuple(j), point))
                .collect();
            row.sort_by(|a, b| a.total_cmp(b));
            row[self.k.min(row.len() - 1)]
        });

        let cancelled = self.interrupt.is_raised();
        if cancelled {
            debug!("k-distance graph interrupted");
        }
        Ok(KDistances {
            distances,
            included,
            cancelled,
        })
    }
}

impl Default for KDistanceGraph {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_neighbor_distance() {
        let values = [0.0f64, 1.0, 3.0, 7.0];
        let data = MaskedDataset::new(&values, 1).unwrap();

        let out = KDistanceGraph::new(1).compute(&data).unwrap();
        assert_eq!(out.distances, vec![1.0, 1.0, 2.0, 4.0]);
        assert!(!out.cancelled);
    }

    #[test]
    fn test_k_zero_rejected() {
        let values = [0.0f64, 1.0];
        let data = MaskedDataset::new(&values, 1).unwrap();
        assert!(KDistanceGraph::new(0).compute(&data).is_err());
    }

    #[test]
    fn test_large_k_clamps_to_farthest() {
        let values = [0i32, 1, 3, 7];
        let data = MaskedDataset::new(&values, 1).unwrap();

        let out = KDistanceGraph::new(10).compute(&data).unwrap();
        assert_eq!(out.distances, vec![7.0, 6.0, 4.0, 7.0]);
    }

    #[test]
    fn test_masked_tuples_are_skipped() {
        let values = [0.0f32, 0.5, 1.0, 100.0];
        let mask = [true, false, true, true];
        let data = MaskedDataset::new(&values, 1).unwrap().with_mask(&mask).unwrap();

        let out = KDistanceGraph::new(1).compute(&data).unwrap();
        assert_eq!(out.distances, vec![1.0, 0.0, 1.0, 99.0]);
        assert_eq!(out.knee_curve(), vec![99.0, 1.0, 1.0]);
    }

    #[test]
    fn test_single_included_tuple_reports_self() {
        let values = [2.0f64, 5.0];
        let mask = [false, true];
        let data = MaskedDataset::new(&values, 1).unwrap().with_mask(&mask).unwrap();

        let out = KDistanceGraph::new(3).compute(&data).unwrap();
        assert_eq!(out.distances, vec![0.0, 0.0]);
    }

    #[test]
    fn test_manhattan_metric() {
        let values = [0.0f64, 0.0, 1.0, 1.0, 3.0, 0.0];
        let data = MaskedDataset::new(&values, 2).unwrap();

        let out = KDistanceGraph::new(2)
            .with_metric(DistanceMetric::Manhattan)
            .compute(&data)
            .unwrap();
        assert_eq!(out.distances, vec![3.0, 3.0, 3.0]);
    }

    #[test]
    fn test_kdistance_cancelled() {
        let values = [0.0f64, 1.0, 3.0, 7.0];
        let data = MaskedDataset::new(&values, 1).unwrap();
        let interrupt = Interrupt::new();
        interrupt.raise();

        let out = KDistanceGraph::new(1)
            .with_interrupt(interrupt)
            .compute(&data)
            .unwrap();
        assert!(out.cancelled);
        assert_eq!(out.distances.len(), 4);
    }
}
