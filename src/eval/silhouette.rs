//! Silhouette coefficients for an existing label assignment.
//!
//! For an included tuple `i` in cluster `c`:
//!
//! ```text
//! avg(i, c') = mean distance from i to every included tuple labeled c'
//! a(i)       = avg(i, c)
//! b(i)       = min over non-empty c' != c of avg(i, c')
//! s(i)       = (b(i) - a(i)) / max(a(i), b(i))
//! ```
//!
//! The averages include `i` itself, so `a(i)` is biased slightly low for small
//! clusters.
//!
//! Label `0` marks noise or unassigned tuples. They take no part in any
//! cluster average, score `0.0` themselves and are left out of the mean.
//! When `i` has no other non-empty cluster to compare against, or when
//! `max(a, b)` is zero, `s(i)` is `0.0`.

use tracing::debug;

use crate::cluster::util::map_indices;
use crate::dataset::MaskedDataset;
use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::metric::{DistanceMetric, Scalar};

/// Silhouette evaluator.
#[derive(Debug, Clone)]
pub struct Silhouette {
    num_clusters: usize,
    metric: DistanceMetric,
    interrupt: Interrupt,
}

/// Per-tuple silhouette coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct SilhouetteScores {
    /// One coefficient in `[-1, 1]` per tuple; masked-out and noise tuples
    /// hold `0.0`.
    pub values: Vec<f64>,
    /// Mean coefficient over included tuples with a cluster label, or `0.0`
    /// when there are none.
    pub mean: f64,
    /// The run observed its interrupt and stopped early; values are partial.
    pub cancelled: bool,
}

impl Silhouette {
    /// Evaluate labels drawn from `0..=num_clusters`.
    pub fn new(num_clusters: usize) -> Self {
        Self {
            num_clusters,
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

    fn validate<T: Scalar>(&self, data: &MaskedDataset<'_, T>, labels: &[i32]) -> Result<()> {
        if self.num_clusters == 0 {
            return Err(Error::InvalidParameter {
                name: "num_clusters",
                message: "must be at least 1",
            });
        }
        data.require_included()?;
        if labels.len() != data.len() {
            return Err(Error::DimensionMismatch {
                expected: data.len(),
                found: labels.len(),
            });
        }
        for (index, &label) in labels.iter().enumerate() {
            if data.is_included(index) && (label < 0 || label as usize > self.num_clusters) {
                return Err(Error::InvalidLabel {
                    index,
                    label,
                    max: self.num_clusters,
                });
            }
        }
        Ok(())
    }

    /// Score every included tuple of `data` under `labels`.
    pub fn evaluate<T: Scalar>(&self, data: &MaskedDataset<'_, T>, labels: &[i32]) -> Result<SilhouetteScores> {
        self.validate(data, labels)?;
        let width = self.num_clusters + 1;

        // Included tuples that belong to a cluster; row 0 of `counts` stays empty.
        let clustered: Vec<usize> = data
            .included_indices()
            .into_iter()
            .filter(|&j| labels[j] > 0)
            .collect();
        let mut counts = vec![0usize; width];
        for &j in &clustered {
            counts[labels[j] as usize] += 1;
        }

        let values = map_indices(0..data.len(), |i| {
            if !data.is_included(i) || labels[i] == 0 || self.interrupt.is_raised() {
                return 0.0;
            }
            let point = data.tuple(i);
            let mut sums = vec![0.0f64; width];
            for &j in &clustered {
                sums[labels[j] as usize] += self.metric.distance(point, data.tuple(j));
            }

            let own = labels[i] as usize;
            let a = sums[own] / counts[own] as f64;
            let b = (1..width)
                .filter(|&c| c != own && counts[c] > 0)
                .map(|c| sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);

            coefficient(a, b)
        });

        let cancelled = self.interrupt.is_raised();
        if cancelled {
            debug!("silhouette interrupted");
        }
        let mean = if clustered.is_empty() {
            0.0
        } else {
            clustered.iter().map(|&i| values[i]).sum::<f64>() / clustered.len() as f64
        };

        Ok(SilhouetteScores {
            values,
            mean,
            cancelled,
        })
    }
}

/// `(b - a) / max(a, b)`, with `0.0` when `b` does not exist or the
/// denominator vanishes.
fn coefficient(a: f64, b: f64) -> f64 {
    if !b.is_finite() {
        return 0.0;
    }
    let denom = a.max(b);
    if denom > 0.0 {
        (b - a) / denom
    } else {
        0.0
    }
}
