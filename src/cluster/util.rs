use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::representatives::Representatives;
use crate::dataset::MaskedDataset;
use crate::metric::{DistanceMetric, Scalar};

/// Tuples per partial sum in [`cluster_means`].
///
/// Fixed so that the merge order, and therefore every floating-point sum, is
/// identical between runs regardless of thread count.
const REDUCE_CHUNK: usize = 1024;

/// Evaluate `f` for every index in `range`, returning results in index order.
///
/// `f` must be pure with respect to shared state; with the `parallel` feature
/// the indices are spread over the rayon pool.
#[cfg(feature = "parallel")]
pub(crate) fn map_indices<R, F>(range: Range<usize>, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Send + Sync,
{
    range.into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_indices<R, F>(range: Range<usize>, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Send + Sync,
{
    range.map(f).collect()
}

/// Label of the representative nearest to `tuple`.
///
/// Ties go to the lowest cluster id.
#[inline]
pub(crate) fn nearest<T: Scalar, R: Scalar>(
    tuple: &[T],
    reps: &Representatives<R>,
    metric: DistanceMetric,
) -> i32 {
    let mut best_cluster = 1;
    let mut best_dist = f64::INFINITY;
    for c in 1..=reps.n_clusters() {
        let dist = metric.distance(tuple, reps.row(c));
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    best_cluster as i32
}

/// Assign every included tuple to its nearest representative.
///
/// Excluded tuples get label 0.
pub(crate) fn assign_nearest<T: Scalar, R: Scalar>(
    data: &MaskedDataset<'_, T>,
    reps: &Representatives<R>,
    metric: DistanceMetric,
) -> Vec<i32> {
    map_indices(0..data.len(), |i| {
        if data.is_included(i) {
            nearest(data.tuple(i), reps, metric)
        } else {
            0
        }
    })
}

/// Componentwise mean of the included tuples of each cluster `1..=k`.
///
/// Clusters without members get an all-zero row.
pub(crate) fn cluster_means<T: Scalar>(
    data: &MaskedDataset<'_, T>,
    labels: &[i32],
    k: usize,
) -> Representatives<f64> {
    let dims = data.n_components();
    let n = data.len();
    let n_chunks = n.div_ceil(REDUCE_CHUNK);

    let partials = map_indices(0..n_chunks, |chunk| {
        let start = chunk * REDUCE_CHUNK;
        let end = (start + REDUCE_CHUNK).min(n);
        let mut sums = vec![0.0f64; (k + 1) * dims];
        let mut counts = vec![0usize; k + 1];
        for i in start..end {
            if !data.is_included(i) {
                continue;
            }
            let c = labels[i] as usize;
            for (acc, v) in sums[c * dims..(c + 1) * dims].iter_mut().zip(data.tuple(i)) {
                *acc += v.to_f64();
            }
            counts[c] += 1;
        }
        (sums, counts)
    });

    let mut sums = vec![0.0f64; (k + 1) * dims];
    let mut counts = vec![0usize; k + 1];
    for (part_sums, part_counts) in partials {
        for (acc, v) in sums.iter_mut().zip(part_sums) {
            *acc += v;
        }
        for (acc, v) in counts.iter_mut().zip(part_counts) {
            *acc += v;
        }
    }

    let mut means = Representatives::zeros(k, dims);
    for c in 1..=k {
        if counts[c] == 0 {
            continue;
        }
        let denom = counts[c] as f64;
        for (out, sum) in means.row_mut(c).iter_mut().zip(&sums[c * dims..(c + 1) * dims]) {
            *out = sum / denom;
        }
    }
    means
}

/// Ascending indices of the included tuples carrying `label`.
pub(crate) fn members<T: Scalar>(data: &MaskedDataset<'_, T>, labels: &[i32], label: i32) -> Vec<usize> {
    (0..data.len())
        .filter(|&i| data.is_included(i) && labels[i] == label)
        .collect()
}
