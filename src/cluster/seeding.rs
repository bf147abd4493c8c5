//! Initial representative selection shared by k-means and k-medoids.

use rand::prelude::*;

use crate::dataset::MaskedDataset;
use crate::error::{Error, Result};
use crate::metric::Scalar;

/// How the initial representatives are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Init {
    /// Draw `k` distinct included tuples uniformly at random.
    ///
    /// Unless a seed is configured the generator is seeded from the OS, so
    /// repeated runs may land in different local optima.
    #[default]
    Random,
    /// Use these tuple indices, in order, as the representatives of clusters
    /// `1..=k`.
    Indices(Vec<usize>),
}

/// Pick the `k` tuple indices whose values seed clusters `1..=k`.
///
/// The caller guarantees that at least `k` tuples are included.
pub(crate) fn initial_indices<T: Scalar>(
    data: &MaskedDataset<'_, T>,
    k: usize,
    init: &Init,
    seed: Option<u64>,
) -> Result<Vec<usize>> {
    match init {
        Init::Random => Ok(sample_included(data, k, seed)),
        Init::Indices(indices) => {
            validate_indices(data, k, indices)?;
            Ok(indices.clone())
        }
    }
}

/// Rejection sampling over all tuple indices, discarding masked-out and
/// already chosen tuples.
fn sample_included<T: Scalar>(data: &MaskedDataset<'_, T>, k: usize, seed: Option<u64>) -> Vec<usize> {
    let mut rng: Box<dyn RngCore> = match seed {
        Some(s) => Box::new(StdRng::seed_from_u64(s)),
        None => Box::new(rand::rng()),
    };

    let n = data.len();
    let mut taken = vec![false; n];
    let mut chosen = Vec::with_capacity(k);
    while chosen.len() < k {
        let idx = rng.random_range(0..n);
        if data.is_included(idx) && !taken[idx] {
            taken[idx] = true;
            chosen.push(idx);
        }
    }
    chosen
}

fn validate_indices<T: Scalar>(data: &MaskedDataset<'_, T>, k: usize, indices: &[usize]) -> Result<()> {
    if indices.len() != k {
        return Err(Error::DimensionMismatch {
            expected: k,
            found: indices.len(),
        });
    }
    let mut taken = vec![false; data.len()];
    for &idx in indices {
        if idx >= data.len() {
            return Err(Error::InvalidInitialization {
                index: idx,
                reason: "out of range",
            });
        }
        if !data.is_included(idx) {
            return Err(Error::InvalidInitialization {
                index: idx,
                reason: "tuple is masked out",
            });
        }
        if taken[idx] {
            return Err(Error::InvalidInitialization {
                index: idx,
                reason: "duplicate index",
            });
        }
        taken[idx] = true;
    }
    Ok(())
}
