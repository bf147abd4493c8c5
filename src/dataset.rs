//! Masked, tuple-major views over caller-owned numeric buffers.

use crate::error::{Error, Result};
use crate::metric::Scalar;

/// A read-only view of `N` tuples × `C` components with an optional mask.
///
/// Only tuples whose mask entry is `true` take part in distance computation,
/// cluster formation and representative updates. A missing mask means every
/// tuple is included.
#[derive(Debug, Clone, Copy)]
pub struct MaskedDataset<'a, T: Scalar> {
    values: &'a [T],
    n_components: usize,
    mask: Option<&'a [bool]>,
}

impl<'a, T: Scalar> MaskedDataset<'a, T> {
    /// Interpret `values` as tuples of `n_components` consecutive components.
    pub fn new(values: &'a [T], n_components: usize) -> Result<Self> {
        if n_components == 0 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1",
            });
        }
        if values.len() % n_components != 0 {
            return Err(Error::DimensionMismatch {
                expected: values.len().div_ceil(n_components) * n_components,
                found: values.len(),
            });
        }
        Ok(Self {
            values,
            n_components,
            mask: None,
        })
    }

    /// Attach an inclusion mask with one entry per tuple.
    pub fn with_mask(mut self, mask: &'a [bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                found: mask.len(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    /// Number of tuples, included or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.n_components
    }

    /// True when the buffer holds no tuples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Components per tuple.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// The `i`-th tuple.
    #[inline]
    pub fn tuple(&self, i: usize) -> &'a [T] {
        let start = i * self.n_components;
        &self.values[start..start + self.n_components]
    }

    /// Whether tuple `i` participates.
    #[inline]
    pub fn is_included(&self, i: usize) -> bool {
        self.mask.map_or(true, |m| m[i])
    }

    /// Ascending indices of the included tuples.
    pub fn included_indices(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_included(i)).collect()
    }

    /// Number of included tuples.
    pub fn included_count(&self) -> usize {
        match self.mask {
            Some(m) => m.iter().filter(|&&keep| keep).count(),
            None => self.len(),
        }
    }

    /// Reject datasets with no participating tuples.
    pub(crate) fn require_included(&self) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::EmptyInput);
        }
        match self.included_count() {
            0 => Err(Error::EmptyInput),
            n => Ok(n),
        }
    }
}
