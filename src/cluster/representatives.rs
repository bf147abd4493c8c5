use crate::metric::Scalar;

/// Per-cluster representative tuples, stored as a `(k + 1) × C` table.
///
/// Row `c` holds the representative of cluster `c` for `c` in `1..=k`. Row 0
/// is never written and stays zero, so cluster ids index rows directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Representatives<V> {
    values: Vec<V>,
    n_components: usize,
}

impl<V: Scalar> Representatives<V> {
    /// All-zero table for `k` clusters of `n_components` components.
    pub fn zeros(k: usize, n_components: usize) -> Self {
        Self {
            values: vec![V::zero(); (k + 1) * n_components],
            n_components,
        }
    }

    /// Number of clusters `k` (row 0 excluded).
    #[inline]
    pub fn n_clusters(&self) -> usize {
        self.values.len() / self.n_components - 1
    }

    /// Components per representative.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Representative of cluster `c`.
    #[inline]
    pub fn row(&self, c: usize) -> &[V] {
        &self.values[c * self.n_components..(c + 1) * self.n_components]
    }

    #[inline]
    pub(crate) fn row_mut(&mut self, c: usize) -> &mut [V] {
        &mut self.values[c * self.n_components..(c + 1) * self.n_components]
    }

    /// The whole table, row-major, including the unused row 0.
    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    /// Consume into the row-major buffer.
    pub fn into_vec(self) -> Vec<V> {
        self.values
    }
}
