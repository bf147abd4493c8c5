use crate::dataset::MaskedDataset;
use crate::error::Result;
use crate::metric::Scalar;

/// Common interface for hard clustering algorithms (one label per tuple).
///
/// Labels follow the host convention: `0` marks noise, unassigned or
/// masked-out tuples, and discovered clusters are numbered from `1`.
pub trait Clustering {
    /// Run the algorithm and return one label per tuple in `data`.
    ///
    /// A cancelled run still returns `Ok` with whatever partial labels exist.
    fn fit_labels<T: Scalar>(&self, data: &MaskedDataset<'_, T>) -> Result<Vec<i32>>;

    /// The configured number of clusters (if applicable).
    ///
    /// For algorithms that discover the number of clusters dynamically (e.g. DBSCAN),
    /// this returns 0.
    fn n_clusters(&self) -> usize;
}
