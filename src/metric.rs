//! Distance metrics over numeric tuples.
//!
//! Every metric promotes its inputs to `f64` before any arithmetic, so the same
//! function scores `u8` image channels, `i32` counts or `f32` features alike.
//!
//! | Metric | Definition |
//! |--------|------------|
//! | Euclidean | `√Σ(aᵢ − bᵢ)²` |
//! | Squared Euclidean | `Σ(aᵢ − bᵢ)²` |
//! | Manhattan | `Σ|aᵢ − bᵢ|` |
//! | Cosine | `1 − a·b / (‖a‖‖b‖ + ε)` |
//! | Pearson | `1 − cov(a, b) / (√(var(a)·var(b)) + ε)` |
//! | Squared Pearson | `1 − cov(a, b)² / (var(a)·var(b) + ε)` |
//!
//! For the two correlation metrics the "sample" is the set of components of a
//! single tuple, not a column of the dataset. `ε` is [`f64::MIN_POSITIVE`]; it
//! only keeps zero-magnitude or constant tuples from dividing by zero.

use std::fmt;
use std::str::FromStr;

use num_traits::{AsPrimitive, Zero};

use crate::error::{Error, Result};

mod sealed {
    pub trait Sealed {}
}

/// Closed set of primitive component types accepted by the engines.
///
/// The element type of a buffer is fixed once at the call boundary; all
/// distance math happens in `f64`.
pub trait Scalar:
    AsPrimitive<f64> + Zero + Copy + Send + Sync + fmt::Debug + sealed::Sealed
{
    /// Promote to double precision.
    #[inline]
    fn to_f64(self) -> f64 {
        self.as_()
    }
}

macro_rules! impl_scalar {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}
            impl Scalar for $t {}
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

const GUARD: f64 = f64::MIN_POSITIVE;

/// Selectable distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceMetric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// Euclidean distance without the square root.
    SquaredEuclidean,
    /// Sum of absolute component differences.
    Manhattan,
    /// One minus the cosine of the angle between the tuples.
    Cosine,
    /// One minus the Pearson correlation of the tuples' components.
    Pearson,
    /// One minus the squared Pearson correlation.
    SquaredPearson,
}

impl DistanceMetric {
    /// All metrics, in integer-selector order.
    pub const ALL: [DistanceMetric; 6] = [
        DistanceMetric::Euclidean,
        DistanceMetric::SquaredEuclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::Cosine,
        DistanceMetric::Pearson,
        DistanceMetric::SquaredPearson,
    ];

    /// Display name of the metric.
    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "Euclidean",
            DistanceMetric::SquaredEuclidean => "Squared Euclidean",
            DistanceMetric::Manhattan => "Manhattan",
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::Pearson => "Pearson",
            DistanceMetric::SquaredPearson => "Squared Pearson",
        }
    }

    /// Whether `distance(a, b) == distance(b, a)` holds exactly.
    pub fn is_symmetric(self) -> bool {
        matches!(
            self,
            DistanceMetric::Euclidean
                | DistanceMetric::SquaredEuclidean
                | DistanceMetric::Manhattan
                | DistanceMetric::Cosine
        )
    }

    /// Score the dissimilarity of two tuples of equal length.
    ///
    /// The tuples may have different storage types; K-means compares native
    /// tuples against `f64` means this way.
    pub fn distance<A: Scalar, B: Scalar>(self, a: &[A], b: &[B]) -> f64 {
        debug_assert_eq!(a.len(), b.len());
        let pairs = || a.iter().zip(b.iter()).map(|(x, y)| (x.to_f64(), y.to_f64()));

        match self {
            DistanceMetric::Euclidean => squared_euclidean(pairs()).sqrt(),
            DistanceMetric::SquaredEuclidean => squared_euclidean(pairs()),
            DistanceMetric::Manhattan => pairs().map(|(x, y)| (x - y).abs()).sum(),
            DistanceMetric::Cosine => {
                let (mut dot, mut xx, mut yy) = (0.0, 0.0, 0.0);
                for (x, y) in pairs() {
                    dot += x * y;
                    xx += x * x;
                    yy += y * y;
                }
                1.0 - dot / ((xx * yy).sqrt() + GUARD)
            }
            DistanceMetric::Pearson => {
                let (cov, var_x, var_y) = centered_moments(a, b);
                1.0 - cov / ((var_x * var_y).sqrt() + GUARD)
            }
            DistanceMetric::SquaredPearson => {
                let (cov, var_x, var_y) = centered_moments(a, b);
                1.0 - (cov * cov) / (var_x * var_y + GUARD)
            }
        }
    }
}

#[inline]
fn squared_euclidean(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    pairs
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Un-normalized covariance and variances of two tuples' components.
fn centered_moments<A: Scalar, B: Scalar>(a: &[A], b: &[B]) -> (f64, f64, f64) {
    let dims = a.len() as f64;
    let mean_x = a.iter().map(|x| x.to_f64()).sum::<f64>() / dims;
    let mean_y = b.iter().map(|y| y.to_f64()).sum::<f64>() / dims;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x.to_f64() - mean_x;
        let dy = y.to_f64() - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    (cov, var_x, var_y)
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        DistanceMetric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownMetric(s.to_string()))
    }
}

impl TryFrom<i32> for DistanceMetric {
    type Error = Error;

    fn try_from(selector: i32) -> Result<Self> {
        usize::try_from(selector)
            .ok()
            .and_then(|i| DistanceMetric::ALL.get(i).copied())
            .ok_or_else(|| Error::UnknownMetric(selector.to_string()))
    }
}
