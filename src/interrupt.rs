//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag a caller raises to stop a long-running computation.
///
/// Engines poll it at outer-loop granularity. A computation that observes the
/// flag returns early with its `cancelled` marker set; whatever it produced up
/// to that point is partial and meant to be discarded.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A fresh, un-raised flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag shared with other parts of the caller.
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Request cancellation.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear a previous request so the handle can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
