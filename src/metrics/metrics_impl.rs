use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::TargetSnapshot;
use crate::metrics::traits::Target;

/// Atomic counter sink.
///
/// The counters are incremented outside every cache lock, so they use
/// `AtomicU64` with relaxed ordering. Relaxed is sufficient: the counts are
/// observational and carry no happens-before obligations.
///
/// # Example
///
/// ```
/// use inertia_cache::metrics::{CounterTarget, Target};
///
/// let target = CounterTarget::new();
/// target.incr_get_hit();
/// target.incr_get_hit();
/// target.incr_get_failed();
///
/// let snap = target.snapshot();
/// assert_eq!(snap.get_hits, 2);
/// assert_eq!(snap.get_successes, 0);
/// assert_eq!(snap.get_failures, 1);
/// assert_eq!(snap.total(), 3);
/// ```
#[derive(Debug, Default)]
pub struct CounterTarget {
    get_hits: AtomicU64,
    get_successes: AtomicU64,
    get_failures: AtomicU64,
}

impl CounterTarget {
    /// Creates a sink with all counters at zero.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot {
            get_hits: self.get_hits.load(Ordering::Relaxed),
            get_successes: self.get_successes.load(Ordering::Relaxed),
            get_failures: self.get_failures.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.get_hits.store(0, Ordering::Relaxed);
        self.get_successes.store(0, Ordering::Relaxed);
        self.get_failures.store(0, Ordering::Relaxed);
    }
}

impl Target for CounterTarget {
    #[inline]
    fn incr_get_hit(&self) {
        self.get_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn incr_get_success(&self) {
        self.get_successes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn incr_get_failed(&self) {
        self.get_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sink that discards every increment.
///
/// For callers that want the caching behavior without the bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTarget;

impl Target for NoopTarget {
    #[inline]
    fn incr_get_hit(&self) {}

    #[inline]
    fn incr_get_success(&self) {}

    #[inline]
    fn incr_get_failed(&self) {}
}
