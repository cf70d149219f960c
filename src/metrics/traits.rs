//! # Metric Sink Trait
//!
//! This module defines the seam between the cache and whatever counts its
//! traffic. It mirrors the split used elsewhere in the crate: the trait here
//! only *records*, the concrete sinks in `metrics_impl` own the counters, and
//! [`snapshot`](crate::metrics::snapshot) carries the read-side data.
//!
//! ## Design Goals
//! - **Single responsibility**: a sink only increments counters; reading them
//!   back is a concern of the concrete type, not of the trait.
//! - **Lock-free call sites**: every method takes `&self` and is invoked
//!   outside the cache's locks, so implementations must be internally
//!   thread-safe.
//! - **At-least-once, best-effort**: the cache never inspects a sink's state
//!   and never depends on it for correctness.

use std::sync::Arc;

/// Sink for the three lookup counters emitted by the cache.
///
/// Exactly one of these fires per lookup whose outcome is observable:
///
/// | Counter | Fires when |
/// |---------|------------|
/// | `incr_get_hit` | a fresh entry was returned without running the fetch |
/// | `incr_get_success` | the fetch ran and returned `Ok` |
/// | `incr_get_failed` | the fetch ran and returned `Err` |
///
/// A coalesced follower that finds the entry already populated on the
/// post-lock re-check fires no counter.
///
/// # Example
///
/// ```
/// use inertia_cache::metrics::Target;
///
/// #[derive(Default)]
/// struct StdoutTarget;
///
/// impl Target for StdoutTarget {
///     fn incr_get_hit(&self) {
///         println!("hit");
///     }
///     fn incr_get_success(&self) {
///         println!("success");
///     }
///     fn incr_get_failed(&self) {
///         println!("failed");
///     }
/// }
/// ```
pub trait Target: Send + Sync {
    /// Records a lookup served from a fresh entry without running the fetch.
    fn incr_get_hit(&self);

    /// Records a fetch that ran and returned a success.
    fn incr_get_success(&self);

    /// Records a fetch that ran and returned a failure.
    fn incr_get_failed(&self);
}

/// A shared sink counts for every clone of the handle.
///
/// Lets the same counters be owned by the cache and read by an external
/// observer:
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use inertia_cache::metrics::CounterTarget;
/// use inertia_cache::InertiaCache;
///
/// let target = Arc::new(CounterTarget::new());
/// let cache: InertiaCache<u64, String, String, _> = InertiaCache::new(
///     16,
///     Duration::from_secs(60),
///     Duration::from_secs(5),
///     Arc::clone(&target),
/// );
///
/// let _ = cache.get(1, || Ok("one".to_string()));
/// assert_eq!(target.snapshot().get_successes, 1);
/// ```
impl<T: Target + ?Sized> Target for Arc<T> {
    #[inline]
    fn incr_get_hit(&self) {
        (**self).incr_get_hit()
    }

    #[inline]
    fn incr_get_success(&self) {
        (**self).incr_get_success()
    }

    #[inline]
    fn incr_get_failed(&self) {
        (**self).incr_get_failed()
    }
}
