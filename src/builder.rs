//! Builder for [`InertiaCache`].
//!
//! Collects capacity, the two TTLs, and the optional eviction callback, and
//! defers validation to `build`/`try_build`.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use inertia_cache::builder::InertiaCacheBuilder;
//! use inertia_cache::metrics::CounterTarget;
//!
//! let cache = InertiaCacheBuilder::new(1024)
//!     .success_ttl(Duration::from_secs(30))
//!     .failed_ttl(Duration::from_secs(1))
//!     .build::<String, _>(CounterTarget::new());
//!
//! let value = cache.get("answer", || Ok::<_, String>(42u64));
//! assert_eq!(value, Ok(42));
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::error::ConfigError;
use crate::inertia::{EvictCallback, InertiaCache};
use crate::metrics::Target;

/// TTL applied to successful outcomes unless overridden.
pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_secs(60);

/// TTL applied to failed outcomes unless overridden.
pub const DEFAULT_FAILED_TTL: Duration = Duration::from_secs(5);

/// Builder collecting [`InertiaCache`] configuration.
///
/// The key and value types are fixed by the builder (the eviction callback
/// mentions both); the error and sink types are chosen at `build` time.
pub struct InertiaCacheBuilder<K, V> {
    capacity: usize,
    success_ttl: Duration,
    failed_ttl: Duration,
    on_evict: Option<EvictCallback<K, V>>,
}

impl<K, V> InertiaCacheBuilder<K, V> {
    /// Starts a builder for a cache holding at most `capacity` entries.
    ///
    /// Capacity is validated at `build` time so that misconfiguration is
    /// reportable through [`try_build`](Self::try_build).
    pub fn new(capacity: usize) -> Self {
        InertiaCacheBuilder {
            capacity,
            success_ttl: DEFAULT_SUCCESS_TTL,
            failed_ttl: DEFAULT_FAILED_TTL,
            on_evict: None,
        }
    }

    /// Sets how long a successful outcome stays fresh.
    pub fn success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl = ttl;
        self
    }

    /// Sets how long a failed outcome stays fresh.
    pub fn failed_ttl(mut self, ttl: Duration) -> Self {
        self.failed_ttl = ttl;
        self
    }

    /// Installs an eviction callback.
    ///
    /// See [`InertiaCache::with_evict_callback`] for the callback contract.
    pub fn evict_callback<F>(mut self, on_evict: F) -> Self
    where
        F: FnMut(K, Option<V>) + Send + 'static,
    {
        self.on_evict = Some(Box::new(on_evict));
        self
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is zero.
    pub fn build<E, T>(self, target: T) -> InertiaCache<K, V, E, T>
    where
        K: Eq + Hash + Clone + 'static,
        V: Clone + 'static,
        E: Clone + 'static,
        T: Target,
    {
        match self.try_build(target) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Builds the cache, reporting invalid configuration instead of
    /// panicking.
    pub fn try_build<E, T>(self, target: T) -> Result<InertiaCache<K, V, E, T>, ConfigError>
    where
        K: Eq + Hash + Clone + 'static,
        V: Clone + 'static,
        E: Clone + 'static,
        T: Target,
    {
        match self.on_evict {
            Some(on_evict) => InertiaCache::try_with_evict_callback(
                self.capacity,
                self.success_ttl,
                self.failed_ttl,
                target,
                on_evict,
            ),
            None => InertiaCache::try_new(self.capacity, self.success_ttl, self.failed_ttl, target),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::metrics::{CounterTarget, NoopTarget};

    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let cache = InertiaCacheBuilder::<u64, u64>::new(8).build::<String, _>(NoopTarget);
        assert_eq!(cache.capacity(), 8);
        assert_eq!(cache.success_ttl(), DEFAULT_SUCCESS_TTL);
        assert_eq!(cache.failed_ttl(), DEFAULT_FAILED_TTL);
    }

    #[test]
    fn builder_overrides_ttls() {
        let cache = InertiaCacheBuilder::<u64, u64>::new(8)
            .success_ttl(Duration::from_millis(250))
            .failed_ttl(Duration::from_millis(25))
            .build::<String, _>(NoopTarget);
        assert_eq!(cache.success_ttl(), Duration::from_millis(250));
        assert_eq!(cache.failed_ttl(), Duration::from_millis(25));
    }

    #[test]
    fn builder_installs_evict_callback() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);

        let cache = InertiaCacheBuilder::<u64, u64>::new(1)
            .evict_callback(move |key, value| sink.lock().unwrap().push((key, value)))
            .build::<String, _>(CounterTarget::new());

        let _ = cache.get(1, || Ok(10));
        let _ = cache.get(2, || Ok(20));

        assert_eq!(*evicted.lock().unwrap(), vec![(1, Some(10))]);
    }

    #[test]
    fn try_build_rejects_zero_capacity() {
        let result = InertiaCacheBuilder::<u64, u64>::new(0).try_build::<String, _>(NoopTarget);
        assert!(result.unwrap_err().to_string().contains("capacity"));
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn build_panics_on_zero_capacity() {
        let _cache = InertiaCacheBuilder::<u64, u64>::new(0).build::<String, _>(NoopTarget);
    }
}
