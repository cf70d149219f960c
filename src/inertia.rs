//! # Negative-Caching LRU with Coalesced Refresh
//!
//! This module provides [`InertiaCache`], an in-process bounded cache that
//! memoizes the result of a costly lookup, including its failure, under
//! differentiated time-to-live policies, while guaranteeing that at most one
//! evaluation of the lookup runs concurrently per key.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────────┐
//!   │                     InertiaCache<K, V, E, T>                        │
//!   │                                                                     │
//!   │   ┌──────────────────────────────────────────────────────────┐      │
//!   │   │  Mutex<LruCore<K, Arc<Slot>>>   (cache-level lock)       │      │
//!   │   │                                                          │      │
//!   │   │  held only for index lookups / inserts / removals,       │      │
//!   │   │  never across a fetch                                    │      │
//!   │   └───────────────┬──────────────────────┬───────────────────┘      │
//!   │                   ▼                      ▼                          │
//!   │          ┌─────────────────┐    ┌─────────────────┐                 │
//!   │          │ Slot            │    │ Slot            │   one per key   │
//!   │          │ Mutex<SlotState>│    │ Mutex<SlotState>│                 │
//!   │          │  resolved:      │    │  resolved:      │                 │
//!   │          │   outcome       │    │   outcome       │                 │
//!   │          │   expires       │    │   expires       │                 │
//!   │          └─────────────────┘    └─────────────────┘                 │
//!   │                                                                     │
//!   │   success_ttl / failed_ttl        target: T (metric sink)           │
//!   └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lookup Flow
//!
//! ```text
//!   get(key, fetch)
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   lock cache ── index hit? ──yes──► clone Arc, unlock cache,
//!        │                           lock slot
//!        │                             ├─ fresh? ──► unlock, count hit,
//!        no                            │             return cached outcome
//!        │                             └─ stale/empty: keep slot lock
//!        ▼
//!   create slot, insert into index,
//!   lock slot WHILE cache lock held,
//!   unlock cache
//!        │
//!        ▼
//!   re-check freshness under slot lock
//!        ├─ fresh ──► return cached outcome (coalesced follower, no counter)
//!        └─ stale/empty ──► run fetch holding the slot lock,
//!                           store outcome with success/failed TTL,
//!                           count success or failure, return
//! ```
//!
//! ## Locking Discipline
//!
//! | Lock        | Guards                      | Held across fetch? |
//! |-------------|-----------------------------|--------------------|
//! | cache mutex | index structure and order   | never              |
//! | slot mutex  | one key's memoized outcome  | yes (single-flight)|
//!
//! Lock order is cache → slot, never the reverse. A new slot is locked
//! before the cache lock is released; any caller that finds the slot in the
//! index therefore blocks on the slot mutex until the first fetch publishes,
//! and on waking re-checks freshness instead of fetching again. That
//! re-check is what coalesces a thundering herd into a single fetch.
//!
//! Failures are memoized the same way as successes, under their own
//! (typically shorter) TTL. A cached error is a hit; callers cannot tell it
//! from a fresh one. This is the inertia the crate is named for: after an
//! upstream fault the cache resists re-evaluating the lookup until the
//! negative TTL lapses.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::ConfigError;
use crate::metrics::Target;
use crate::policy::lru::LruCore;

/// Hook invoked with the evicted key when capacity pressure drops an entry.
///
/// The second argument is the entry's last successful value, or `None` when
/// the entry held no success at eviction time (never resolved, resolved to
/// an error, or mid-fetch). Explicit [`InertiaCache::remove`] never fires it.
pub type EvictCallback<K, V> = Box<dyn FnMut(K, Option<V>) + Send>;

/// Published outcome of one fetch, with its freshness deadline.
struct Resolved<V, E> {
    outcome: Result<V, E>,
    expires: Instant,
}

/// Mutable per-key state. `resolved` is `None` until the first fetch
/// publishes.
struct SlotState<V, E> {
    resolved: Option<Resolved<V, E>>,
}

/// Per-key storage unit.
///
/// The mutex serves two purposes: it publishes field writes to other
/// readers, and it serializes would-be fetchers for the same key so that
/// exactly one runs.
struct Slot<V, E> {
    state: Mutex<SlotState<V, E>>,
}

impl<V, E> Slot<V, E> {
    fn new() -> Self {
        Slot {
            state: Mutex::new(SlotState { resolved: None }),
        }
    }
}

/// Bounded, negative-caching LRU with coalesced refresh.
///
/// Type parameters: `K` key, `V` success value, `E` fetch error, `T` metric
/// sink. Outcomes are memoized as `Result<V, E>` and cloned out to every
/// reader while fresh.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use inertia_cache::metrics::CounterTarget;
/// use inertia_cache::InertiaCache;
///
/// let cache: InertiaCache<&str, String, String, _> = InertiaCache::new(
///     64,
///     Duration::from_secs(60),
///     Duration::from_secs(5),
///     CounterTarget::new(),
/// );
///
/// // First lookup runs the fetch.
/// let value = cache.get("user:1", || Ok("alice".to_string()));
/// assert_eq!(value.as_deref(), Ok("alice"));
///
/// // Second lookup is served from the cache; its fetch never runs.
/// let value = cache.get("user:1", || panic!("not called"));
/// assert_eq!(value.as_deref(), Ok("alice"));
///
/// assert_eq!(cache.target().snapshot().get_hits, 1);
/// ```
pub struct InertiaCache<K, V, E, T>
where
    K: Eq + Hash + Clone,
{
    core: Mutex<LruCore<K, Arc<Slot<V, E>>>>,
    success_ttl: Duration,
    failed_ttl: Duration,
    target: T,
}

impl<K, V, E, T> InertiaCache<K, V, E, T>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
    T: Target,
{
    /// Creates a cache without an eviction callback.
    ///
    /// `success_ttl` governs how long an `Ok` outcome stays fresh,
    /// `failed_ttl` how long an `Err` outcome does.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, success_ttl: Duration, failed_ttl: Duration, target: T) -> Self {
        match Self::try_new(capacity, success_ttl, failed_ttl, target) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(
        capacity: usize,
        success_ttl: Duration,
        failed_ttl: Duration,
        target: T,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be > 0"));
        }
        Ok(InertiaCache {
            core: Mutex::new(LruCore::new(capacity)),
            success_ttl,
            failed_ttl,
            target,
        })
    }

    /// Looks up `key`, running `fetch` only when no fresh outcome is cached.
    ///
    /// Returns the memoized `Result` while fresh; a cached `Err` is returned
    /// exactly like a cached `Ok`. When the entry is missing or stale, the
    /// calling thread runs `fetch` while holding the key's slot lock, so
    /// concurrent callers for the same key block and then piggyback on the
    /// published outcome instead of fetching again. Lookups for unrelated
    /// keys are not blocked by an in-flight fetch.
    ///
    /// `fetch` runs without the cache-level lock held, so it may look up
    /// other keys in this cache. It must not look up its own key; that
    /// deadlocks on the slot lock it already holds.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use inertia_cache::metrics::NoopTarget;
    /// use inertia_cache::InertiaCache;
    ///
    /// let cache: InertiaCache<u32, u32, String, _> = InertiaCache::new(
    ///     8,
    ///     Duration::from_secs(60),
    ///     Duration::from_secs(5),
    ///     NoopTarget,
    /// );
    ///
    /// assert_eq!(cache.get(7, || Ok(49)), Ok(49));
    /// assert_eq!(cache.get(7, || Err("unreachable".to_string())), Ok(49));
    /// ```
    pub fn get<F>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut core = self.core.lock();
        let (slot, found) = match core.get(&key) {
            Some(slot) => (Arc::clone(slot), true),
            None => {
                let slot = Arc::new(Slot::new());
                core.insert(key, Arc::clone(&slot));
                (slot, false)
            },
        };

        let mut state;
        if found {
            drop(core);
            state = slot.state.lock();
            if let Some(resolved) = state.resolved.as_ref() {
                if resolved.expires > Instant::now() {
                    let outcome = resolved.outcome.clone();
                    drop(state);
                    self.target.incr_get_hit();
                    return outcome;
                }
            }
        } else {
            // Lock the new slot before releasing the cache lock. Any caller
            // that finds this slot in the index blocks here until the first
            // fetch publishes.
            state = slot.state.lock();
            drop(core);
        }

        // Re-check under the slot lock: a coalesced follower wakes up here
        // after the leader has populated the slot. No counter fires on this
        // path; the leader already recorded the fetch outcome.
        if let Some(resolved) = state.resolved.as_ref() {
            if resolved.expires > Instant::now() {
                return resolved.outcome.clone();
            }
        }

        let outcome = fetch();
        let ttl = if outcome.is_ok() {
            self.success_ttl
        } else {
            self.failed_ttl
        };
        state.resolved = Some(Resolved {
            outcome: outcome.clone(),
            expires: Instant::now() + ttl,
        });
        drop(state);

        match &outcome {
            Ok(_) => self.target.incr_get_success(),
            Err(_) => self.target.incr_get_failed(),
        }

        outcome
    }

    /// Removes `key`, returning whether it was present.
    ///
    /// An in-flight fetch for the key is not cancelled; it publishes into a
    /// slot that is no longer reachable, and the next lookup for the key
    /// fetches into a fresh one. No eviction callback fires.
    pub fn remove(&self, key: &K) -> bool {
        self.core.lock().remove(key).is_some()
    }

    /// Lifecycle hook for symmetry with caches that own background workers.
    ///
    /// This cache has none; the call is a no-op.
    #[inline]
    pub fn stop(&self) {}

    /// Current number of cached entries (fresh, stale, and unresolved).
    pub fn len(&self) -> usize {
        self.core.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.core.lock().is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.core.lock().capacity()
    }

    /// Returns `true` if `key` is cached. Does not promote the entry.
    pub fn contains(&self, key: &K) -> bool {
        self.core.lock().contains(key)
    }

    /// Drops every entry. No eviction callbacks fire.
    pub fn clear(&self) {
        self.core.lock().clear();
    }

    /// TTL applied to successful fetch outcomes.
    #[inline]
    pub fn success_ttl(&self) -> Duration {
        self.success_ttl
    }

    /// TTL applied to failed fetch outcomes.
    #[inline]
    pub fn failed_ttl(&self) -> Duration {
        self.failed_ttl
    }

    /// Borrows the metric sink, e.g. to snapshot a
    /// [`CounterTarget`](crate::metrics::CounterTarget).
    #[inline]
    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<K, V, E, T> InertiaCache<K, V, E, T>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
    E: Clone + 'static,
    T: Target,
{
    /// Creates a cache that reports capacity-pressure evictions.
    ///
    /// The callback receives the evicted key and the entry's last successful
    /// value, if any. It runs synchronously under the cache-level lock, so
    /// it must not call back into the cache.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use std::time::Duration;
    /// use inertia_cache::metrics::NoopTarget;
    /// use inertia_cache::InertiaCache;
    ///
    /// let evicted = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&evicted);
    ///
    /// let cache: InertiaCache<u32, u32, String, _> = InertiaCache::with_evict_callback(
    ///     1,
    ///     Duration::from_secs(60),
    ///     Duration::from_secs(5),
    ///     NoopTarget,
    ///     Box::new(move |key, value| sink.lock().unwrap().push((key, value))),
    /// );
    ///
    /// let _ = cache.get(1, || Ok(10));
    /// let _ = cache.get(2, || Ok(20));
    ///
    /// assert_eq!(*evicted.lock().unwrap(), vec![(1, Some(10))]);
    /// ```
    pub fn with_evict_callback(
        capacity: usize,
        success_ttl: Duration,
        failed_ttl: Duration,
        target: T,
        on_evict: EvictCallback<K, V>,
    ) -> Self {
        match Self::try_with_evict_callback(capacity, success_ttl, failed_ttl, target, on_evict) {
            Ok(cache) => cache,
            Err(err) => panic!("{}", err),
        }
    }

    /// Fallible form of [`with_evict_callback`](Self::with_evict_callback).
    pub fn try_with_evict_callback(
        capacity: usize,
        success_ttl: Duration,
        failed_ttl: Duration,
        target: T,
        mut on_evict: EvictCallback<K, V>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be > 0"));
        }
        // Map the user callback down from slots to values. try_lock keeps
        // the cache-level critical section bounded: a slot whose mutex is
        // held by an in-flight fetcher reports no value, and that fetch
        // result was unreachable from future lookups anyway.
        let core = LruCore::with_evict_callback(
            capacity,
            Box::new(move |key: K, slot: Arc<Slot<V, E>>| {
                let value = slot.state.try_lock().and_then(|state| {
                    state
                        .resolved
                        .as_ref()
                        .and_then(|resolved| resolved.outcome.as_ref().ok().cloned())
                });
                on_evict(key, value);
            }),
        );
        Ok(InertiaCache {
            core: Mutex::new(core),
            success_ttl,
            failed_ttl,
            target,
        })
    }
}

impl<K, V, E, T> fmt::Debug for InertiaCache<K, V, E, T>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.lock();
        f.debug_struct("InertiaCache")
            .field("len", &core.len())
            .field("capacity", &core.capacity())
            .field("success_ttl", &self.success_ttl)
            .field("failed_ttl", &self.failed_ttl)
            .finish_non_exhaustive()
    }
}
