//! # Bounded Recency-Ordered Map (LRU Core)
//!
//! This module provides the single-threaded LRU core underneath
//! [`InertiaCache`](crate::InertiaCache): a bounded mapping that evicts the
//! least-recently-used key on overflow and reports each eviction through an
//! optional callback.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────────┐
//!   │                         LruCore<K, V>                              │
//!   │                                                                    │
//!   │   ┌──────────────────────────────────────────────────────────┐     │
//!   │   │  FxHashMap<K, NonNull<Node>>  (index)                    │     │
//!   │   └───────────────┬───────────────┬───────────────┬──────────┘     │
//!   │                   ▼               ▼               ▼                │
//!   │   head ──► ┌──────────┐ ◄──► ┌──────────┐ ◄──► ┌──────────┐ ◄── tail
//!   │    (MRU)   │ Node     │      │ Node     │      │ Node     │  (LRU) │
//!   │            │ key, val │      │ key, val │      │ key, val │        │
//!   │            └──────────┘      └──────────┘      └──────────┘        │
//!   │                                                                    │
//!   │   on_evict: Option<EvictCallback<K, V>>                            │
//!   │   fired once per capacity-pressure eviction, never by remove/clear │
//!   └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `new(capacity)`  | O(1)       | Create core; panics on zero capacity      |
//! | `insert(k, v)`   | O(1)*      | Insert or replace, may evict LRU          |
//! | `get(&k)`        | O(1)       | Get value, moves to MRU position          |
//! | `remove(&k)`     | O(1)       | Remove entry by key, no callback          |
//! | `contains(&k)`   | O(1)       | Check existence without reordering        |
//! | `peek_lru()`     | O(1)       | Look at the next eviction victim          |
//! | `len()`          | O(1)       | Current number of entries                 |
//! | `capacity()`     | O(1)       | Maximum capacity                          |
//! | `clear()`        | O(n)       | Remove all entries, no callbacks          |
//!
//! ## Thread Safety
//!
//! - `LruCore`: **NOT thread-safe**; it is mutated exclusively under the
//!   cache-level mutex owned by [`InertiaCache`](crate::InertiaCache).
//! - `Send` when `K: Send, V: Send`: the raw node pointers only reference
//!   heap memory owned by the struct.
//!
//! ## Safety
//!
//! Nodes are heap-allocated and tracked via `NonNull` pointers; the hash map
//! owns the key-to-node mapping and the `Drop` impl frees every node. Debug
//! builds re-walk the list after each mutation.

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;

/// Hook invoked with the evicted `(key, value)` when an insert overflows
/// capacity.
///
/// Runs synchronously inside [`LruCore::insert`], so a caller holding a lock
/// around the core holds it across the callback too.
pub type EvictCallback<K, V> = Box<dyn FnMut(K, V) + Send>;

/// Node in the recency list.
///
/// List pointers first, key needed for map removal during eviction, value
/// accessed on get.
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    key: K,
    value: V,
}

/// Bounded recency-ordered map with eviction notification.
///
/// Keys are `Clone` because each key lives twice: once in the node (handed
/// to the eviction callback) and once in the index. Values are stored as
/// given; callers that need shared ownership wrap them in `Arc` themselves.
///
/// # Example
///
/// ```
/// use inertia_cache::policy::lru::LruCore;
///
/// let mut core: LruCore<u32, String> = LruCore::new(2);
/// core.insert(1, "alpha".to_string());
/// core.insert(2, "beta".to_string());
///
/// // get promotes key 1, so key 2 becomes the eviction victim
/// assert_eq!(core.get(&1), Some(&"alpha".to_string()));
/// core.insert(3, "gamma".to_string());
///
/// assert!(core.contains(&1));
/// assert!(!core.contains(&2));
/// assert!(core.contains(&3));
/// ```
pub struct LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
    on_evict: Option<EvictCallback<K, V>>,
}

// SAFETY: LruCore can be sent between threads if K and V are Send. The raw
// pointers only reference heap memory owned by the struct, and the boxed
// callback is itself Send.
unsafe impl<K, V> Send for LruCore<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a core with the given capacity and no eviction callback.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. A bounded cache that can hold nothing
    /// is a programmer error, caught at setup time.
    ///
    /// # Example
    ///
    /// ```
    /// use inertia_cache::policy::lru::LruCore;
    ///
    /// let core: LruCore<u64, u64> = LruCore::new(100);
    /// assert_eq!(core.capacity(), 100);
    /// assert!(core.is_empty());
    /// ```
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, None)
    }

    /// Creates a core that reports capacity-pressure evictions to `on_evict`.
    ///
    /// The callback fires exactly once per evicted entry with the owned
    /// `(key, value)`. Explicit [`remove`](Self::remove) and
    /// [`clear`](Self::clear) never fire it.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use inertia_cache::policy::lru::LruCore;
    ///
    /// let evicted = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&evicted);
    ///
    /// let mut core: LruCore<u32, &str> =
    ///     LruCore::with_evict_callback(2, Box::new(move |k, v| sink.lock().unwrap().push((k, v))));
    ///
    /// core.insert(1, "a");
    /// core.insert(2, "b");
    /// core.insert(3, "c");
    ///
    /// assert_eq!(*evicted.lock().unwrap(), vec![(1, "a")]);
    /// ```
    #[inline]
    pub fn with_evict_callback(capacity: usize, on_evict: EvictCallback<K, V>) -> Self {
        Self::build(capacity, Some(on_evict))
    }

    fn build(capacity: usize, on_evict: Option<EvictCallback<K, V>>) -> Self {
        assert!(capacity > 0, "LruCore capacity must be > 0");
        LruCore {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
            on_evict,
        }
    }

    /// Detach a node from the linked list without removing it from the map.
    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ref();
            let prev = node.prev;
            let next = node.next;

            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => self.head = next,
            }

            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => self.tail = prev,
            }
        }
    }

    /// Attach a node at the front (MRU position).
    #[inline(always)]
    fn attach_front(&mut self, mut node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = None;
            node.next = self.head;

            match self.head {
                Some(mut h) => h.as_mut().prev = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }

            self.head = Some(node_ptr);
        }
    }

    /// Pop the tail node (LRU) and return it.
    #[inline(always)]
    fn pop_tail(&mut self) -> Option<Box<Node<K, V>>> {
        self.tail.map(|tail_ptr| unsafe {
            let node = Box::from_raw(tail_ptr.as_ptr());

            self.tail = node.prev;
            match self.tail {
                Some(mut t) => t.as_mut().next = None,
                None => self.head = None,
            }

            node
        })
    }

    /// Inserts or replaces; on overflow evicts the LRU entry first.
    ///
    /// Replacing an existing key promotes it and returns the previous value;
    /// no eviction happens in that case. Inserting a new key at capacity
    /// pops the tail, removes it from the index, and hands the evicted pair
    /// to the callback before the new node goes in.
    ///
    /// # Example
    ///
    /// ```
    /// use inertia_cache::policy::lru::LruCore;
    ///
    /// let mut core: LruCore<u32, &str> = LruCore::new(2);
    /// assert_eq!(core.insert(1, "first"), None);
    /// assert_eq!(core.insert(1, "second"), Some("first"));
    /// assert_eq!(core.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&node_ptr) = self.map.get(&key) {
            let previous = unsafe {
                let node = &mut *node_ptr.as_ptr();
                std::mem::replace(&mut node.value, value)
            };

            self.detach(node_ptr);
            self.attach_front(node_ptr);

            #[cfg(debug_assertions)]
            self.validate();

            return Some(previous);
        }

        if self.map.len() >= self.capacity {
            if let Some(evicted) = self.pop_tail() {
                self.map.remove(&evicted.key);
                if let Some(cb) = self.on_evict.as_mut() {
                    cb(evicted.key, evicted.value);
                }
            }
        }

        let node = Box::new(Node {
            prev: None,
            next: None,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));

        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);

        #[cfg(debug_assertions)]
        self.validate();

        None
    }

    /// Returns the value for `key` and promotes it to the MRU position.
    #[inline]
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let node_ptr = match self.map.get(key) {
            Some(&ptr) => ptr,
            None => return None,
        };

        self.detach(node_ptr);
        self.attach_front(node_ptr);

        #[cfg(debug_assertions)]
        self.validate();

        unsafe { Some(&(*node_ptr.as_ptr()).value) }
    }

    /// Removes an entry by key and returns its value.
    ///
    /// Explicit removal never fires the eviction callback.
    #[inline]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node_ptr = self.map.remove(key)?;

        self.detach(node_ptr);
        let node = unsafe { Box::from_raw(node_ptr.as_ptr()) };

        #[cfg(debug_assertions)]
        self.validate();

        Some(node.value)
    }

    /// Looks at the entry next in line for eviction without touching order.
    #[inline]
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.tail.map(|tail_ptr| unsafe {
            let node = tail_ptr.as_ref();
            (&node.key, &node.value)
        })
    }

    /// Returns `true` if `key` is present. Does not affect recency order.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the core holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all entries. No eviction callbacks fire.
    pub fn clear(&mut self) {
        while self.pop_tail().is_some() {}
        self.map.clear();

        #[cfg(debug_assertions)]
        self.validate();
    }

    /// Verifies map/list agreement.
    ///
    /// Walks the list from the head, checking that every node is indexed,
    /// that the node count matches the map, and that the size bound holds.
    /// Intended for tests; mutating operations run it automatically in debug
    /// builds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "size {} exceeds capacity {}",
                self.map.len(),
                self.capacity
            )));
        }

        if self.map.is_empty() {
            if self.head.is_some() || self.tail.is_some() {
                return Err(InvariantError::new("empty map with non-empty list"));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev: Option<NonNull<Node<K, V>>> = None;

        while let Some(ptr) = current {
            count += 1;
            if count > self.map.len() {
                return Err(InvariantError::new("cycle detected in recency list"));
            }
            unsafe {
                let node = ptr.as_ref();
                if node.prev != prev {
                    return Err(InvariantError::new("broken back link in recency list"));
                }
                match self.map.get(&node.key) {
                    Some(&indexed) if indexed == ptr => {},
                    Some(_) => {
                        return Err(InvariantError::new("index points at a different node"));
                    },
                    None => return Err(InvariantError::new("listed key missing from index")),
                }
                prev = current;
                current = node.next;
            }
        }

        if prev != self.tail {
            return Err(InvariantError::new("tail does not terminate the list"));
        }
        if count != self.map.len() {
            return Err(InvariantError::new(format!(
                "list length {} does not match index length {}",
                count,
                self.map.len()
            )));
        }
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn validate(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("LruCore invariant violated: {}", err);
        }
    }
}

// Free all heap-allocated nodes when the core is dropped.
impl<K, V> Drop for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        while self.pop_tail().is_some() {}
    }
}

impl<K, V> fmt::Debug for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn evict_log<K, V>() -> (Arc<Mutex<Vec<(K, V)>>>, EvictCallback<K, V>)
    where
        K: Send + 'static,
        V: Send + 'static,
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, Box::new(move |k, v| sink.lock().unwrap().push((k, v))))
    }

    mod correctness {
        use super::*;

        mod basic_behavior {
            use super::*;

            #[test]
            fn test_new_core_is_empty() {
                let core: LruCore<u32, u32> = LruCore::new(10);
                assert_eq!(core.len(), 0);
                assert!(core.is_empty());
                assert_eq!(core.capacity(), 10);
            }

            #[test]
            #[should_panic(expected = "capacity must be > 0")]
            fn test_zero_capacity_panics() {
                let _core: LruCore<u32, u32> = LruCore::new(0);
            }

            #[test]
            fn test_insert_and_get() {
                let mut core = LruCore::new(5);
                assert_eq!(core.insert(1, 100), None);
                assert_eq!(core.get(&1), Some(&100));
                assert_eq!(core.get(&2), None);
            }

            #[test]
            fn test_insert_replaces_existing() {
                let mut core = LruCore::new(5);
                assert_eq!(core.insert(1, 100), None);
                assert_eq!(core.insert(1, 200), Some(100));
                assert_eq!(core.len(), 1);
                assert_eq!(core.get(&1), Some(&200));
            }

            #[test]
            fn test_string_keys() {
                let mut core: LruCore<String, u32> = LruCore::new(5);
                core.insert("alpha".to_string(), 1);
                core.insert("beta".to_string(), 2);
                assert_eq!(core.get(&"alpha".to_string()), Some(&1));
                assert_eq!(core.remove(&"beta".to_string()), Some(2));
            }

            #[test]
            fn test_remove() {
                let mut core = LruCore::new(5);
                core.insert(1, 100);
                assert_eq!(core.remove(&1), Some(100));
                assert_eq!(core.remove(&1), None);
                assert!(core.is_empty());
            }

            #[test]
            fn test_contains_does_not_promote() {
                let mut core = LruCore::new(2);
                core.insert(1, 100);
                core.insert(2, 200);

                assert!(core.contains(&1));

                // Key 1 is still the victim despite the contains check.
                core.insert(3, 300);
                assert!(!core.contains(&1));
                assert!(core.contains(&2));
            }

            #[test]
            fn test_clear() {
                let mut core = LruCore::new(5);
                for i in 0..5 {
                    core.insert(i, i * 10);
                }
                core.clear();
                assert!(core.is_empty());
                assert!(core.get(&0).is_none());
            }

            #[test]
            fn test_single_entry_capacity() {
                let mut core = LruCore::new(1);
                core.insert(1, 100);
                core.insert(2, 200);
                assert_eq!(core.len(), 1);
                assert!(!core.contains(&1));
                assert!(core.contains(&2));
            }
        }

        mod recency_order {
            use super::*;

            #[test]
            fn test_insertion_order_eviction() {
                let mut core = LruCore::new(3);
                core.insert(1, 10);
                core.insert(2, 20);
                core.insert(3, 30);
                core.insert(4, 40);

                assert!(!core.contains(&1));
                assert!(core.contains(&2));
                assert!(core.contains(&3));
                assert!(core.contains(&4));
            }

            #[test]
            fn test_get_promotes() {
                let mut core = LruCore::new(3);
                core.insert(1, 10);
                core.insert(2, 20);
                core.insert(3, 30);

                core.get(&1);
                core.insert(4, 40);

                assert!(core.contains(&1));
                assert!(!core.contains(&2));
            }

            #[test]
            fn test_replace_promotes() {
                let mut core = LruCore::new(2);
                core.insert(1, 10);
                core.insert(2, 20);

                core.insert(1, 11);
                core.insert(3, 30);

                assert!(core.contains(&1));
                assert!(!core.contains(&2));
            }

            #[test]
            fn test_peek_lru_reports_victim() {
                let mut core = LruCore::new(3);
                core.insert(1, 10);
                core.insert(2, 20);

                assert_eq!(core.peek_lru(), Some((&1, &10)));

                core.get(&1);
                assert_eq!(core.peek_lru(), Some((&2, &20)));
            }

            #[test]
            fn test_peek_lru_empty() {
                let core: LruCore<u32, u32> = LruCore::new(3);
                assert_eq!(core.peek_lru(), None);
            }

            #[test]
            fn test_remove_head_middle_tail() {
                let mut core = LruCore::new(3);
                core.insert(1, 10);
                core.insert(2, 20);
                core.insert(3, 30);

                // 3 is MRU (head), 1 is LRU (tail), 2 is in the middle.
                assert_eq!(core.remove(&2), Some(20));
                assert_eq!(core.remove(&3), Some(30));
                assert_eq!(core.remove(&1), Some(10));
                assert!(core.is_empty());
            }
        }

        mod eviction_callback {
            use super::*;

            #[test]
            fn test_callback_fires_once_per_overflow() {
                let (log, cb) = evict_log();
                let mut core = LruCore::with_evict_callback(2, cb);

                core.insert(1, 10);
                core.insert(2, 20);
                assert!(log.lock().unwrap().is_empty());

                core.insert(3, 30);
                assert_eq!(*log.lock().unwrap(), vec![(1, 10)]);

                core.insert(4, 40);
                assert_eq!(*log.lock().unwrap(), vec![(1, 10), (2, 20)]);
            }

            #[test]
            fn test_callback_receives_promoted_order() {
                let (log, cb) = evict_log();
                let mut core = LruCore::with_evict_callback(2, cb);

                core.insert(1, 10);
                core.insert(2, 20);
                core.get(&1);
                core.insert(3, 30);

                assert_eq!(*log.lock().unwrap(), vec![(2, 20)]);
            }

            #[test]
            fn test_replace_does_not_fire_callback() {
                let (log, cb) = evict_log();
                let mut core = LruCore::with_evict_callback(2, cb);

                core.insert(1, 10);
                core.insert(2, 20);
                core.insert(1, 11);

                assert!(log.lock().unwrap().is_empty());
            }

            #[test]
            fn test_remove_does_not_fire_callback() {
                let (log, cb) = evict_log();
                let mut core = LruCore::with_evict_callback(2, cb);

                core.insert(1, 10);
                assert_eq!(core.remove(&1), Some(10));
                assert!(log.lock().unwrap().is_empty());
            }

            #[test]
            fn test_clear_does_not_fire_callback() {
                let (log, cb) = evict_log();
                let mut core = LruCore::with_evict_callback(2, cb);

                core.insert(1, 10);
                core.insert(2, 20);
                core.clear();

                assert!(log.lock().unwrap().is_empty());
            }
        }

        mod invariants {
            use super::*;

            #[test]
            fn test_invariants_after_churn() {
                let mut core = LruCore::new(8);
                for i in 0..100u32 {
                    core.insert(i, i);
                    if i % 3 == 0 {
                        core.get(&(i / 2));
                    }
                    if i % 7 == 0 {
                        core.remove(&(i / 3));
                    }
                    core.check_invariants().unwrap();
                }
                assert!(core.len() <= core.capacity());
            }

            #[test]
            fn test_size_never_exceeds_capacity() {
                let mut core = LruCore::new(4);
                for i in 0..64u32 {
                    core.insert(i, i);
                    assert!(core.len() <= 4);
                }
                core.check_invariants().unwrap();
            }
        }
    }

    mod resource_management {
        use super::*;

        #[test]
        fn test_drop_releases_shared_values() {
            let value = Arc::new(42u32);
            {
                let mut core = LruCore::new(4);
                core.insert(1, Arc::clone(&value));
                core.insert(2, Arc::clone(&value));
                assert_eq!(Arc::strong_count(&value), 3);
            }
            assert_eq!(Arc::strong_count(&value), 1);
        }

        #[test]
        fn test_eviction_releases_value() {
            let value = Arc::new(7u32);
            let mut core = LruCore::new(1);
            core.insert(1, Arc::clone(&value));
            core.insert(2, Arc::new(8u32));
            assert_eq!(Arc::strong_count(&value), 1);
        }

        #[test]
        fn test_core_is_send() {
            fn assert_send<T: Send>() {}
            assert_send::<LruCore<u64, String>>();
        }
    }
}
