//! Concurrent Store Wrapper
//!
//! [`LruStore`] does no locking of its own. `ConcurrentLruStore` composes one or
//! more stores with `parking_lot::Mutex` so a single instance can be shared
//! between threads, typically behind an `Arc`.
//!
//! # Segments
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    ConcurrentLruStore                        │
//! │                                                              │
//! │  hash(key) % N  ──▶  Segment Selection                       │
//! │                                                              │
//! │  ┌────────────┐ ┌────────────┐     ┌────────────┐            │
//! │  │ Segment 0  │ │ Segment 1  │ ... │ Segment N-1│            │
//! │  │  [Mutex]   │ │  [Mutex]   │     │  [Mutex]   │            │
//! │  │  LruStore  │ │  LruStore  │     │  LruStore  │            │
//! │  └────────────┘ └────────────┘     └────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **One segment** (the default from [`ConcurrentLruStore::new`]): a single
//!   global lock around one store. LRU order and the byte budget are exactly
//!   those of a plain [`LruStore`].
//! - **N segments**: keys are sharded by hash and each segment gets an equal
//!   share of the budget (the remainder goes to the first segments). Different
//!   segments can be used in parallel, but LRU order is per segment and an entry
//!   must fit in its segment's share.
//!
//! Every operation locks exactly one segment for its whole duration. `Mutex` is
//! used rather than `RwLock` because `get` reorders the recency list.
//!
//! # Example
//!
//! ```rust,ignore
//! use lru_store::concurrent::ConcurrentLruStore;
//! use lru_store::config::{ConcurrentLruStoreConfig, ConcurrentStoreConfig, LruStoreConfig};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let config: ConcurrentLruStoreConfig = ConcurrentStoreConfig {
//!     base: LruStoreConfig { max_size: 1024 * 1024 },
//!     segments: 8,
//! };
//! let store: Arc<ConcurrentLruStore<String, String>> =
//!     Arc::new(ConcurrentLruStore::init(config, None));
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let store = Arc::clone(&store);
//!     thread::spawn(move || {
//!         for j in 0..1000 {
//!             store.put(format!("key-{}-{}", i, j), j.to_string());
//!         }
//!     })
//! }).collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//! ```

extern crate alloc;

use crate::config::ConcurrentLruStoreConfig;
use crate::entry::ByteSize;
use crate::error::Result;
use crate::lru::LruStore;
use crate::metrics::{CacheMetrics, CoreCacheMetrics};
use crate::storage::SyncStorage;
use crate::DefaultHashBuilder;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;
use tracing::debug;

/// A thread-safe byte-budgeted LRU store.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone + ByteSize + Send`.
/// - `V`: Value type. Must implement `Clone + ByteSize + Send`.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Example
///
/// ```rust,ignore
/// use lru_store::ConcurrentLruStore;
/// use std::sync::Arc;
///
/// let store: Arc<ConcurrentLruStore> = Arc::new(ConcurrentLruStore::new(1000));
///
/// store.put(b"key".to_vec(), b"value".to_vec());
/// assert_eq!(store.get(&b"key"[..]), Some(b"value".to_vec()));
/// ```
pub struct ConcurrentLruStore<K = Vec<u8>, V = Vec<u8>, S = DefaultHashBuilder> {
    segments: Box<[Mutex<LruStore<K, V, S>>]>,
    hash_builder: S,
}

/// Splits `max_size` into `count` shares that add up to `max_size`.
fn segment_budgets(max_size: u64, count: usize) -> impl Iterator<Item = u64> {
    let count = count as u64;
    let base = max_size / count;
    let remainder = max_size % count;
    (0..count).map(move |i| base + u64::from(i < remainder))
}

impl<K, V> ConcurrentLruStore<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Creates a single-segment store: one engine behind one global lock.
    pub fn new(max_size: u64) -> Self {
        let config = ConcurrentLruStoreConfig {
            base: crate::config::LruStoreConfig { max_size },
            segments: 1,
        };
        ConcurrentLruStore::init(config, None)
    }

    /// Creates a store from a configuration with an optional hasher.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use lru_store::concurrent::ConcurrentLruStore;
    /// use lru_store::config::{ConcurrentLruStoreConfig, ConcurrentStoreConfig, LruStoreConfig};
    ///
    /// let config: ConcurrentLruStoreConfig = ConcurrentStoreConfig {
    ///     base: LruStoreConfig { max_size: 64 * 1024 },
    ///     segments: 4,
    /// };
    /// let store: ConcurrentLruStore = ConcurrentLruStore::init(config, None);
    /// assert_eq!(store.segment_count(), 4);
    /// ```
    pub fn init(config: ConcurrentLruStoreConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        ConcurrentLruStore::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K, V, S> ConcurrentLruStore<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Clone,
{
    /// Creates a store with a custom hash builder, cloned into every segment.
    pub fn init_with_hasher(config: ConcurrentLruStoreConfig, hash_builder: S) -> Self {
        let segment_count = config.segments.max(1);
        debug!(
            max_size = config.base.max_size,
            segments = segment_count,
            "creating concurrent LRU store"
        );

        let segments: Vec<_> = segment_budgets(config.base.max_size, segment_count)
            .map(|budget| Mutex::new(LruStore::with_hasher(budget, hash_builder.clone())))
            .collect();

        ConcurrentLruStore {
            segments: segments.into_boxed_slice(),
            hash_builder,
        }
    }
}

impl<K, V, S> ConcurrentLruStore<K, V, S>
where
    K: Hash + Eq + ByteSize,
    V: ByteSize,
    S: BuildHasher,
{
    #[inline]
    fn segment<Q>(&self, key: &Q) -> &Mutex<LruStore<K, V, S>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let idx = if self.segments.len() == 1 {
            0
        } else {
            (self.hash_builder.hash_one(key) % self.segments.len() as u64) as usize
        };
        &self.segments[idx]
    }

    /// Returns the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the total number of entries across all segments.
    ///
    /// Locks each segment in turn, so the value may be stale under contention.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.lock().is_empty())
    }

    /// Bytes currently stored across all segments.
    pub fn current_size(&self) -> u64 {
        self.segments.iter().map(|s| s.lock().current_size()).sum()
    }

    /// Total budget across all segments.
    pub fn max_size(&self) -> u64 {
        self.segments.iter().map(|s| s.lock().max_size()).sum()
    }

    /// Returns a copy of the value and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment(key).lock().get(key)
    }

    /// Applies `f` to the value while holding the segment lock.
    ///
    /// Avoids the clone made by `get`; keep `f` short, other callers of the
    /// same segment wait for it.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment(key).lock().get_with(key, f)
    }

    /// Returns a copy of the value without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment(key).lock().peek(key).cloned()
    }

    /// Checks for `key` without changing recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment(key).lock().contains_key(key)
    }

    pub fn try_set<Q>(&self, key: &Q, value: V) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment(key).lock().try_set(key, value)
    }

    /// Overwrites an existing key. See [`LruStore::set`].
    pub fn set<Q>(&self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.try_set(key, value).is_ok()
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment(key).lock().remove(key)
    }

    pub fn try_delete<Q>(&self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment(key).lock().try_delete(key)
    }

    /// Removes `key`. Returns `false` if it was absent.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.try_delete(key).is_ok()
    }

    /// Removes all entries from all segments, one segment at a time.
    pub fn clear(&self) {
        for segment in self.segments.iter() {
            segment.lock().clear();
        }
    }

    /// Aggregated counters from all segments.
    pub fn stats(&self) -> CoreCacheMetrics {
        let mut total = CoreCacheMetrics::default();
        for segment in self.segments.iter() {
            total.accumulate(segment.lock().stats());
        }
        total
    }

    /// Runs [`LruStore::is_consistent`] on every segment.
    pub fn is_consistent(&self) -> bool {
        self.segments.iter().all(|s| s.lock().is_consistent())
    }
}

impl<K, V, S> ConcurrentLruStore<K, V, S>
where
    K: Hash + Eq + Clone + ByteSize,
    V: ByteSize,
    S: BuildHasher,
{
    pub fn try_put(&self, key: K, value: V) -> Result<()> {
        self.segment(&key).lock().try_put(key, value)
    }

    /// Inserts or overwrites `key`. See [`LruStore::put`].
    pub fn put(&self, key: K, value: V) -> bool {
        self.try_put(key, value).is_ok()
    }

    pub fn try_put_if_absent(&self, key: K, value: V) -> Result<()> {
        self.segment(&key).lock().try_put_if_absent(key, value)
    }

    /// Inserts `key` only if it is absent. See [`LruStore::put_if_absent`].
    pub fn put_if_absent(&self, key: K, value: V) -> bool {
        self.try_put_if_absent(key, value).is_ok()
    }
}

impl<K, V, S> SyncStorage<K, V> for ConcurrentLruStore<K, V, S>
where
    K: Hash + Eq + Clone + ByteSize + Send,
    V: Clone + ByteSize + Send,
    S: BuildHasher + Send + Sync,
{
    fn put(&self, key: K, value: V) -> bool {
        ConcurrentLruStore::put(self, key, value)
    }

    fn put_if_absent(&self, key: K, value: V) -> bool {
        ConcurrentLruStore::put_if_absent(self, key, value)
    }

    fn set(&self, key: K, value: V) -> bool {
        ConcurrentLruStore::set(self, &key, value)
    }

    fn delete(&self, key: &K) -> bool {
        ConcurrentLruStore::delete(self, key)
    }

    fn get(&self, key: &K) -> Option<V> {
        ConcurrentLruStore::get(self, key)
    }
}

impl<K, V, S> CacheMetrics for ConcurrentLruStore<K, V, S>
where
    K: Hash + Eq + ByteSize,
    V: ByteSize,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.stats().to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentLRU"
    }
}

impl<K, V, S> fmt::Debug for ConcurrentLruStore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentLruStore")
            .field("segment_count", &self.segments.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConcurrentStoreConfig, LruStoreConfig};
    use crate::error::StoreError;

    extern crate std;
    use std::string::ToString;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    fn make_config(max_size: u64, segments: usize) -> ConcurrentLruStoreConfig {
        ConcurrentStoreConfig {
            base: LruStoreConfig { max_size },
            segments,
        }
    }

    #[test]
    fn test_segment_budgets_sum_to_total() {
        let budgets: Vec<u64> = segment_budgets(10, 4).collect();
        assert_eq!(budgets, [3, 3, 2, 2]);
        assert_eq!(segment_budgets(1024, 16).sum::<u64>(), 1024);
        assert_eq!(segment_budgets(0, 3).collect::<Vec<_>>(), [0, 0, 0]);
    }

    #[test]
    fn test_basic_operations() {
        let store: ConcurrentLruStore<String, String> = ConcurrentLruStore::new(100);
        assert_eq!(store.segment_count(), 1);
        assert!(store.is_empty());

        assert!(store.put("a".to_string(), "1".to_string()));
        assert!(!store.put_if_absent("a".to_string(), "2".to_string()));
        assert!(store.set("a", "3".to_string()));
        assert!(!store.set("b", "3".to_string()));
        assert_eq!(store.get("a"), Some("3".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_size(), 2);

        assert!(store.delete("a"));
        assert!(!store.delete("a"));
        assert_eq!(store.try_delete("a"), Err(StoreError::NotFound));
        assert!(store.is_empty());
    }

    #[test]
    fn test_single_segment_keeps_global_lru_order() {
        let store: ConcurrentLruStore<String, String> = ConcurrentLruStore::new(10);
        store.put("ab".to_string(), "cd".to_string());
        store.put("ef".to_string(), "gh".to_string());
        store.put("ij".to_string(), "kl".to_string());
        assert!(!store.contains_key("ab"));

        assert_eq!(store.get("ef"), Some("gh".to_string()));
        store.put("mn".to_string(), "op".to_string());
        assert!(store.contains_key("ef"));
        assert!(store.contains_key("mn"));
        assert!(!store.contains_key("ij"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_oversized_entry_rejected() {
        let store: ConcurrentLruStore<String, String> = ConcurrentLruStore::new(8);
        store.put("a".to_string(), "1".to_string());
        assert_eq!(
            store.try_put("big".to_string(), "123456".to_string()),
            Err(StoreError::CapacityExceeded {
                needed: 9,
                max_size: 8
            })
        );
        assert_eq!(store.peek("a"), Some("1".to_string()));
        assert_eq!(store.current_size(), 2);
    }

    #[test]
    fn test_segmented_budget() {
        let store: ConcurrentLruStore<String, String> =
            ConcurrentLruStore::init(make_config(1000, 8), None);
        assert_eq!(store.segment_count(), 8);
        assert_eq!(store.max_size(), 1000);

        for i in 0..200 {
            store.put(std::format!("key{:03}", i), "value".to_string());
        }
        assert!(store.current_size() <= 1000);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_zero_segments_treated_as_one() {
        let store: ConcurrentLruStore = ConcurrentLruStore::init(make_config(64, 0), None);
        assert_eq!(store.segment_count(), 1);
        assert_eq!(store.max_size(), 64);
    }

    #[test]
    fn test_get_with_and_remove() {
        let store: ConcurrentLruStore<String, String> =
            ConcurrentLruStore::init(make_config(100, 4), None);
        store.put("key".to_string(), "hello world".to_string());
        assert_eq!(store.get_with("key", |v: &String| v.len()), Some(11));
        assert_eq!(store.get_with("missing", |v: &String| v.len()), None);
        assert_eq!(store.remove("key"), Some("hello world".to_string()));
        assert_eq!(store.remove("key"), None);
    }

    #[test]
    fn test_init_with_hasher() {
        let config = make_config(100, 4);
        let store: ConcurrentLruStore<String, String, _> =
            ConcurrentLruStore::init_with_hasher(config, DefaultHashBuilder::default());
        store.put("test".to_string(), "42".to_string());
        assert_eq!(store.get("test"), Some("42".to_string()));
    }

    #[test]
    fn test_clear() {
        let store: ConcurrentLruStore<String, String> =
            ConcurrentLruStore::init(make_config(100, 4), None);
        for i in 0..5 {
            store.put(i.to_string(), "v".to_string());
        }
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.current_size(), 0);
    }

    #[test]
    fn test_metrics_aggregate_segments() {
        let store: ConcurrentLruStore<String, String> =
            ConcurrentLruStore::init(make_config(100, 4), None);
        store.put("a".to_string(), "1".to_string());
        store.put("b".to_string(), "2".to_string());
        store.get("a");
        store.get("missing");

        let metrics = store.metrics();
        assert_eq!(metrics.get("insertions"), Some(&2.0));
        assert_eq!(metrics.get("requests"), Some(&2.0));
        assert_eq!(metrics.get("cache_hits"), Some(&1.0));
        assert_eq!(metrics.get("hit_rate"), Some(&0.5));
        assert_eq!(metrics.get("max_cache_size_bytes"), Some(&100.0));
        assert_eq!(store.algorithm_name(), "ConcurrentLRU");
    }

    #[test]
    fn test_sync_storage_behind_arc() {
        let store: Arc<dyn SyncStorage<Vec<u8>, Vec<u8>>> =
            Arc::new(ConcurrentLruStore::<Vec<u8>, Vec<u8>>::new(64));
        assert!(store.put(b"k".to_vec(), b"v".to_vec()));
        assert_eq!(store.get(&b"k".to_vec()), Some(b"v".to_vec()));
        assert!(store.delete(&b"k".to_vec()));
    }

    #[test]
    fn test_concurrent_access() {
        let store: Arc<ConcurrentLruStore<String, String>> =
            Arc::new(ConcurrentLruStore::init(make_config(4096, 8), None));
        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    let key = std::format!("thread_{}_key_{}", t, i % 100);
                    match i % 4 {
                        0 => {
                            store.put(key, i.to_string());
                        }
                        1 => {
                            let _ = store.get(key.as_str());
                        }
                        2 => {
                            store.set(key.as_str(), "updated".to_string());
                        }
                        _ => {
                            store.delete(key.as_str());
                        }
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(store.current_size() <= 4096);
        assert!(store.is_consistent());
    }
}
