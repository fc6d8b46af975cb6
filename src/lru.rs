//! Byte-Budgeted Least Recently Used (LRU) Store
//!
//! This module provides the storage engine: a key-value store whose total key
//! and value bytes never exceed a fixed budget. When a write needs room, the
//! least recently used entries are evicted until it fits.
//!
//! # Algorithm
//!
//! Entries live in an arena-backed doubly linked list ordered from least
//! recently used (front) to most recently used (back). A hash index maps each
//! key to the slot id of its node, so lookups, recency updates and removals are
//! O(1) without any pointer aliasing.
//!
//! An entry is "touched" when it is read by `get`, inserted, or overwritten.
//! Touching moves the node to the back of the list; eviction pops from the front.
//!
//! # Capacity Checks
//!
//! A write whose own key and value are larger than `max_size` is refused before
//! anything is evicted, so a failed write never changes the store. Any other
//! write always succeeds, evicting as many old entries as needed.
//!
//! # Performance Characteristics
//!
//! | Operation | Time |
//! |-----------|------|
//! | `get` / `get_with` | O(1) |
//! | `put` / `put_if_absent` / `set` | O(1) amortized, plus O(1) per evicted entry |
//! | `delete` / `remove` | O(1) |
//! | `clear` / drop | O(n), iterative |
//!
//! # Thread Safety
//!
//! `LruStore` is not thread-safe and performs no locking. Wrap it in a mutex, or
//! use [`ConcurrentLruStore`](crate::ConcurrentLruStore) with the `concurrent`
//! feature.

extern crate alloc;

use crate::config::{LruStoreConfig, DEFAULT_MAX_SIZE};
use crate::entry::{self, ByteSize, Entry};
use crate::error::{Result, StoreError};
use crate::list::{self, List, SlotId};
use crate::metrics::{CacheMetrics, CoreCacheMetrics};
use crate::storage::Storage;
use crate::DefaultHashBuilder;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use tracing::{debug, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// A byte-budgeted LRU key-value store.
///
/// Keys and values default to `Vec<u8>`; any types implementing
/// [`ByteSize`] can be used. Lookups accept borrowed keys, so a
/// `LruStore<Vec<u8>, Vec<u8>>` is queried with `&[u8]` and a
/// `LruStore<String, String>` with `&str`.
///
/// # Examples
///
/// ```
/// use lru_store::LruStore;
///
/// let mut store: LruStore<String, String> = LruStore::new(10);
///
/// assert!(store.put("ab".to_string(), "cd".to_string()));
/// assert!(store.put("ef".to_string(), "gh".to_string()));
/// assert_eq!(store.current_size(), 8);
///
/// // needs 4 bytes, 2 are free: "ab" is evicted
/// assert!(store.put("ij".to_string(), "kl".to_string()));
/// assert_eq!(store.get("ab"), None);
///
/// // "ef" is refreshed, so "ij" is the next victim
/// assert_eq!(store.get("ef"), Some("gh".to_string()));
/// assert!(store.put("mn".to_string(), "op".to_string()));
/// assert!(store.contains_key("ef"));
/// assert!(!store.contains_key("ij"));
/// ```
pub struct LruStore<K = Vec<u8>, V = Vec<u8>, S = DefaultHashBuilder> {
    config: LruStoreConfig,
    list: List<Entry<K, V>>,
    map: HashMap<K, SlotId, S>,
    current_size: u64,
    metrics: CoreCacheMetrics,
}

impl<K: Hash + Eq, V> LruStore<K, V, DefaultHashBuilder> {
    /// Creates a store holding at most `max_size` bytes of keys and values.
    pub fn new(max_size: u64) -> Self {
        LruStore::with_hasher(max_size, DefaultHashBuilder::default())
    }

    /// Creates a store from a configuration with an optional hasher.
    ///
    /// # Example
    ///
    /// ```
    /// use lru_store::config::LruStoreConfig;
    /// use lru_store::LruStore;
    ///
    /// let config = LruStoreConfig { max_size: 4096 };
    /// let store: LruStore = LruStore::init(config, None);
    /// assert!(store.is_empty());
    /// ```
    pub fn init(config: LruStoreConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        LruStore::with_hasher(config.max_size, hasher.unwrap_or_default())
    }
}

impl<K, V, S> LruStore<K, V, S> {
    /// Creates a store with a custom hash builder.
    pub fn with_hasher(max_size: u64, hash_builder: S) -> Self {
        debug!(max_size, "creating LRU store");
        LruStore {
            config: LruStoreConfig { max_size },
            list: List::new(),
            map: HashMap::with_hasher(hash_builder),
            current_size: 0,
            metrics: CoreCacheMetrics::new(max_size),
        }
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Bytes currently occupied by keys and values.
    #[inline]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// The configured budget in bytes.
    #[inline]
    pub fn max_size(&self) -> u64 {
        self.config.max_size
    }

    /// Bytes that can be written without evicting anything.
    #[inline]
    pub fn available(&self) -> u64 {
        self.config.max_size.saturating_sub(self.current_size)
    }

    /// Counters for this store.
    pub fn stats(&self) -> &CoreCacheMetrics {
        &self.metrics
    }

    /// Iterates over entries from least to most recently used.
    ///
    /// Iteration does not change recency order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }

    /// The key that the next eviction would remove.
    pub fn lru_key(&self) -> Option<&K> {
        self.list.front().map(|entry| &entry.key)
    }

    /// The most recently touched key.
    pub fn mru_key(&self) -> Option<&K> {
        self.list.back().map(|entry| &entry.key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
        self.current_size = 0;
        self.metrics.set_cache_size(0);
    }
}

impl<K, V, S> LruStore<K, V, S>
where
    K: Hash + Eq + ByteSize,
    V: ByteSize,
    S: BuildHasher,
{
    /// Returns `true` if `key` is stored. Does not change recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Returns a reference to the value without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.get(key).copied()?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Returns a copy of the value for `key` and marks it most recently used.
    ///
    /// The copy stays valid regardless of later evictions.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Applies `f` to the value for `key` and marks it most recently used.
    ///
    /// Avoids the clone made by [`get`](Self::get).
    pub fn get_with<Q, F, R>(&mut self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        let Some(id) = self.map.get(key).copied() else {
            self.metrics.record_miss();
            return None;
        };

        self.list.move_to_back(id);
        let entry = self.list.get(id)?;
        self.metrics.record_hit(entry.footprint());
        Some(f(&entry.value))
    }

    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.remove(key)?;
        let entry = self.list.remove(id);
        debug_assert!(entry.is_some(), "index points at a vacant slot");
        let entry = entry?;

        self.current_size -= entry.footprint();
        self.metrics.record_removal();
        self.metrics.set_cache_size(self.current_size);
        Some(entry.value)
    }

    /// Removes `key`, failing with [`StoreError::NotFound`] if it is absent.
    pub fn try_delete<Q>(&mut self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove(key).map(drop).ok_or(StoreError::NotFound)
    }

    /// Removes `key`. Returns `false` if it was absent.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.try_delete(key).is_ok()
    }

    /// Overwrites the value for an existing `key`.
    ///
    /// Fails with [`StoreError::NotFound`] if the key is absent, or
    /// [`StoreError::CapacityExceeded`] if the key and new value alone are larger
    /// than the budget. Neither failure changes the store.
    pub fn try_set<Q>(&mut self, key: &Q, value: V) -> Result<()>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.get(key).copied().ok_or(StoreError::NotFound)?;
        self.overwrite(id, value)
    }

    /// Overwrites the value for an existing `key`. Returns `false` if the key is
    /// absent or the entry cannot fit.
    pub fn set<Q>(&mut self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.try_set(key, value).is_ok()
    }

    /// Ensures the store can take `needed` more bytes, evicting from the
    /// least recently used end. Callers must have checked `needed <= max_size`.
    fn make_room(&mut self, needed: u64) {
        while self.available() < needed {
            let Some(victim) = self.list.pop_front() else {
                break;
            };
            let freed = victim.footprint();
            let indexed = self.map.remove(&victim.key);
            debug_assert!(indexed.is_some(), "evicted entry missing from index");

            self.current_size -= freed;
            self.metrics.record_eviction();
            trace!(
                freed,
                needed,
                available = self.available(),
                "evicted least recently used entry"
            );
        }
    }

    fn ensure_fits(&mut self, needed: u64) -> Result<()> {
        let max_size = self.config.max_size;
        if needed > max_size {
            self.metrics.record_rejection();
            debug!(needed, max_size, "rejecting entry larger than store budget");
            return Err(StoreError::CapacityExceeded { needed, max_size });
        }
        Ok(())
    }

    fn overwrite(&mut self, id: SlotId, value: V) -> Result<()> {
        let Some(entry) = self.list.get(id) else {
            debug_assert!(false, "index points at a vacant slot");
            return Err(StoreError::NotFound);
        };
        let key_len = entry.key.byte_len() as u64;
        let old_len = entry.value.byte_len() as u64;
        let new_len = value.byte_len() as u64;

        self.ensure_fits(key_len + new_len)?;

        // The touched entry sits at the back, and key_len + new_len <= max_size,
        // so eviction stops before reaching it.
        self.list.move_to_back(id);
        if new_len > old_len {
            self.make_room(new_len - old_len);
        }
        debug_assert_eq!(self.list.back_id(), Some(id));

        if let Some(entry) = self.list.get_mut(id) {
            entry.value = value;
        }
        self.current_size = self.current_size - old_len + new_len;
        self.metrics.record_update(new_len);
        self.metrics.set_cache_size(self.current_size);
        Ok(())
    }

    /// Checks that the index and the recency list describe the same entries and
    /// that the size accounting matches them. O(n); meant for tests.
    pub fn is_consistent(&self) -> bool {
        if self.map.len() != self.list.len() {
            return false;
        }

        let mut total = 0u64;
        for entry in self.list.iter() {
            total += entry.footprint();
            let indexed = self
                .map
                .get(&entry.key)
                .and_then(|&id| self.list.get(id))
                .is_some_and(|found| found.key == entry.key);
            if !indexed {
                return false;
            }
        }

        total == self.current_size && self.current_size <= self.config.max_size
    }
}

impl<K, V, S> LruStore<K, V, S>
where
    K: Hash + Eq + Clone + ByteSize,
    V: ByteSize,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Result<()> {
        let needed = entry::footprint(&key, &value);
        self.ensure_fits(needed)?;
        self.make_room(needed);

        let id = self.list.push_back(Entry::new(key.clone(), value));
        self.map.insert(key, id);
        self.current_size += needed;
        self.metrics.record_insertion(needed);
        self.metrics.set_cache_size(self.current_size);
        Ok(())
    }

    /// Inserts or overwrites `key`, marking it most recently used.
    ///
    /// Fails with [`StoreError::CapacityExceeded`] only if the key and value
    /// alone are larger than the budget; the store is then unchanged.
    pub fn try_put(&mut self, key: K, value: V) -> Result<()> {
        match self.map.get(&key).copied() {
            Some(id) => self.overwrite(id, value),
            None => self.insert(key, value),
        }
    }

    /// Inserts or overwrites `key`. Returns `false` if the entry cannot fit.
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.try_put(key, value).is_ok()
    }

    /// Inserts `key` only if it is absent.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the key is present, leaving
    /// its value and recency untouched.
    pub fn try_put_if_absent(&mut self, key: K, value: V) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        self.insert(key, value)
    }

    /// Inserts `key` only if it is absent. Returns `false` otherwise or if the
    /// entry cannot fit.
    pub fn put_if_absent(&mut self, key: K, value: V) -> bool {
        self.try_put_if_absent(key, value).is_ok()
    }
}

impl<K: Hash + Eq, V> Default for LruStore<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        LruStore::new(DEFAULT_MAX_SIZE)
    }
}

impl<K, V, S> Storage<K, V> for LruStore<K, V, S>
where
    K: Hash + Eq + Clone + ByteSize,
    V: Clone + ByteSize,
    S: BuildHasher,
{
    fn put(&mut self, key: K, value: V) -> bool {
        LruStore::put(self, key, value)
    }

    fn put_if_absent(&mut self, key: K, value: V) -> bool {
        LruStore::put_if_absent(self, key, value)
    }

    fn set(&mut self, key: K, value: V) -> bool {
        LruStore::set(self, &key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        LruStore::delete(self, key)
    }

    fn get(&mut self, key: &K) -> Option<V> {
        LruStore::get(self, key)
    }
}

impl<K, V, S> CacheMetrics for LruStore<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}

impl<K, V, S> fmt::Debug for LruStore<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("max_size", &self.config.max_size)
            .field("current_size", &self.current_size)
            .field("len", &self.list.len())
            .finish()
    }
}

/// Iterator over a store's entries from least to most recently used.
pub struct Iter<'a, K, V> {
    inner: list::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.inner.len())
            .finish()
    }
}
