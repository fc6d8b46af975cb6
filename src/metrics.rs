//! Store Metrics
//!
//! Counters kept by the store and reported through the [`CacheMetrics`] trait as
//! a `BTreeMap<String, f64>`, so the key order is the same on every call.
//!
//! The engine's own size accounting is authoritative; `cache_size_bytes` here is
//! a mirror refreshed after each mutation.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// Counters tracked by an [`LruStore`](crate::LruStore).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoreCacheMetrics {
    /// Total number of lookups (gets)
    pub requests: u64,

    /// Lookups that found the key
    pub cache_hits: u64,

    /// Total bytes of the entries that were found (hits only; misses have no size)
    pub bytes_served_from_cache: u64,

    /// Total bytes written by inserts and overwrites
    pub bytes_written_to_cache: u64,

    /// New entries created
    pub insertions: u64,

    /// Existing entries overwritten
    pub updates: u64,

    /// Entries removed by an explicit delete
    pub removals: u64,

    /// Entries removed to make room for a write
    pub evictions: u64,

    /// Writes refused because the entry could never fit
    pub rejected_writes: u64,

    /// Current size of stored keys and values (in bytes)
    pub cache_size_bytes: u64,

    /// Configured budget (in bytes)
    pub max_cache_size_bytes: u64,
}

impl CoreCacheMetrics {
    /// Creates a new metrics instance for the given budget.
    pub fn new(max_cache_size_bytes: u64) -> Self {
        Self {
            max_cache_size_bytes,
            ..Default::default()
        }
    }

    /// Records a lookup that found an entry of `object_size` bytes.
    pub fn record_hit(&mut self, object_size: u64) {
        self.requests += 1;
        self.cache_hits += 1;
        self.bytes_served_from_cache += object_size;
    }

    /// Records a lookup for an absent key.
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a new entry.
    pub fn record_insertion(&mut self, object_size: u64) {
        self.insertions += 1;
        self.bytes_written_to_cache += object_size;
    }

    /// Records an overwrite of an existing entry with `object_size` new bytes.
    pub fn record_update(&mut self, object_size: u64) {
        self.updates += 1;
        self.bytes_written_to_cache += object_size;
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_rejection(&mut self) {
        self.rejected_writes += 1;
    }

    /// Mirrors the engine's current size.
    #[inline]
    pub fn set_cache_size(&mut self, bytes: u64) {
        self.cache_size_bytes = bytes;
    }

    /// Adds another instance's counters and sizes into this one.
    ///
    /// Used to report several independently locked stores as one.
    pub fn accumulate(&mut self, other: &CoreCacheMetrics) {
        self.requests += other.requests;
        self.cache_hits += other.cache_hits;
        self.bytes_served_from_cache += other.bytes_served_from_cache;
        self.bytes_written_to_cache += other.bytes_written_to_cache;
        self.insertions += other.insertions;
        self.updates += other.updates;
        self.removals += other.removals;
        self.evictions += other.evictions;
        self.rejected_writes += other.rejected_writes;
        self.cache_size_bytes += other.cache_size_bytes;
        self.max_cache_size_bytes += other.max_cache_size_bytes;
    }

    /// Number of lookups that missed.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Hit rate between 0.0 and 1.0, or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss rate between 0.0 and 1.0, or 0.0 if no lookups have been made.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Share of the budget currently in use, or 0.0 for a zero budget.
    pub fn cache_utilization(&self) -> f64 {
        if self.max_cache_size_bytes > 0 {
            self.cache_size_bytes as f64 / self.max_cache_size_bytes as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a map with deterministic key order.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("updates".to_string(), self.updates as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("rejected_writes".to_string(), self.rejected_writes as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics.insert(
            "bytes_served_from_cache".to_string(),
            self.bytes_served_from_cache as f64,
        );
        metrics.insert(
            "bytes_written_to_cache".to_string(),
            self.bytes_written_to_cache as f64,
        );

        metrics.insert("cache_size_bytes".to_string(), self.cache_size_bytes as f64);
        metrics.insert(
            "max_cache_size_bytes".to_string(),
            self.max_cache_size_bytes as f64,
        );
        metrics.insert("cache_utilization".to_string(), self.cache_utilization());

        metrics
    }
}

/// Uniform metrics reporting for store implementations.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Algorithm name for identification (e.g. "LRU").
    fn algorithm_name(&self) -> &'static str;
}

impl CacheMetrics for CoreCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
