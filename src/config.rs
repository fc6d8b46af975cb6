//! Store Configuration Module
//!
//! Configuration structs have all public fields and are built with a struct
//! literal; there are no builders.
//!
//! # Sizing
//!
//! `max_size` is the budget for *content* bytes: the sum of key and value lengths
//! over every stored entry never exceeds it. Per-entry bookkeeping (slot links,
//! hash buckets) comes on top:
//!
//! ```text
//! Total Memory ≈ max_size + (entries × overhead_per_entry)
//! overhead_per_entry ≈ 40-80 bytes (slot links, index bucket, key copy)
//! ```
//!
//! An entry whose key plus value is larger than `max_size` can never be stored.
//!
//! # Examples
//!
//! ```
//! use lru_store::config::LruStoreConfig;
//! use lru_store::LruStore;
//!
//! // 64KB budget
//! let config = LruStoreConfig {
//!     max_size: 64 * 1024,
//! };
//! let store: LruStore = LruStore::init(config, None);
//! assert_eq!(store.max_size(), 64 * 1024);
//!
//! // Builtin default of 1024 bytes
//! let store: LruStore = LruStore::init(LruStoreConfig::default(), None);
//! assert_eq!(store.max_size(), 1024);
//! ```

use core::fmt;

/// Budget used when no `max_size` is configured.
pub const DEFAULT_MAX_SIZE: u64 = 1024;

/// Configuration for an [`LruStore`](crate::LruStore).
///
/// # Fields
///
/// - `max_size`: Maximum total of key and value bytes across all entries.
///   Zero is accepted and yields a store that rejects every non-empty write.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LruStoreConfig {
    /// Maximum total size in bytes of all stored keys and values.
    pub max_size: u64,
}

impl Default for LruStoreConfig {
    fn default() -> Self {
        LruStoreConfig {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl fmt::Debug for LruStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStoreConfig")
            .field("max_size", &self.max_size)
            .finish()
    }
}

/// Generic configuration wrapper for concurrent stores.
///
/// Wraps a base store configuration and adds the number of independently
/// locked segments. One segment means a single global lock around one engine
/// and exact LRU order; more segments shard keys by hash and split the byte
/// budget between them. A `segments` value of 0 is treated as 1.
///
/// # Example
///
/// ```ignore
/// use lru_store::config::{ConcurrentLruStoreConfig, ConcurrentStoreConfig, LruStoreConfig};
///
/// let config: ConcurrentLruStoreConfig = ConcurrentStoreConfig {
///     base: LruStoreConfig { max_size: 1024 * 1024 },
///     segments: 8,
/// };
/// ```
#[cfg(feature = "concurrent")]
#[derive(Clone, Copy)]
pub struct ConcurrentStoreConfig<C> {
    /// Base configuration; its budget is the total across all segments
    pub base: C,
    /// Number of segments for sharding
    pub segments: usize,
}

#[cfg(feature = "concurrent")]
impl<C: fmt::Debug> fmt::Debug for ConcurrentStoreConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentStoreConfig")
            .field("base", &self.base)
            .field("segments", &self.segments)
            .finish()
    }
}

#[cfg(feature = "concurrent")]
impl<C: Default> Default for ConcurrentStoreConfig<C> {
    fn default() -> Self {
        ConcurrentStoreConfig {
            base: C::default(),
            segments: 1,
        }
    }
}

#[cfg(feature = "concurrent")]
/// Configuration for a concurrent LRU store.
/// Type alias for `ConcurrentStoreConfig<LruStoreConfig>`.
pub type ConcurrentLruStoreConfig = ConcurrentStoreConfig<LruStoreConfig>;
