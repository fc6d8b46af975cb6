#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Storage Contract
//!
//! | Operation | Success | Failure |
//! |-----------|---------|---------|
//! | [`put`](LruStore::put) | `true` | entry cannot fit even in an empty store |
//! | [`put_if_absent`](LruStore::put_if_absent) | `true` | key present, or cannot fit |
//! | [`set`](LruStore::set) | `true` | key absent, or cannot fit |
//! | [`delete`](LruStore::delete) | `true` | key absent |
//! | [`get`](LruStore::get) | `Some(value)` | key absent |
//!
//! Each boolean operation has a `try_*` twin returning
//! [`Result<(), StoreError>`](StoreError) for callers that need the reason.
//!
//! ## Byte Accounting
//!
//! An entry costs `key.byte_len() + value.byte_len()` bytes of the budget. The
//! sum over all entries never exceeds `max_size` between operations.
//!
//! ```rust
//! use lru_store::LruStore;
//!
//! let mut store: LruStore = LruStore::new(8);
//! assert!(store.put(b"k1".to_vec(), b"v1".to_vec()));
//! assert!(store.put(b"k2".to_vec(), b"v2".to_vec()));
//! assert_eq!(store.current_size(), 8);
//!
//! // a value that grows evicts older entries
//! assert!(store.set(&b"k2"[..], b"v2v2".to_vec()));
//! assert!(!store.contains_key(&b"k1"[..]));
//! assert_eq!(store.current_size(), 6);
//!
//! // an entry larger than the whole budget is refused, nothing is evicted
//! assert!(!store.put(b"big".to_vec(), vec![0u8; 6]));
//! assert_eq!(store.len(), 1);
//! ```
//!
//! ## Concurrent Store
//!
//! Enable the `concurrent` feature for a thread-safe wrapper:
//!
//! ```toml
//! [dependencies]
//! lru-store = { version = "0.1", features = ["concurrent"] }
//! ```
//!
//! ```rust,ignore
//! use lru_store::ConcurrentLruStore;
//! use std::sync::Arc;
//!
//! let store: Arc<ConcurrentLruStore> = Arc::new(ConcurrentLruStore::new(1024 * 1024));
//!
//! let shared = Arc::clone(&store);
//! std::thread::spawn(move || {
//!     shared.put(b"key".to_vec(), b"value".to_vec());
//! });
//! ```
//!
//! ## Modules
//!
//! - [`lru`]: the byte-budgeted LRU store
//! - [`entry`]: byte accounting for keys and values
//! - [`storage`]: the storage traits front-ends are written against
//! - [`config`]: configuration structures
//! - [`error`]: failure reasons
//! - [`metrics`]: counters and metrics reporting
//! - [`concurrent`]: thread-safe wrapper (requires `concurrent` feature)

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", not(feature = "hashbrown")))]
extern crate std;

#[cfg(test)]
extern crate scoped_threadpool;

/// Arena-backed doubly linked list used for recency order.
///
/// Internal infrastructure; nodes are addressed by slot index.
pub(crate) mod list;

/// Stored entries and the [`ByteSize`] trait.
pub mod entry;

/// Store configuration structures.
pub mod config;

/// Error types.
pub mod error;

/// Byte-budgeted LRU store.
///
/// Provides a store that evicts the least recently used entries when a write
/// would exceed the byte budget.
pub mod lru;

/// Storage traits implemented by every backend.
pub mod storage;

/// Store metrics.
pub mod metrics;

/// Thread-safe store wrapper.
///
/// Puts one or more engines behind `parking_lot` mutexes. Available when the
/// `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

/// Hash builder used when none is supplied.
#[cfg(feature = "hashbrown")]
pub use hashbrown::DefaultHashBuilder;

/// Hash builder used when none is supplied.
#[cfg(not(feature = "hashbrown"))]
pub use std::collections::hash_map::RandomState as DefaultHashBuilder;

pub use config::{LruStoreConfig, DEFAULT_MAX_SIZE};
pub use entry::ByteSize;
pub use error::StoreError;
pub use lru::LruStore;
pub use metrics::CacheMetrics;
pub use storage::{Storage, SyncStorage};

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentLruStore;
