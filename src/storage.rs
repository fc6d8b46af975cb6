//! The storage capability consumed by front-ends.
//!
//! A front-end translating protocol commands into store calls is written against
//! one of these traits so it can be handed any backend: the single-threaded
//! [`LruStore`](crate::LruStore) directly, or a shared, internally locked
//! wrapper through [`SyncStorage`].
//!
//! Each operation reports success as a `bool` (or `Option` for `get`); none of
//! them panic for absent keys or over-budget entries.

/// Five-operation key-value storage contract for exclusively owned backends.
pub trait Storage<K, V> {
    /// Inserts or overwrites `key`. Fails only if the entry cannot fit at all.
    fn put(&mut self, key: K, value: V) -> bool;

    /// Inserts `key` only if it is absent.
    fn put_if_absent(&mut self, key: K, value: V) -> bool;

    /// Overwrites `key` only if it is present.
    fn set(&mut self, key: K, value: V) -> bool;

    /// Removes `key` if present.
    fn delete(&mut self, key: &K) -> bool;

    /// Returns a copy of the value stored under `key`.
    fn get(&mut self, key: &K) -> Option<V>;
}

/// The same contract for backends shared between threads.
///
/// Implementations synchronize internally, so every method takes `&self` and a
/// single instance can sit behind an `Arc`.
pub trait SyncStorage<K, V>: Send + Sync {
    /// Inserts or overwrites `key`. Fails only if the entry cannot fit at all.
    fn put(&self, key: K, value: V) -> bool;

    /// Inserts `key` only if it is absent.
    fn put_if_absent(&self, key: K, value: V) -> bool;

    /// Overwrites `key` only if it is present.
    fn set(&self, key: K, value: V) -> bool;

    /// Removes `key` if present.
    fn delete(&self, key: &K) -> bool;

    /// Returns a copy of the value stored under `key`.
    fn get(&self, key: &K) -> Option<V>;
}
