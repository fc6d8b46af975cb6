//! Stored entry and byte accounting.
//!
//! The store budgets raw content bytes only: an entry costs
//! `key.byte_len() + value.byte_len()`. Bookkeeping overhead (slot links, hash
//! table buckets) is not charged against `max_size`.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// Types whose content size in bytes can be charged against a store budget.
///
/// # Examples
///
/// ```
/// use lru_store::ByteSize;
///
/// assert_eq!(b"abc".to_vec().byte_len(), 3);
/// assert_eq!("héllo".byte_len(), 6);
/// ```
pub trait ByteSize {
    /// Number of content bytes.
    fn byte_len(&self) -> usize;
}

impl ByteSize for [u8] {
    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Vec<u8> {
    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Box<[u8]> {
    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for str {
    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for String {
    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Box<str> {
    #[inline]
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> ByteSize for [u8; N] {
    #[inline]
    fn byte_len(&self) -> usize {
        N
    }
}

impl<T: ByteSize + ?Sized> ByteSize for &T {
    #[inline]
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }
}

/// A key/value pair owned by the store's recency list.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K: ByteSize, V: ByteSize> Entry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Entry { key, value }
    }

    /// Budget bytes charged for this entry.
    #[inline]
    pub(crate) fn footprint(&self) -> u64 {
        footprint(&self.key, &self.value)
    }
}

/// Budget bytes charged for a key/value pair.
#[inline]
pub(crate) fn footprint<K: ByteSize + ?Sized, V: ByteSize + ?Sized>(key: &K, value: &V) -> u64 {
    key.byte_len() as u64 + value.byte_len() as u64
}
