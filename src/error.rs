//! Error types for store operations.
//!
//! The boolean operations on [`LruStore`](crate::LruStore) are thin wrappers over
//! their `try_*` counterparts, which report why a write was refused.

use thiserror::Error;

/// Reason a store operation did not apply.
///
/// Every variant is recoverable and leaves the store unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The key is not present
    #[error("key not found")]
    NotFound,

    /// The key is already present (`put_if_absent`)
    #[error("key already exists")]
    AlreadyExists,

    /// The entry does not fit even in an otherwise empty store
    #[error("entry of {needed} bytes exceeds the store budget of {max_size} bytes")]
    CapacityExceeded {
        /// Bytes the entry would occupy
        needed: u64,
        /// Configured budget
        max_size: u64,
    },
}

/// Convenience Result type for store operations.
pub type Result<T> = core::result::Result<T, StoreError>;
