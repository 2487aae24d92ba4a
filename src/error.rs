//! Error types returned by [`AvlTree`](crate::AvlTree).

use std::collections::TryReserveError;

/// Failures surfaced by tree operations.
///
/// Inserting a key that is already present and removing a key that is absent
/// are not errors; those calls report their no-op through their return value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AvlError {
    /// `find_min`/`find_max` was called on a tree with no nodes.
    #[error("the tree is empty")]
    EmptyTree,
    /// The name payload is longer than the configured bound.
    #[error("name is {len} bytes long, at most {max} bytes are allowed")]
    NameTooLong {
        /// Length of the rejected name in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Memory for a new node or its name could not be obtained.
    #[error("failed to allocate node storage: {0}")]
    Alloc(#[from] TryReserveError),
    /// The node arena ran out of 32-bit node ids.
    #[error("node arena is full")]
    CapacityExceeded,
}
