//! Errors reported by [`TTree`](crate::TTree) operations.
//!
//! Every error is returned before the tree is mutated: a failed insertion leaves the node arrays,
//! links, heights and length exactly as they were.

use alloc::collections::TryReserveError;

use smallvec::CollectionAllocErr;
use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while building or mutating a [`TTree`](crate::TTree).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A key comparing equal to the inserted one is already stored in a unique index.
    #[error("duplicate key rejected by unique index")]
    DuplicateKey,

    /// Reserving memory for a node or its key array failed.
    #[error("allocation failed while growing the index")]
    AllocationFailure,

    /// The configured node capacity was zero.
    #[error("node capacity must be at least 1")]
    ZeroCapacity,
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::AllocationFailure
    }
}

impl From<CollectionAllocErr> for Error {
    fn from(_: CollectionAllocErr) -> Self {
        Error::AllocationFailure
    }
}
