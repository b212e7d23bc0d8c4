//! Error handling for graphstore operations.
//!
//! Every fallible operation in the crate returns `Result<T, GraphError>`.
//! Failure reporting is entirely local: nothing unwinds across a call
//! boundary, and constructors either hand back a fully initialized value
//! or an error with all partial allocations already released.

use std::io;
use thiserror::Error;

/// Result type for graphstore operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building or operating on a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// I/O error from the underlying filesystem.
    ///
    /// Raised by the memory-mapped engine while creating, sizing, or
    /// opening its backing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Null, out-of-range, or otherwise unusable input.
    ///
    /// Covers missing required dimensions or labels at construction,
    /// out-of-bounds node identifiers and coordinates, unsupported
    /// operations on a fixed-topology backend, and duplicate inserts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A bounded structure has no room left.
    ///
    /// Raised when an array row has no free edge slot, or when a hash
    /// table is tight and must be grown before another insert.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Requested node or edge does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A memory mapping or backing region could not be established.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Persisted metadata disagrees with the caller's expectations.
    ///
    /// Raised on the reopen path of the memory-mapped engine when the
    /// recorded node count or degree does not match what the supplied
    /// dimensions imply. Trusting a mismatched mapping would index
    /// outside the region, so the reopen is refused outright.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
}
