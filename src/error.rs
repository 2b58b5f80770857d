//! Error type shared by every fallible operation in this crate.

use core::fmt;

/// Why a `relmem` operation failed.
///
/// There are exactly two kinds: the underlying allocator (or an edge
/// array growing past its 16-bit cap) refused the request, or the
/// caller passed an argument that does not name a live chunk in a
/// position that requires one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The backing allocator refused the request, or an edge multiset
    /// would have to grow past its 65 535-entry cap.
    AllocationFailure,
    /// A null or otherwise malformed chunk pointer was passed where a
    /// live chunk is required, or a `steal` was ambiguous (an explicit
    /// `old_parent` not found among `child`'s parents, or an implicit
    /// steal requested on a chunk with zero or more than one parent).
    InvalidArgument,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AllocationFailure => f.write_str("relmem: allocation failure"),
            Error::InvalidArgument => f.write_str("relmem: invalid argument"),
        }
    }
}

impl core::error::Error for Error {}

/// Result alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;
