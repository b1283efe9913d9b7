//! Allocation error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur when requesting memory from an
/// [`AlignedAllocator`](crate::AlignedAllocator).
///
/// Both variants propagate synchronously to the caller of `allocate`; there is
/// no retry or fallback strategy. Deallocation has no failure channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested element count exceeds the largest count representable for
    /// the element type and alignment tier. Raised before any platform
    /// allocation is attempted.
    CapacityExceeded {
        /// Number of elements requested.
        requested: usize,
        /// Largest legal element count for this allocator.
        max: usize,
    },
    /// The platform aligned allocator could not satisfy a nonzero-size request.
    AllocationFailed {
        /// Number of bytes requested.
        bytes: usize,
        /// Requested byte alignment.
        align: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { requested, max } => {
                write!(
                    f,
                    "allocation capacity exceeded: requested {requested} elements, maximum {max}"
                )
            }
            Self::AllocationFailed { bytes, align } => {
                write!(
                    f,
                    "aligned allocation failed: {bytes} bytes at {align}-byte alignment"
                )
            }
        }
    }
}

impl Error for AllocError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_capacity_exceeded() {
        let err = AllocError::CapacityExceeded { requested: 10, max: 4 };
        assert_eq!(
            err.to_string(),
            "allocation capacity exceeded: requested 10 elements, maximum 4"
        );
    }

    #[test]
    fn display_allocation_failed() {
        let err = AllocError::AllocationFailed { bytes: 128, align: 32 };
        assert_eq!(
            err.to_string(),
            "aligned allocation failed: 128 bytes at 32-byte alignment"
        );
    }
}
