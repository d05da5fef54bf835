//! Pool error types

use thiserror::Error;

/// Errors reported by [`FixedPool`](crate::FixedPool) operations.
///
/// All failures are synchronous; nothing is retried internally. Freeing a
/// slot and retrying is the caller's decision.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The backing buffer could not be obtained, or internal bookkeeping
    /// contradicts the available count
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Every slot is currently reserved
    #[error("capacity exceeded: all {capacity} slots reserved")]
    CapacityExceeded {
        /// Total slot count of the pool
        capacity: usize,
    },

    /// The pool hands out exactly one object per call
    #[error("unsupported size: requested {requested} objects, this pool serves one per call")]
    UnsupportedSize {
        /// Number of objects the caller asked for
        requested: usize,
    },

    /// The pointer does not refer to a currently reserved slot of this pool
    #[error("invalid pointer: {address:#x} is not a reserved slot")]
    InvalidPointer {
        /// Address the caller passed in
        address: usize,
    },

    /// Zero-sized element types have no distinct slot addresses
    #[error("zero-sized element types are not supported")]
    ZeroSizedElement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offender() {
        let err = PoolError::CapacityExceeded { capacity: 8 };
        assert!(err.to_string().contains('8'));

        let err = PoolError::UnsupportedSize { requested: 3 };
        assert!(err.to_string().contains('3'));

        let err = PoolError::InvalidPointer { address: 0xdead };
        assert!(err.to_string().contains("0xdead"));
    }
}
