//! Raw memory sources
//!
//! The pool acquires its backing buffer exactly once, at construction, and
//! releases it exactly once, on drop. That seam is a trait so tests can
//! substitute a counting or failing source for the platform heap.

use std::alloc::{Layout, alloc, dealloc};
use std::ptr::NonNull;

use crate::error::PoolError;

/// Provider of contiguous raw byte regions.
///
/// Implementations hand out uninitialized memory; the pool never reads a
/// byte it has not written.
pub trait BufferSource {
    /// Acquire a region described by `layout`.
    ///
    /// `layout.size()` is always nonzero when the pool calls this.
    fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, PoolError>;

    /// Release a region previously returned by [`acquire`](Self::acquire).
    ///
    /// # Safety
    /// `ptr` must come from `acquire` on this same source with the same
    /// `layout`, and must not be released twice.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The platform heap, via `std::alloc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSource;

impl BufferSource for SystemSource {
    fn acquire(&self, layout: Layout) -> Result<NonNull<u8>, PoolError> {
        debug_assert!(layout.size() > 0, "zero-sized acquire");
        // SAFETY: layout has nonzero size, checked above
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| {
            PoolError::AllocationFailure(format!(
                "system allocator returned null for {} bytes",
                layout.size()
            ))
        })
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr/layout came from acquire
        unsafe { dealloc(ptr.as_ptr(), layout) };
    }
}
