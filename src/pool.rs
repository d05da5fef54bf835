//! Fixed-capacity single-object pool
//!
//! The pool owns one contiguous buffer of `capacity * size_of::<T>()` bytes
//! and reserves one slot per call. Bookkeeping is a bit-per-slot occupancy
//! record, an address-to-index map for reserved slots, and a last-freed hint
//! that the next allocation tries first before falling back to a scan.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ptr::NonNull;

use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::{trace, warn};

use crate::error::PoolError;
use crate::occupancy::OccupancyMap;
use crate::source::{BufferSource, SystemSource};

/// Slot count used by [`FixedPool::new`].
pub const DEFAULT_CAPACITY: usize = 320;

/// Fixed-capacity, fixed-element-size memory pool.
///
/// Hands out and reclaims single `T`-sized slots without touching the
/// general-purpose allocator after construction. The most recently freed
/// slot is reused first; otherwise the lowest free index wins. Worst case
/// for a reservation is one O(capacity) scan.
///
/// All mutation goes through `&mut self`; the pool carries no internal
/// synchronization. Share it across threads only behind external exclusion.
///
/// # Example
/// ```
/// use fixed_pool::FixedPool;
///
/// let mut pool: FixedPool<f64> = FixedPool::with_capacity(16)?;
/// assert_eq!(pool.available_size(), 16);
///
/// let slot = pool.allocate(1)?.unwrap();
/// unsafe {
///     pool.construct(slot, 777.7);
///     assert_eq!(slot.as_ref(), &777.7);
///     pool.deallocate(slot, 1)?;
/// }
/// assert_eq!(pool.available_size(), 16);
/// # Ok::<(), fixed_pool::PoolError>(())
/// ```
pub struct FixedPool<T, S: BufferSource = SystemSource> {
    buffer: NonNull<u8>,
    layout: Layout,
    capacity: usize,
    element_size: usize,
    available: usize,
    occupancy: OccupancyMap,
    /// Address of each reserved slot, keyed for deallocate. Non-owning:
    /// losing an entry never affects the buffer's lifetime.
    reserved: FxHashMap<usize, usize>,
    last_freed: Option<usize>,
    source: S,
    _marker: PhantomData<T>,
}

// SAFETY: the pool exclusively owns its buffer, mutation requires &mut self
// and shared access only reaches the counters, so threading the pool itself
// is sound whenever T and the source are.
unsafe impl<T: Send, S: BufferSource + Send> Send for FixedPool<T, S> {}
unsafe impl<T: Send, S: BufferSource + Sync> Sync for FixedPool<T, S> {}

impl<T> FixedPool<T, SystemSource> {
    /// Create a pool with [`DEFAULT_CAPACITY`] slots on the platform heap.
    pub fn new() -> Result<Self, PoolError> {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a pool with `capacity` slots on the platform heap.
    pub fn with_capacity(capacity: usize) -> Result<Self, PoolError> {
        Self::with_capacity_in(capacity, SystemSource)
    }
}

impl<T, S: BufferSource> FixedPool<T, S> {
    /// Create a pool with `capacity` slots backed by `source`.
    ///
    /// The backing buffer is acquired eagerly and sized exactly to
    /// `capacity * size_of::<T>()`, aligned for `T`. A capacity of zero is
    /// accepted and acquires nothing; every allocation then fails with
    /// [`PoolError::CapacityExceeded`].
    ///
    /// # Errors
    /// [`PoolError::ZeroSizedElement`] if `T` has size zero, and
    /// [`PoolError::AllocationFailure`] if the layout overflows the address
    /// space or the source cannot provide the bytes.
    pub fn with_capacity_in(capacity: usize, source: S) -> Result<Self, PoolError> {
        let element_size = size_of::<T>();
        if element_size == 0 {
            return Err(PoolError::ZeroSizedElement);
        }

        let layout = Layout::array::<T>(capacity)
            .map_err(|e| PoolError::AllocationFailure(e.to_string()))?;
        let buffer = if layout.size() == 0 {
            NonNull::<T>::dangling().cast::<u8>()
        } else {
            source.acquire(layout)?
        };

        trace!(
            capacity,
            element_size,
            total_bytes = layout.size(),
            "pool constructed"
        );

        Ok(Self {
            buffer,
            layout,
            capacity,
            element_size,
            available: capacity,
            occupancy: OccupancyMap::new(capacity),
            reserved: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            last_freed: None,
            source,
            _marker: PhantomData,
        })
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte size of one slot.
    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Number of currently free slots.
    #[inline]
    pub fn available_size(&self) -> usize {
        self.available
    }

    /// Number of currently reserved slots.
    #[inline]
    pub fn reserved_size(&self) -> usize {
        self.capacity - self.available
    }

    /// Whether every slot is reserved.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.available == 0
    }

    /// Whether `ptr` is a currently reserved slot of this pool.
    #[inline]
    pub fn contains(&self, ptr: NonNull<T>) -> bool {
        self.reserved.contains_key(&(ptr.as_ptr() as usize))
    }

    /// Upper bound on slot count the address space permits for `T`.
    #[inline]
    pub fn max_size(&self) -> usize {
        isize::MAX as usize / self.element_size
    }

    /// Snapshot of the pool's bookkeeping counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            element_size: self.element_size,
            available: self.available,
            reserved: self.reserved_size(),
        }
    }

    /// Reserve one slot and return its address.
    ///
    /// `count` exists for generic-allocator interface compatibility only:
    /// this pool serves exactly one object per call. `count == 0` is a
    /// benign no-op returning `Ok(None)`; any `count > 1` is rejected.
    ///
    /// The returned memory is uninitialized. Pair every returned pointer
    /// with one [`construct`](Self::construct) and one later
    /// [`deallocate`](Self::deallocate).
    ///
    /// # Errors
    /// [`PoolError::UnsupportedSize`] for `count > 1`,
    /// [`PoolError::CapacityExceeded`] when no slot is free, and
    /// [`PoolError::AllocationFailure`] if the occupancy record contradicts
    /// the available count (an internal inconsistency, not expected).
    pub fn allocate(&mut self, count: usize) -> Result<Option<NonNull<T>>, PoolError> {
        if count > 1 {
            return Err(PoolError::UnsupportedSize { requested: count });
        }
        if count == 0 {
            return Ok(None);
        }
        if self.available == 0 {
            return Err(PoolError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        // Fast path: the most recently freed slot, if it is still free.
        // The hint is consumed here whether it pays off or turned stale.
        if let Some(index) = self.last_freed.take() {
            if !self.occupancy.test(index) {
                trace!(index, "reusing last freed slot");
                return Ok(Some(self.reserve(index)));
            }
        }

        // Slow path: lowest free index wins.
        match self.occupancy.first_free() {
            Some(index) => {
                trace!(index, "reserving slot from scan");
                Ok(Some(self.reserve(index)))
            }
            None => Err(PoolError::AllocationFailure(format!(
                "occupancy record shows no free slot but {} reported available",
                self.available
            ))),
        }
    }

    /// Place `value` at a slot previously returned by [`allocate`](Self::allocate).
    ///
    /// Narrow trusted primitive: no bounds or reservation check happens
    /// here.
    ///
    /// # Safety
    /// `ptr` must be a pointer returned by `allocate` on this pool that is
    /// still reserved, and its slot must not currently hold a live `T`
    /// (never constructed, or already released).
    pub unsafe fn construct(&mut self, ptr: NonNull<T>, value: T) {
        // SAFETY: caller guarantees ptr is a reserved, vacant slot
        unsafe { ptr.as_ptr().write(value) };
    }

    /// Release one slot: drop the object in place, then free the slot.
    ///
    /// Destruction and freeing are one operation. Do not drop or otherwise
    /// destroy the object first; this call runs `T`'s destructor exactly
    /// once. The freed index becomes the fast-path candidate for the next
    /// [`allocate`](Self::allocate).
    ///
    /// # Safety
    /// `ptr` must address a live, constructed `T` in this pool. The pointer
    /// itself is validated against the reserved-slot map, and nothing is
    /// destroyed when validation fails.
    ///
    /// # Errors
    /// [`PoolError::UnsupportedSize`] for any `count != 1` and
    /// [`PoolError::InvalidPointer`] when `ptr` is not a reserved slot of
    /// this pool.
    pub unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize) -> Result<(), PoolError> {
        if count != 1 {
            return Err(PoolError::UnsupportedSize { requested: count });
        }

        let address = ptr.as_ptr() as usize;
        let Some(index) = self.reserved.remove(&address) else {
            return Err(PoolError::InvalidPointer { address });
        };

        // SAFETY: the slot is reserved and the caller guarantees it holds
        // a constructed T
        unsafe { std::ptr::drop_in_place(ptr.as_ptr()) };

        self.occupancy.clear(index);
        self.last_freed = Some(index);
        self.available += count;
        trace!(index, "freed slot");
        Ok(())
    }

    /// Reserve `index`, record its address, and decrement availability.
    /// Exactly one decrement per successful allocation, on either path.
    fn reserve(&mut self, index: usize) -> NonNull<T> {
        self.occupancy.set(index);
        // SAFETY: index < capacity, so the offset stays inside the buffer
        let ptr = unsafe { self.buffer.as_ptr().add(index * self.element_size) }.cast::<T>();
        self.reserved.insert(ptr as usize, index);
        self.available -= 1;
        // SAFETY: buffer is non-null and the offset is in bounds
        unsafe { NonNull::new_unchecked(ptr) }
    }
}

impl<T, S: BufferSource> Drop for FixedPool<T, S> {
    /// Releases the buffer exactly once. Still-reserved slots are not
    /// destroyed: the pool tracks reservation, not construction, so running
    /// destructors here could read never-initialized memory. Callers drain
    /// the pool before dropping it; anything left is reported and leaked.
    fn drop(&mut self) {
        if !self.reserved.is_empty() {
            warn!(
                leaked = self.reserved.len(),
                "pool dropped with reserved slots; objects were not destroyed"
            );
        }
        if self.layout.size() > 0 {
            // SAFETY: buffer came from this source with this layout and is
            // released exactly once
            unsafe { self.source.release(self.buffer, self.layout) };
        }
    }
}

impl<T, S: BufferSource> std::fmt::Debug for FixedPool<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedPool")
            .field("capacity", &self.capacity)
            .field("element_size", &self.element_size)
            .field("available", &self.available)
            .field("last_freed", &self.last_freed)
            .finish_non_exhaustive()
    }
}

/// Bookkeeping snapshot, see [`FixedPool::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total slot count
    pub capacity: usize,
    /// Byte size of one slot
    pub element_size: usize,
    /// Currently free slots
    pub available: usize,
    /// Currently reserved slots
    pub reserved: usize,
}
