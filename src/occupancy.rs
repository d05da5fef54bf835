//! Per-slot occupancy record
//!
//! One bit per slot, sized exactly to the pool's capacity at construction.
//! No growth, no shrink. The scan for a free slot walks whole words and
//! uses `trailing_zeros` rather than testing bit by bit.

const WORD_BITS: usize = u64::BITS as usize;

/// Bit-per-slot reserved/free record.
#[derive(Debug)]
pub(crate) struct OccupancyMap {
    words: Box<[u64]>,
    capacity: usize,
}

impl OccupancyMap {
    /// Create a map with all `capacity` slots free.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            words: vec![0u64; capacity.div_ceil(WORD_BITS)].into_boxed_slice(),
            capacity,
        }
    }

    /// Whether slot `index` is reserved.
    #[inline]
    pub(crate) fn test(&self, index: usize) -> bool {
        debug_assert!(index < self.capacity, "occupancy index out of range");
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Mark slot `index` reserved.
    #[inline]
    pub(crate) fn set(&mut self, index: usize) {
        debug_assert!(index < self.capacity, "occupancy index out of range");
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Mark slot `index` free.
    #[inline]
    pub(crate) fn clear(&mut self, index: usize) {
        debug_assert!(index < self.capacity, "occupancy index out of range");
        self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }

    /// Lowest free slot index, scanning from 0.
    pub(crate) fn first_free(&self) -> Option<usize> {
        for (word_idx, word) in self.words.iter().enumerate() {
            if *word != u64::MAX {
                let index = word_idx * WORD_BITS + (!word).trailing_zeros() as usize;
                // Bits past capacity in the tail word are always zero but
                // do not correspond to slots.
                if index < self.capacity {
                    return Some(index);
                }
            }
        }
        None
    }
}
