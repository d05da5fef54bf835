//! Fixed-capacity single-object memory pool
//!
//! One contiguous buffer, one slot per allocation, no general-purpose
//! allocator traffic after setup.
//!
//! Key design points:
//! - Bit-per-slot occupancy record sized exactly to the requested capacity
//! - Last-freed slot reused first, lowest free index otherwise
//! - Address-to-index map validates pointers at release time
//! - Release destroys and frees in one step; no separate destroy call
//! - Raw memory comes from an injected [`BufferSource`], the platform heap
//!   by default
//!
//! Single-threaded by design: mutation requires `&mut` access and the pool
//! carries no internal synchronization.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![allow(unsafe_code)] // Raw-buffer slot management is the point of the crate

pub mod error;
mod occupancy;
pub mod pool;
pub mod source;

pub use error::PoolError;
pub use pool::{DEFAULT_CAPACITY, FixedPool, PoolStats};
pub use source::{BufferSource, SystemSource};
