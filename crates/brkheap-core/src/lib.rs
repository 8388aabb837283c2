//! # brkheap-core
//!
//! A user-space heap allocator over a break-grown segment.
//!
//! The engine manages a contiguous byte segment extended on demand through
//! a break-adjustment service, carving it into header-prefixed blocks that
//! are handed out and reclaimed through a doubly linked free list. Fit
//! selection is configurable (first-fit, best-fit, or a size-threshold
//! hybrid), oversized blocks are split, and adjacent free blocks are
//! coalesced eagerly on release.
//!
//! Blocks are addressed by segment offset rather than raw pointer, so the
//! whole engine is safe Rust. Two facades wrap the engine: [`LockedHeap`]
//! (thread-safe, free-list reuse) and [`UnlockedHeap`] (single-threaded,
//! grow-only, lower overhead).

pub mod arena;
pub mod block;
pub mod config;
pub mod facade;
pub mod fit;
pub mod free_list;
pub mod log;
pub mod segment;

pub use arena::{Arena, ReleaseOutcome};
pub use block::HEADER_SIZE;
pub use config::HeapConfig;
pub use facade::{
    HeapFacade, LockedHeap, UnlockedHeap, allocate_locked, free_space, release_locked,
    segment_size,
};
pub use fit::{FitPolicy, HYBRID_THRESHOLD};
pub use log::{HeapLogLevel, HeapLogRecord};
pub use segment::{Segment, SegmentError};
