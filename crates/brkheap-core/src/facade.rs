//! Public allocator facades.
//!
//! Two variants over the same engine, selected at construction time and
//! never mixed against one arena:
//!
//! - [`LockedHeap`]: thread-safe. A single allocation lock covers the full
//!   allocate/release critical section (fit search, split, header install,
//!   list mutation, coalesce); a dedicated growth lock additionally
//!   serializes break movement, nested inside the allocation lock (lock
//!   order: allocation, then growth, never reversed).
//! - [`UnlockedHeap`]: single-threaded. Allocation always grows the
//!   segment fresh and release flips block state in place, skipping list
//!   reclamation and coalescing. Built on `RefCell`, so it is `!Sync` and
//!   cross-thread misuse fails to compile instead of corrupting the heap.

use std::cell::RefCell;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::arena::{Arena, ReleaseOutcome};
use crate::config::HeapConfig;
use crate::log::HeapLogRecord;

/// Capability surface shared by both variants.
pub trait HeapFacade {
    /// Allocates `size` bytes, returning the user-region offset.
    ///
    /// `None` is the only failure signal: zero-size requests and segment
    /// exhaustion both produce it.
    fn allocate(&self, size: usize) -> Option<usize>;

    /// Returns a previously allocated offset to the allocator.
    ///
    /// Offsets that do not resolve to a live block are silently ignored.
    fn release(&self, user_base: usize);

    /// Total bytes from the heap start to the current break.
    fn segment_size(&self) -> usize;

    /// Free bytes (including headers) reachable through the free list.
    fn free_space(&self) -> usize;
}

// ---------------------------------------------------------------------------
// Locking variant
// ---------------------------------------------------------------------------

/// Thread-safe facade: free-list reuse under a global allocation lock.
#[derive(Debug, Default)]
pub struct LockedHeap {
    arena: Mutex<Arena>,
    growth_lock: Mutex<()>,
}

impl LockedHeap {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            arena: Mutex::new(Arena::new(config)),
            growth_lock: Mutex::new(()),
        }
    }

    /// Number of blocks currently in the free list.
    #[must_use]
    pub fn free_block_count(&self) -> usize {
        self.arena.lock().free_block_count()
    }

    /// Takes and clears the arena's lifecycle records.
    pub fn drain_lifecycle_logs(&self) -> Vec<HeapLogRecord> {
        self.arena.lock().drain_lifecycle_logs()
    }
}

impl HeapFacade for LockedHeap {
    fn allocate(&self, size: usize) -> Option<usize> {
        let mut arena = self.arena.lock();
        if size == 0 {
            arena.record_invalid_request("allocate_locked");
            return None;
        }
        if let Some(user_base) = arena.reuse(size) {
            return Some(user_base);
        }
        // Break movement touches state global to the segment; it gets its
        // own lock, nested inside the allocation lock.
        let _growth = self.growth_lock.lock();
        arena.grow_fresh(size)
    }

    fn release(&self, user_base: usize) {
        match self.arena.lock().release(user_base) {
            ReleaseOutcome::Released => {}
            ReleaseOutcome::OutOfBounds | ReleaseOutcome::DoubleRelease => {
                // Fail-safe policy: the arena recorded the event; the
                // caller gets no signal.
            }
        }
    }

    fn segment_size(&self) -> usize {
        self.arena.lock().segment_size()
    }

    fn free_space(&self) -> usize {
        self.arena.lock().free_space()
    }
}

// ---------------------------------------------------------------------------
// Non-locking variant
// ---------------------------------------------------------------------------

/// Single-threaded facade: no lock, no free-list reclamation.
///
/// Every allocation grows the segment and releases only flip block state,
/// so the memory footprint is larger and `free_space` stays 0. `!Sync` by
/// construction.
#[derive(Debug, Default)]
pub struct UnlockedHeap {
    arena: RefCell<Arena>,
}

impl UnlockedHeap {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HeapConfig::default())
    }

    #[must_use]
    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            arena: RefCell::new(Arena::new(config)),
        }
    }

    /// Takes and clears the arena's lifecycle records.
    pub fn drain_lifecycle_logs(&self) -> Vec<HeapLogRecord> {
        self.arena.borrow_mut().drain_lifecycle_logs()
    }
}

impl HeapFacade for UnlockedHeap {
    fn allocate(&self, size: usize) -> Option<usize> {
        self.arena.borrow_mut().allocate_fresh(size)
    }

    fn release(&self, user_base: usize) {
        let _ = self.arena.borrow_mut().release_in_place(user_base);
    }

    fn segment_size(&self) -> usize {
        self.arena.borrow().segment_size()
    }

    fn free_space(&self) -> usize {
        self.arena.borrow().free_space()
    }
}

// ---------------------------------------------------------------------------
// Process-wide surface
// ---------------------------------------------------------------------------

/// Process-global locked heap, configured from the environment on first
/// use.
fn global_heap() -> &'static LockedHeap {
    static HEAP: OnceLock<LockedHeap> = OnceLock::new();
    HEAP.get_or_init(|| LockedHeap::with_config(HeapConfig::from_env()))
}

/// Allocates from the process-global locked heap.
pub fn allocate_locked(size: usize) -> Option<usize> {
    global_heap().allocate(size)
}

/// Releases into the process-global locked heap.
pub fn release_locked(user_base: usize) {
    global_heap().release(user_base);
}

/// Segment size of the process-global locked heap.
#[must_use]
pub fn segment_size() -> usize {
    global_heap().segment_size()
}

/// Free space of the process-global locked heap.
#[must_use]
pub fn free_space() -> usize {
    global_heap().free_space()
}
