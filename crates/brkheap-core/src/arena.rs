//! Arena: engine state and block mutation.
//!
//! One arena owns a segment, the free list threaded through it, the heap
//! start, its configuration, and a buffer of lifecycle records. All engine
//! operations are `&mut self`, so independent arenas can coexist; the
//! facades in [`crate::facade`] decide how an arena is shared.

use crate::block::{self, BlockHeader, BlockState, HEADER_SIZE};
use crate::config::HeapConfig;
use crate::fit;
use crate::free_list::FreeList;
use crate::log::{HeapLogLevel, HeapLogRecord};
use crate::segment::{Segment, SegmentError};

/// What became of a release request.
///
/// The facades surface none of this to callers (release is fire-and-forget
/// per the fail-safe policy); the outcome exists for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Block returned to allocator ownership.
    Released,
    /// Offset does not resolve to a header inside `[heap_start, break)`.
    OutOfBounds,
    /// Block was already free.
    DoubleRelease,
}

/// Allocator engine over one break-grown segment.
#[derive(Debug)]
pub struct Arena {
    segment: Segment,
    free_list: FreeList,
    /// Offset of the first block ever created; set once, never reset.
    heap_start: Option<usize>,
    config: HeapConfig,
    next_decision_id: u64,
    lifecycle_logs: Vec<HeapLogRecord>,
    grow_count: u64,
}

impl Arena {
    #[must_use]
    pub fn new(config: HeapConfig) -> Self {
        Self {
            segment: Segment::new(config.segment_limit),
            free_list: FreeList::new(),
            heap_start: None,
            config,
            next_decision_id: 1,
            lifecycle_logs: Vec::new(),
            grow_count: 0,
        }
    }

    // -----------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------

    /// Full allocation path: free-list reuse first, segment growth on miss.
    ///
    /// Returns the user-region offset, or `None` for a zero-size request
    /// or segment exhaustion.
    pub fn allocate(&mut self, size: usize) -> Option<usize> {
        if size == 0 {
            self.record_invalid_request("allocate");
            return None;
        }
        self.reuse(size).or_else(|| self.grow_fresh(size))
    }

    /// Grow-only path of the non-locking variant: never consults the free
    /// list.
    pub fn allocate_fresh(&mut self, size: usize) -> Option<usize> {
        if size == 0 {
            self.record_invalid_request("allocate_fresh");
            return None;
        }
        self.grow_fresh(size)
    }

    /// Serves `size` from the free list, splitting when worthwhile.
    pub fn reuse(&mut self, size: usize) -> Option<usize> {
        let base = fit::select(
            &self.free_list,
            self.segment.bytes(),
            size,
            self.config.policy,
            self.config.hybrid_threshold,
        )?;

        self.free_list.remove(self.segment.bytes_mut(), base);
        self.split(base, size);

        let mut header = block::read_header(self.segment.bytes(), base);
        header.state = BlockState::Allocated;
        block::write_header(self.segment.bytes_mut(), base, &header);

        self.record_lifecycle(
            HeapLogLevel::Trace,
            "allocate",
            "alloc",
            Some(block::user_base_of(base)),
            Some(size),
            "success",
            format!("path=free_list policy={}", self.config.policy.as_str()),
        );
        Some(block::user_base_of(base))
    }

    /// Installs a new block at the break.
    pub fn grow_fresh(&mut self, size: usize) -> Option<usize> {
        match self.request_space(size) {
            Ok(base) => {
                self.record_lifecycle(
                    HeapLogLevel::Trace,
                    "allocate",
                    "alloc",
                    Some(block::user_base_of(base)),
                    Some(size),
                    "success",
                    "path=segment_grow".to_string(),
                );
                Some(block::user_base_of(base))
            }
            Err(err) => {
                self.record_lifecycle(
                    HeapLogLevel::Warn,
                    "allocate",
                    "oom",
                    None,
                    Some(size),
                    "oom",
                    err.to_string(),
                );
                None
            }
        }
    }

    fn request_space(&mut self, size: usize) -> Result<usize, SegmentError> {
        let total = HEADER_SIZE
            .checked_add(size)
            .ok_or(SegmentError::Exhausted {
                requested: size,
                brk: self.segment.brk(),
                limit: self.segment.limit(),
            })?;
        let base = self.segment.sbrk(total)?;
        block::write_header(self.segment.bytes_mut(), base, &BlockHeader::allocated(size));

        if self.heap_start.is_none() {
            self.heap_start = Some(base);
        }
        self.grow_count += 1;
        self.record_lifecycle(
            HeapLogLevel::Debug,
            "allocate",
            "segment_grow",
            None,
            Some(total),
            "grown",
            format!("brk={}", self.segment.brk()),
        );
        Ok(base)
    }

    // -----------------------------------------------------------------
    // Release
    // -----------------------------------------------------------------

    /// Returns the block at `user_base` to the free list and eagerly
    /// coalesces away any free-free adjacency it created.
    pub fn release(&mut self, user_base: usize) -> ReleaseOutcome {
        let block_base = match self.resolve_live(user_base, "release") {
            Ok(base) => base,
            Err(outcome) => return outcome,
        };

        let header = block::read_header(self.segment.bytes(), block_base);
        if header.is_free() {
            self.record_lifecycle(
                HeapLogLevel::Warn,
                "release",
                "double_release_detected",
                Some(user_base),
                Some(header.size),
                "ignored",
                "block already free".to_string(),
            );
            return ReleaseOutcome::DoubleRelease;
        }

        self.free_list.insert(self.segment.bytes_mut(), block_base);
        self.coalesce(block_base);
        if let Some(pred) = self.free_predecessor_of(block_base) {
            self.coalesce(pred);
        }

        self.record_lifecycle(
            HeapLogLevel::Trace,
            "release",
            "release",
            Some(user_base),
            Some(header.size),
            "success",
            String::new(),
        );
        ReleaseOutcome::Released
    }

    /// In-place release of the non-locking variant: flips the state, never
    /// touches the free list, never coalesces.
    pub fn release_in_place(&mut self, user_base: usize) -> ReleaseOutcome {
        let block_base = match self.resolve_live(user_base, "release_in_place") {
            Ok(base) => base,
            Err(outcome) => return outcome,
        };

        let mut header = block::read_header(self.segment.bytes(), block_base);
        if header.is_free() {
            return ReleaseOutcome::DoubleRelease;
        }
        header.state = BlockState::Free;
        header.next = None;
        header.prev = None;
        block::write_header(self.segment.bytes_mut(), block_base, &header);

        self.record_lifecycle(
            HeapLogLevel::Trace,
            "release_in_place",
            "release",
            Some(user_base),
            Some(header.size),
            "success",
            "state flipped in place".to_string(),
        );
        ReleaseOutcome::Released
    }

    /// Resolves a user offset to a live block base, recording ignored
    /// releases.
    fn resolve_live(
        &mut self,
        user_base: usize,
        symbol: &'static str,
    ) -> Result<usize, ReleaseOutcome> {
        let resolved = block::block_base_of(user_base).filter(|&base| {
            self.heap_start
                .is_some_and(|start| block::is_live(base, start, self.segment.brk()))
        });
        match resolved {
            Some(base) => Ok(base),
            None => {
                self.record_lifecycle(
                    HeapLogLevel::Warn,
                    symbol,
                    "invalid_release_ignored",
                    Some(user_base),
                    None,
                    "ignored",
                    "offset outside live segment".to_string(),
                );
                Err(ReleaseOutcome::OutOfBounds)
            }
        }
    }

    // -----------------------------------------------------------------
    // Block mutation
    // -----------------------------------------------------------------

    /// Carves `requested` bytes out of the free block at `block_base`,
    /// returning the remainder to the free list.
    ///
    /// Splits only when the leftover exceeds a header plus the configured
    /// slack; below that the whole block is consumed and the extra bytes
    /// are internal waste.
    fn split(&mut self, block_base: usize, requested: usize) {
        let header = block::read_header(self.segment.bytes(), block_base);
        if header.size <= requested + HEADER_SIZE + self.config.split_slack {
            return;
        }

        let remainder_base = block_base + HEADER_SIZE + requested;
        let remainder_size = header.size - requested - HEADER_SIZE;
        block::write_header(
            self.segment.bytes_mut(),
            remainder_base,
            &BlockHeader {
                size: remainder_size,
                state: BlockState::Free,
                next: None,
                prev: None,
            },
        );
        self.free_list.insert(self.segment.bytes_mut(), remainder_base);

        let mut carved = header;
        carved.size = requested;
        block::write_header(self.segment.bytes_mut(), block_base, &carved);

        self.record_lifecycle(
            HeapLogLevel::Trace,
            "allocate",
            "split",
            Some(block::user_base_of(remainder_base)),
            Some(remainder_size),
            "remainder_freed",
            format!("carved={requested}"),
        );
    }

    /// Folds the physically-following block into the free block at
    /// `block_base` when that neighbor is itself free.
    ///
    /// Forward-only and single-neighbor per call; `release` invokes it for
    /// the released block and for its free predecessor, which is enough to
    /// keep free-free adjacency from surviving any release.
    fn coalesce(&mut self, block_base: usize) {
        let header = block::read_header(self.segment.bytes(), block_base);
        if !header.is_free() {
            return;
        }
        let Some(next_base) = block::next_physical(block_base, header.size) else {
            return;
        };
        if !block::is_live(next_base, self.heap_start.unwrap_or(0), self.segment.brk()) {
            return;
        }

        let next = block::read_header(self.segment.bytes(), next_base);
        if !next.is_free() {
            return;
        }

        self.free_list.remove(self.segment.bytes_mut(), next_base);
        let mut merged = block::read_header(self.segment.bytes(), block_base);
        merged.size += next.size + HEADER_SIZE;
        block::write_header(self.segment.bytes_mut(), block_base, &merged);

        self.record_lifecycle(
            HeapLogLevel::Trace,
            "release",
            "coalesce",
            Some(block::user_base_of(block_base)),
            Some(merged.size),
            "merged",
            format!("absorbed={next_base}"),
        );
    }

    /// Free block whose user region ends exactly at `block_base`, if any.
    fn free_predecessor_of(&self, block_base: usize) -> Option<usize> {
        self.free_list
            .iter(self.segment.bytes())
            .find(|&(base, ref header)| {
                block::next_physical(base, header.size) == Some(block_base)
            })
            .map(|(base, _)| base)
    }

    // -----------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------

    /// Bytes from the heap start to the current break; 0 before the first
    /// growth.
    #[must_use]
    pub fn segment_size(&self) -> usize {
        match self.heap_start {
            Some(start) => self.segment.brk() - start,
            None => 0,
        }
    }

    /// Sum of `size + HEADER_SIZE` over all blocks in the free list.
    ///
    /// Blocks released in place by the non-locking path never enter the
    /// list and are invisible here.
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.free_list
            .iter(self.segment.bytes())
            .map(|(_, header)| header.size + HEADER_SIZE)
            .sum()
    }

    /// Number of blocks in the free list.
    #[must_use]
    pub fn free_block_count(&self) -> usize {
        self.free_list.len(self.segment.bytes())
    }

    #[must_use]
    pub const fn config(&self) -> &HeapConfig {
        &self.config
    }

    #[must_use]
    pub const fn grow_count(&self) -> u64 {
        self.grow_count
    }

    // -----------------------------------------------------------------
    // Lifecycle records
    // -----------------------------------------------------------------

    /// Records a rejected zero-size request.
    pub fn record_invalid_request(&mut self, symbol: &'static str) {
        self.record_lifecycle(
            HeapLogLevel::Trace,
            symbol,
            "invalid_request",
            None,
            Some(0),
            "denied",
            "zero-size request".to_string(),
        );
    }

    fn record_lifecycle(
        &mut self,
        level: HeapLogLevel,
        symbol: &'static str,
        event: &'static str,
        offset: Option<usize>,
        size: Option<usize>,
        outcome: &'static str,
        details: String,
    ) {
        let decision_id = self.next_decision_id;
        self.next_decision_id = self.next_decision_id.wrapping_add(1);
        let record = HeapLogRecord {
            decision_id,
            trace_id: format!("core::heap::{symbol}::{decision_id:016x}"),
            level,
            symbol,
            event,
            offset,
            size,
            outcome,
            details,
            segment_size: self.segment_size(),
            free_bytes: self.free_space(),
            free_blocks: self.free_block_count(),
            grow_count: self.grow_count,
        };
        self.lifecycle_logs.push(record);
    }

    /// Borrows the lifecycle records accumulated so far.
    #[must_use]
    pub fn lifecycle_logs(&self) -> &[HeapLogRecord] {
        &self.lifecycle_logs
    }

    /// Takes and clears the lifecycle records.
    pub fn drain_lifecycle_logs(&mut self) -> Vec<HeapLogRecord> {
        std::mem::take(&mut self.lifecycle_logs)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(HeapConfig::default())
    }
}
