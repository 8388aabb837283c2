//! Structured allocator lifecycle records.
//!
//! The arena appends one record per decision it makes (allocation path
//! taken, growth, coalesce, ignored release, ...) to an in-memory buffer
//! that callers can inspect or drain. Records serialize to JSON so tooling
//! can emit them as JSONL streams.

use serde::Serialize;

/// Severity of a lifecycle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeapLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// One allocator lifecycle record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeapLogRecord {
    /// Monotonic decision/event id.
    pub decision_id: u64,
    /// Correlation id for this record.
    pub trace_id: String,
    pub level: HeapLogLevel,
    /// API symbol (`allocate`, `release`, ...).
    pub symbol: &'static str,
    /// Event kind (`alloc`, `oom`, `release`, `coalesce`, ...).
    pub event: &'static str,
    /// User-region offset involved in the event.
    pub offset: Option<usize>,
    /// Size value involved in the event.
    pub size: Option<usize>,
    /// Machine-readable outcome label.
    pub outcome: &'static str,
    /// Free-form details for debugging.
    pub details: String,
    /// Snapshot: bytes from heap start to the current break.
    pub segment_size: usize,
    /// Snapshot: free bytes reachable through the free list.
    pub free_bytes: usize,
    /// Snapshot: number of blocks in the free list.
    pub free_blocks: usize,
    /// Snapshot: segment growth counter.
    pub grow_count: u64,
}
