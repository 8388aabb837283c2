//! Break-grown segment service.
//!
//! The only component that moves the break. The segment owns a contiguous,
//! zero-filled byte region bounded by a hard limit standing in for OS-level
//! exhaustion; growth either extends the region or fails with no side
//! effects. There is no shrink path: the break only ever moves up.

use thiserror::Error;

/// Default hard limit on segment growth.
pub const DEFAULT_SEGMENT_LIMIT: usize = 64 * 1024 * 1024;

/// Failure signal of the break-adjustment primitive.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("cannot extend segment by {requested} bytes: break at {brk}, limit {limit}")]
    Exhausted {
        requested: usize,
        brk: usize,
        limit: usize,
    },
}

/// The process data segment, addressed by offset from its base.
#[derive(Debug)]
pub struct Segment {
    bytes: Vec<u8>,
    limit: usize,
}

impl Segment {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            limit,
        }
    }

    /// Current break: one past the last owned byte.
    #[must_use]
    pub fn brk(&self) -> usize {
        self.bytes.len()
    }

    /// Extends the segment by `n` bytes and returns the pre-growth break,
    /// which is the base offset of the newly owned span.
    ///
    /// On exhaustion the segment is left untouched.
    pub fn sbrk(&mut self, n: usize) -> Result<usize, SegmentError> {
        let brk = self.bytes.len();
        let new_brk = brk
            .checked_add(n)
            .filter(|&end| end <= self.limit)
            .ok_or(SegmentError::Exhausted {
                requested: n,
                brk,
                limit: self.limit,
            })?;
        self.bytes.resize(new_brk, 0);
        Ok(brk)
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_LIMIT)
    }
}
