//! Engine configuration.
//!
//! Defaults match the classic tuning: hybrid fit with a 1024-byte
//! threshold and a 32-byte split slack. The policy and threshold can also
//! be taken from the environment:
//! - `BRKHEAP_POLICY`: `first` | `best` | `hybrid` (case-insensitive,
//!   unknown values fall back to `hybrid`).
//! - `BRKHEAP_THRESHOLD`: hybrid switchover size in bytes.

use crate::fit::{FitPolicy, HYBRID_THRESHOLD};
use crate::segment::DEFAULT_SEGMENT_LIMIT;

/// Minimum leftover (beyond a header) worth tracking as a separate free
/// block when splitting.
pub const DEFAULT_SPLIT_SLACK: usize = 32;

/// Tunables of one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
    pub policy: FitPolicy,
    /// Hybrid switchover: requests below use first-fit, at or above use
    /// best-fit.
    pub hybrid_threshold: usize,
    /// A split only happens when the leftover exceeds
    /// `HEADER_SIZE + split_slack`.
    pub split_slack: usize,
    /// Hard cap on segment growth.
    pub segment_limit: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            policy: FitPolicy::Hybrid,
            hybrid_threshold: HYBRID_THRESHOLD,
            split_slack: DEFAULT_SPLIT_SLACK,
            segment_limit: DEFAULT_SEGMENT_LIMIT,
        }
    }
}

impl HeapConfig {
    /// Defaults overridden by `BRKHEAP_POLICY` / `BRKHEAP_THRESHOLD`
    /// where present.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("BRKHEAP_POLICY") {
            config.policy = FitPolicy::from_str_loose(&raw);
        }
        if let Ok(raw) = std::env::var("BRKHEAP_THRESHOLD") {
            if let Ok(threshold) = raw.parse() {
                config.hybrid_threshold = threshold;
            }
        }
        config
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: FitPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_hybrid_threshold(mut self, threshold: usize) -> Self {
        self.hybrid_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_segment_limit(mut self, limit: usize) -> Self {
        self.segment_limit = limit;
        self
    }
}
