//! Shared fixtures for the brkheap benchmarks.

use brkheap_core::FitPolicy;

/// Request-size ladder exercised by the cycle benchmarks.
pub const SIZES: &[usize] = &[16, 64, 256, 1024, 4096, 32768];

/// Every fit policy, in reporting order.
#[must_use]
pub const fn policies() -> [FitPolicy; 3] {
    [FitPolicy::FirstFit, FitPolicy::BestFit, FitPolicy::Hybrid]
}
