//! Workload tooling for brkheap.
//!
//! This crate provides:
//! - Storm generation: deterministic allocation workloads with distinct
//!   shapes (sawtooth, random churn, policy thrash)
//! - Policy comparison: the same storm replayed under each fit policy
//! - Report emission: JSONL records with a SHA-256 artifact digest

#![forbid(unsafe_code)]

pub mod report;
pub mod storm;

pub use report::{ArtifactDigest, HarnessError, StormRecord};
pub use storm::{StormMetrics, StormShape, StormSpec, run_storm};
