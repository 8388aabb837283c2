//! Deterministic allocation storms.
//!
//! A storm drives one [`LockedHeap`] through a seeded workload and reports
//! end-state metrics. The same spec under the same seed always produces
//! the same operation sequence, so two policies can be compared on exactly
//! the same workload.

use serde::Serialize;

use brkheap_core::{FitPolicy, HYBRID_THRESHOLD, HeapConfig, HeapFacade, LockedHeap};

/// Segment cap used by storm heaps; generous relative to any storm here.
const STORM_SEGMENT_LIMIT: usize = 256 * 1024 * 1024;

#[derive(Clone, Copy, Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn gen_range(&mut self, low: usize, high_inclusive: usize) -> usize {
        assert!(low <= high_inclusive);
        let span = high_inclusive - low + 1;
        low + (self.next_u64() as usize % span)
    }
}

/// Workload shape of a storm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StormShape {
    /// Ramp allocations up, then release everything in LIFO order, repeat.
    Sawtooth,
    /// Interleaved random allocations and releases.
    RandomChurn,
    /// Alternate requests just below and above the hybrid threshold.
    PolicyThrash,
}

impl StormShape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sawtooth => "sawtooth",
            Self::RandomChurn => "random_churn",
            Self::PolicyThrash => "policy_thrash",
        }
    }

    /// Parse from string (case-insensitive); `None` for unknown shapes.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sawtooth" => Some(Self::Sawtooth),
            "random-churn" | "random_churn" | "churn" => Some(Self::RandomChurn),
            "policy-thrash" | "policy_thrash" | "thrash" => Some(Self::PolicyThrash),
            _ => None,
        }
    }

    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Sawtooth, Self::RandomChurn, Self::PolicyThrash]
    }
}

/// Parameters of one storm run.
#[derive(Debug, Clone, Copy)]
pub struct StormSpec {
    pub shape: StormShape,
    pub ops: usize,
    pub seed: u64,
    pub min_size: usize,
    pub max_size: usize,
}

impl StormSpec {
    #[must_use]
    pub const fn new(shape: StormShape, ops: usize, seed: u64) -> Self {
        Self {
            shape,
            ops,
            seed,
            min_size: 16,
            max_size: 4096,
        }
    }
}

/// End-state metrics of one storm run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormMetrics {
    pub shape: &'static str,
    pub policy: &'static str,
    pub ops: usize,
    /// Largest sum of live requested bytes seen during the run.
    pub peak_live_bytes: usize,
    /// Segment footprint once the storm settled (all blocks released).
    pub segment_size: usize,
    /// Free bytes reachable through the free list at settle time.
    pub free_bytes: usize,
    /// Free-list entries at settle time; 1 means fully coalesced.
    pub free_blocks: usize,
    /// Free share of the segment at the churn peak, before the final
    /// drain. High values mean the policy left holes it could not serve.
    pub fragmentation_ratio: f64,
}

/// Runs `spec` against a fresh locked heap under `policy`.
#[must_use]
pub fn run_storm(policy: FitPolicy, spec: &StormSpec) -> StormMetrics {
    let heap = LockedHeap::with_config(
        HeapConfig::default()
            .with_policy(policy)
            .with_segment_limit(STORM_SEGMENT_LIMIT),
    );
    let mut rng = XorShift64::new(spec.seed);
    let mut live: Vec<(usize, usize)> = Vec::new();
    let mut live_bytes = 0usize;
    let mut peak_live_bytes = 0usize;

    for op in 0..spec.ops {
        let allocate = match spec.shape {
            StormShape::Sawtooth => (op / 64) % 2 == 0,
            StormShape::RandomChurn => live.is_empty() || rng.next_u64() % 2 == 0,
            StormShape::PolicyThrash => live.len() < 32,
        };

        if allocate {
            let size = match spec.shape {
                StormShape::PolicyThrash => {
                    if op % 2 == 0 {
                        rng.gen_range(spec.min_size, HYBRID_THRESHOLD - 1)
                    } else {
                        rng.gen_range(HYBRID_THRESHOLD, spec.max_size)
                    }
                }
                _ => rng.gen_range(spec.min_size, spec.max_size),
            };
            if let Some(user) = heap.allocate(size) {
                live.push((user, size));
                live_bytes += size;
                peak_live_bytes = peak_live_bytes.max(live_bytes);
            }
        } else if let Some((user, size)) = pick_victim(&mut rng, &mut live, spec.shape) {
            heap.release(user);
            live_bytes -= size;
        }
    }

    let fragmentation_ratio = if heap.segment_size() == 0 {
        0.0
    } else {
        heap.free_space() as f64 / heap.segment_size() as f64
    };

    for (user, _) in live.drain(..) {
        heap.release(user);
    }

    StormMetrics {
        shape: spec.shape.as_str(),
        policy: policy.as_str(),
        ops: spec.ops,
        peak_live_bytes,
        segment_size: heap.segment_size(),
        free_bytes: heap.free_space(),
        free_blocks: heap.free_block_count(),
        fragmentation_ratio,
    }
}

fn pick_victim(
    rng: &mut XorShift64,
    live: &mut Vec<(usize, usize)>,
    shape: StormShape,
) -> Option<(usize, usize)> {
    if live.is_empty() {
        return None;
    }
    match shape {
        StormShape::Sawtooth => live.pop(),
        StormShape::RandomChurn | StormShape::PolicyThrash => {
            let idx = rng.gen_range(0, live.len() - 1);
            Some(live.swap_remove(idx))
        }
    }
}
