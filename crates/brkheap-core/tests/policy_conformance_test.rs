//! Fit-policy conformance: list-order first-fit, minimal-sufficient
//! best-fit, threshold dispatch, and the split slack rule.

use brkheap_core::{Arena, FitPolicy, HEADER_SIZE, HeapConfig};

/// Allocates `sizes` separated by 8-byte guard blocks that stay live, then
/// releases the sized blocks in `release_order` (indices into `sizes`).
/// Returns the user offsets of the sized blocks.
fn carve_free_pattern(arena: &mut Arena, sizes: &[usize], release_order: &[usize]) -> Vec<usize> {
    let users: Vec<usize> = sizes
        .iter()
        .map(|&size| {
            let user = arena.allocate(size).expect("setup allocation");
            arena.allocate(8).expect("guard allocation");
            user
        })
        .collect();
    for &idx in release_order {
        arena.release(users[idx]);
    }
    users
}

#[test]
fn first_fit_returns_first_in_list_order_not_smallest() {
    let mut arena = Arena::new(HeapConfig::default().with_policy(FitPolicy::FirstFit));
    // Release 120 first, 200 last: head-to-tail list order is [200, 50, 120].
    let users = carve_free_pattern(&mut arena, &[200, 50, 120], &[2, 1, 0]);

    let chosen = arena.allocate(50).expect("a candidate exists");
    assert_eq!(
        chosen, users[0],
        "first-fit must take the 200-byte head block, not the tighter 50"
    );
}

#[test]
fn best_fit_returns_minimal_sufficient_block() {
    let mut arena = Arena::new(HeapConfig::default().with_policy(FitPolicy::BestFit));
    let users = carve_free_pattern(&mut arena, &[120, 50, 200], &[0, 1, 2]);

    let chosen = arena.allocate(50).expect("a candidate exists");
    assert_eq!(chosen, users[1], "never 120 or 200 when 50 suffices");
}

#[test]
fn hybrid_dispatches_first_fit_below_and_best_fit_at_threshold() {
    let mut arena = Arena::new(HeapConfig::default());
    // Head-to-tail order [2000, 1500].
    let users = carve_free_pattern(&mut arena, &[2000, 1500], &[1, 0]);

    // 1500 >= threshold: best-fit finds the exact 1500 block behind the head.
    let large = arena.allocate(1500).expect("large candidate exists");
    assert_eq!(large, users[1]);

    // 100 < threshold: first-fit takes the head (2000) even though it is
    // the looser fit.
    let small = arena.allocate(100).expect("small candidate exists");
    assert_eq!(small, users[0]);
}

#[test]
fn leftover_above_slack_is_split_into_a_free_remainder() {
    let mut arena = Arena::new(HeapConfig::default());
    let requested = 96;
    let users = carve_free_pattern(&mut arena, &[requested + HEADER_SIZE + 40], &[0]);

    let reused = arena.allocate(requested).expect("reuse the freed block");
    assert_eq!(reused, users[0]);
    assert_eq!(
        arena.free_space(),
        40 + HEADER_SIZE,
        "remainder of 40 bytes must be tracked as its own free block"
    );
    assert_eq!(arena.free_block_count(), 1);
}

#[test]
fn leftover_below_slack_is_consumed_whole() {
    let mut arena = Arena::new(HeapConfig::default());
    let requested = 96;
    let users = carve_free_pattern(&mut arena, &[requested + HEADER_SIZE + 10], &[0]);

    let reused = arena.allocate(requested).expect("reuse the freed block");
    assert_eq!(reused, users[0]);
    assert_eq!(
        arena.free_space(),
        0,
        "below the slack the whole block is consumed as internal waste"
    );
}

#[test]
fn byte_conservation_across_split() {
    let mut arena = Arena::new(HeapConfig::default());
    let original = 512;
    let users = carve_free_pattern(&mut arena, &[original], &[0]);
    let segment_before = arena.segment_size();

    let requested = 100;
    let reused = arena.allocate(requested).expect("reuse");
    assert_eq!(reused, users[0]);

    // original == carved + header + remainder, and the break did not move.
    let remainder = arena.free_space() - HEADER_SIZE;
    assert_eq!(original, requested + HEADER_SIZE + remainder);
    assert_eq!(arena.segment_size(), segment_before);
}
