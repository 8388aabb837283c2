//! Contract of the public facades: null-only failure signaling, fail-safe
//! release, reuse accounting, and the documented asymmetry between the
//! locking and non-locking variants.

use brkheap_core::{HEADER_SIZE, HeapFacade, LockedHeap, UnlockedHeap};

#[test]
fn release_grows_free_space_by_at_least_block_footprint() {
    let heap = LockedHeap::new();
    let n = 300;
    let user = heap.allocate(n).unwrap();
    let _guard = heap.allocate(8).unwrap();

    let before = heap.free_space();
    heap.release(user);
    assert!(
        heap.free_space() >= before + n + HEADER_SIZE,
        "free space must grow by the released block plus its header"
    );

    // A smaller follow-up request may land on the same block.
    let again = heap.allocate(n / 2).unwrap();
    assert_eq!(again, user);
}

#[test]
fn zero_size_returns_none_with_no_observable_change() {
    for heap in [
        Box::new(LockedHeap::new()) as Box<dyn HeapFacade>,
        Box::new(UnlockedHeap::new()) as Box<dyn HeapFacade>,
    ] {
        assert_eq!(heap.allocate(0), None);
        assert_eq!(heap.segment_size(), 0);
        assert_eq!(heap.free_space(), 0);

        // Also after the heap has grown.
        let user = heap.allocate(64).unwrap();
        let segment = heap.segment_size();
        let free = heap.free_space();
        assert_eq!(heap.allocate(0), None);
        assert_eq!(heap.segment_size(), segment);
        assert_eq!(heap.free_space(), free);
        heap.release(user);
    }
}

#[test]
fn invalid_release_is_silently_ignored() {
    let heap = LockedHeap::new();
    let user = heap.allocate(128).unwrap();
    heap.release(user);
    let free = heap.free_space();
    let count = heap.free_block_count();

    // Below any possible header, past the break, and far past the break.
    for bogus in [0, 1, heap.segment_size() + HEADER_SIZE, usize::MAX] {
        heap.release(bogus);
    }
    assert_eq!(heap.free_space(), free);
    assert_eq!(heap.free_block_count(), count);

    // The list still serves allocations.
    assert!(heap.allocate(64).is_some());
}

#[test]
fn release_before_any_allocation_is_ignored() {
    let heap = LockedHeap::new();
    heap.release(HEADER_SIZE);
    assert_eq!(heap.segment_size(), 0);
    assert_eq!(heap.free_space(), 0);
}

#[test]
fn double_release_does_not_duplicate_the_block() {
    let heap = LockedHeap::new();
    let user = heap.allocate(96).unwrap();
    let _guard = heap.allocate(8).unwrap();

    heap.release(user);
    let free = heap.free_space();
    heap.release(user);
    heap.release(user);
    assert_eq!(heap.free_space(), free);
    assert_eq!(heap.free_block_count(), 1);
}

#[test]
fn unlocked_variant_grows_fresh_and_hides_releases() {
    let heap = UnlockedHeap::new();
    let first = heap.allocate(64).unwrap();
    heap.release(first);

    // Never reuses, so the segment keeps growing...
    let second = heap.allocate(64).unwrap();
    assert_ne!(second, first);
    assert_eq!(heap.segment_size(), 2 * (64 + HEADER_SIZE));

    // ...and in-place releases never reach the free list.
    assert_eq!(heap.free_space(), 0);
}

#[test]
fn locked_variant_reuses_where_unlocked_does_not() {
    let locked = LockedHeap::new();
    let unlocked = UnlockedHeap::new();

    for heap in [&locked as &dyn HeapFacade, &unlocked as &dyn HeapFacade] {
        for _ in 0..8 {
            let user = heap.allocate(256).unwrap();
            heap.release(user);
        }
    }
    assert_eq!(
        locked.segment_size(),
        256 + HEADER_SIZE,
        "locking variant recycles one block across all cycles"
    );
    assert_eq!(
        unlocked.segment_size(),
        8 * (256 + HEADER_SIZE),
        "non-locking variant pays one growth per cycle"
    );
}

#[test]
fn exhaustion_surfaces_only_as_none() {
    use brkheap_core::HeapConfig;

    let heap = LockedHeap::with_config(HeapConfig::default().with_segment_limit(1024));
    let user = heap.allocate(512).unwrap();
    assert_eq!(heap.allocate(4096), None);

    // No partial growth happened.
    assert_eq!(heap.segment_size(), 512 + HEADER_SIZE);

    // Freed space is usable again even after the denial.
    heap.release(user);
    assert!(heap.allocate(256).is_some());
}
