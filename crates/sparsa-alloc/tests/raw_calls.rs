//! Integration test: which requests reach the raw allocator.
//!
//! Overflow, bound, and injected failures must be decided before the raw
//! allocator is called; only real allocation attempts may reach it.

use sparsa_alloc::{AllocConfig, Allocator, FaultInjector, ScratchBuffer, ScratchKind};
use sparsa_test_utils::{CountingAllocator, ExhaustedAllocator};

#[test]
fn rejected_requests_never_reach_raw() {
    let mut alloc =
        Allocator::with_config(CountingAllocator::new(), AllocConfig::with_index_max(1 << 20));

    assert!(alloc.allocate(usize::MAX, 2).is_none());
    assert!(alloc.allocate(1, (1 << 20) + 1).is_none());
    alloc.set_fault(FaultInjector::after(0));
    assert!(alloc.allocate(8, 8).is_none());

    assert_eq!(alloc.raw().alloc_calls(), 0);
    assert_eq!(alloc.stats().overflow_rejections, 1);
    assert_eq!(alloc.stats().bound_rejections, 1);
    assert_eq!(alloc.stats().injected_failures, 1);
    assert_eq!(alloc.stats().failures(), 3);
}

#[test]
#[cfg(target_pointer_width = "64")]
fn overflow_within_bound_never_reaches_raw() {
    // Both inputs are below INDEX_MAX but their product is 2^70.
    let mut alloc = Allocator::new(CountingAllocator::new());
    assert!(alloc.allocate(1 << 30, 1 << 40).is_none());
    assert_eq!(alloc.stats().overflow_rejections, 1);
    assert_eq!(alloc.raw().alloc_calls(), 0);
    assert_eq!(alloc.live_allocations(), 0);
}

#[test]
fn each_success_is_one_raw_call() {
    let mut alloc = Allocator::new(CountingAllocator::new());
    let blocks: Vec<_> = (0..5).map(|i| alloc.allocate(i, 3).unwrap()).collect();
    assert_eq!(alloc.raw().alloc_calls(), 5);
    assert_eq!(alloc.raw().live_sizes(), vec![3, 3, 6, 9, 12]);
    assert_eq!(alloc.live_allocations(), 5);

    for b in blocks {
        alloc.release(b).unwrap();
    }
    assert_eq!(alloc.raw().dealloc_calls(), 5);
    assert_eq!(alloc.raw().live_blocks(), 0);
    assert_eq!(alloc.live_allocations(), 0);
}

#[test]
fn zeroed_request_uses_zeroed_path() {
    let mut alloc = Allocator::new(CountingAllocator::new());
    let block = alloc.allocate_zeroed(4, 4).unwrap();
    assert!(block.is_initialized());
    assert_eq!(block.as_bytes().unwrap(), &[0u8; 16][..]);
    alloc.release(block).unwrap();
}

#[test]
fn out_of_memory_is_single_attempt() {
    let mut alloc = Allocator::new(ExhaustedAllocator::new());
    alloc.set_fault(FaultInjector::after(2));

    assert!(alloc.allocate(64, 64).is_none());
    assert_eq!(alloc.raw().attempts(), 1);
    assert_eq!(alloc.live_allocations(), 0);
    assert_eq!(alloc.fault().countdown(), 2);
    assert_eq!(alloc.stats().out_of_memory, 1);
}

#[test]
fn scratch_reuse_skips_raw() {
    let mut alloc = Allocator::new(CountingAllocator::new());
    let mut buf = ScratchBuffer::new(ScratchKind::Tracked);
    for n in [16, 8, 16, 4, 16] {
        buf.ensure(&mut alloc, n).unwrap();
    }
    assert_eq!(alloc.raw().alloc_calls(), 1);

    buf.ensure(&mut alloc, 17).unwrap();
    assert_eq!(alloc.raw().alloc_calls(), 2);
    assert_eq!(alloc.raw().dealloc_calls(), 1);
    assert_eq!(alloc.raw().live_sizes(), vec![17]);

    buf.release(&mut alloc).unwrap();
    assert_eq!(alloc.raw().live_blocks(), 0);
}

#[test]
fn borrowed_raw_allocator() {
    let raw = CountingAllocator::new();
    let mut alloc = Allocator::new(&raw);
    let block = alloc.allocate(2, 2).unwrap();
    assert_eq!(raw.live_blocks(), 1);
    alloc.release(block).unwrap();
    assert_eq!(raw.live_blocks(), 0);
}

#[test]
fn scratch_rejects_foreign_allocator() {
    let mut owner = Allocator::new(CountingAllocator::new());
    let mut other = Allocator::new(CountingAllocator::new());
    let mut buf = ScratchBuffer::new(ScratchKind::Uninitialized);
    buf.ensure(&mut owner, 64).unwrap();

    assert!(buf.ensure(&mut other, 128).is_none());
    assert!(buf.release(&mut other).is_err());
    assert_eq!(other.raw().alloc_calls(), 0);
    assert_eq!(other.raw().dealloc_calls(), 0);
    assert_eq!(owner.live_allocations(), 1);

    buf.release(&mut owner).unwrap();
    assert_eq!(owner.live_allocations(), 0);
    assert_eq!(owner.raw().live_blocks(), 0);
}

#[test]
fn stale_block_storage_still_returned() {
    let mut alloc = Allocator::new(CountingAllocator::new());
    let old = alloc.allocate(8, 1).unwrap();
    alloc.reset_counters();
    let fresh = alloc.allocate(8, 1).unwrap();

    alloc.release(old).unwrap();
    assert_eq!(alloc.raw().live_blocks(), 1);
    assert_eq!(alloc.live_allocations(), 1);

    alloc.release(fresh).unwrap();
    assert_eq!(alloc.raw().live_blocks(), 0);
    assert_eq!(alloc.live_allocations(), 0);
}
