//! The allocation primitive.
//!
//! [`Allocator::allocate`] is the single entry point for every dynamically
//! sized allocation in the engine. The order of checks is fixed:
//!
//! 1. Normalize: a zero count or zero item size is treated as one.
//! 2. Overflow: reject when `count * size` overflows `usize`.
//! 3. Bound: reject counts or sizes above `AllocConfig::index_max`.
//! 4. Layout: reject a byte size that cannot form a valid layout (counted
//!    as overflow).
//! 5. Fault injection: reject when the injector's countdown is exhausted.
//! 6. Raw allocation: one attempt, no retry.
//!
//! Steps 1-5 never call the raw allocator. Only step 6 succeeding changes
//! the live count and the fault countdown.
//!
//! # Reset epochs
//!
//! [`reset_counters`](Allocator::reset_counters) starts a new epoch. Every
//! block is stamped with the epoch it was allocated in, and releasing a
//! block from an earlier epoch returns its storage without touching the
//! current live count.

use std::alloc::Layout;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use sparsa_core::index::{at_least_one, checked_mul, within_bound};

use crate::block::Block;
use crate::config::AllocConfig;
use crate::error::{AllocFailure, ForeignBlock};
use crate::fault::FaultInjector;
use crate::raw::{self, RawAllocator, SystemAllocator, BLOCK_ALIGN};

/// Counter for unique [`AllocatorId`] assignment.
static ALLOCATOR_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an [`Allocator`].
///
/// Every [`Block`] records the id of the allocator that produced it, so a
/// block can only be released back to its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocatorId(u64);

impl AllocatorId {
    fn next() -> Self {
        Self(ALLOCATOR_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AllocatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocation accounting.
///
/// `live` is the count of blocks handed out and not yet released. The
/// remaining fields are cumulative since the last reset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Blocks allocated and not yet released.
    pub live: u64,
    /// Successful allocations.
    pub allocations: u64,
    /// Successful releases.
    pub releases: u64,
    /// Requests rejected because `count * size` overflowed.
    pub overflow_rejections: u64,
    /// Requests rejected by the index bound.
    pub bound_rejections: u64,
    /// Requests the raw allocator could not satisfy.
    pub out_of_memory: u64,
    /// Requests failed by the fault injector.
    pub injected_failures: u64,
    /// Blocks from before the last reset returned since that reset.
    pub stale_releases: u64,
}

impl AllocStats {
    /// Total failed requests, for any reason.
    pub fn failures(&self) -> u64 {
        self.overflow_rejections + self.bound_rejections + self.out_of_memory + self.injected_failures
    }
}

/// Overflow-checked, fault-injectable allocator.
///
/// Owns the raw allocator, the index bound, the fault injector, and the
/// allocation counters for one session. All mutation goes through
/// `&mut self`, so concurrent use requires external synchronization.
pub struct Allocator<A: RawAllocator = SystemAllocator> {
    raw: A,
    id: AllocatorId,
    epoch: u64,
    config: AllocConfig,
    fault: FaultInjector,
    stats: AllocStats,
}

impl Allocator<SystemAllocator> {
    /// An allocator over the global heap with default configuration.
    pub fn system() -> Self {
        Self::new(SystemAllocator)
    }
}

impl Default for Allocator<SystemAllocator> {
    fn default() -> Self {
        Self::system()
    }
}

impl<A: RawAllocator> Allocator<A> {
    /// Wrap `raw` with the default configuration.
    pub fn new(raw: A) -> Self {
        Self::with_config(raw, AllocConfig::default())
    }

    /// Wrap `raw` with an explicit configuration.
    pub fn with_config(raw: A, config: AllocConfig) -> Self {
        Self {
            raw,
            id: AllocatorId::next(),
            epoch: 0,
            config,
            fault: FaultInjector::disabled(),
            stats: AllocStats::default(),
        }
    }

    /// Allocate uninitialized storage for `count` items of `size` bytes.
    ///
    /// A zero `count` or `size` is treated as one, so success always yields
    /// a real block of at least one byte. Returns `None` on size overflow,
    /// index-bound violation, real out-of-memory, or injected failure; the
    /// cause is not distinguished.
    pub fn allocate(&mut self, count: usize, size: usize) -> Option<Block> {
        self.try_allocate(count, size, false)
    }

    /// Like [`allocate`](Self::allocate), with the storage zero-filled.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Block> {
        self.try_allocate(count, size, true)
    }

    fn try_allocate(&mut self, count: usize, size: usize, zeroed: bool) -> Option<Block> {
        match self.checked_layout(count, size) {
            Ok(layout) => self.obtain(layout, zeroed),
            Err(failure) => {
                self.record_failure(failure);
                None
            }
        }
    }

    /// Steps 1-5: normalization, overflow, bound, layout, fault injection.
    fn checked_layout(&self, count: usize, size: usize) -> Result<Layout, AllocFailure> {
        let count = at_least_one(count);
        let size = at_least_one(size);

        let bytes = checked_mul(count, size).ok_or(AllocFailure::Overflow { count, size })?;

        let bound = self.config.index_max;
        if !within_bound(count, bound) || !within_bound(size, bound) {
            return Err(AllocFailure::IndexBound { count, size, bound });
        }

        let layout = Layout::from_size_align(bytes, BLOCK_ALIGN)
            .map_err(|_| AllocFailure::Overflow { count, size })?;

        if self.fault.should_fail() {
            return Err(AllocFailure::Injected);
        }
        Ok(layout)
    }

    /// Step 6: the single raw allocation attempt.
    fn obtain(&mut self, layout: Layout, zeroed: bool) -> Option<Block> {
        let Some(ptr) = raw::obtain(&self.raw, layout, zeroed) else {
            self.record_failure(AllocFailure::OutOfMemory {
                bytes: layout.size(),
            });
            return None;
        };
        self.stats.live += 1;
        self.stats.allocations += 1;
        self.fault.record_success();
        tracing::trace!(
            target: "sparsa.alloc",
            allocator = %self.id,
            bytes = layout.size(),
            live = self.stats.live,
            "allocate"
        );
        Some(Block::new(ptr, layout, self.id, self.epoch, zeroed))
    }

    fn record_failure(&mut self, failure: AllocFailure) {
        match failure {
            AllocFailure::Overflow { .. } => self.stats.overflow_rejections += 1,
            AllocFailure::IndexBound { .. } => self.stats.bound_rejections += 1,
            AllocFailure::Injected => self.stats.injected_failures += 1,
            AllocFailure::OutOfMemory { .. } => self.stats.out_of_memory += 1,
        }
        tracing::debug!(
            target: "sparsa.alloc",
            allocator = %self.id,
            reason = %failure,
            "allocation failed"
        );
    }

    /// Return a block to the raw allocator and decrement the live count.
    ///
    /// A block allocated before the last
    /// [`reset_counters`](Self::reset_counters) is freed but counted under
    /// `stale_releases` instead, since the live count no longer includes it.
    /// Fails, returning the block untouched, if it was produced by a
    /// different allocator.
    pub fn release(&mut self, block: Block) -> Result<(), ForeignBlock> {
        if block.origin() != self.id {
            tracing::warn!(
                target: "sparsa.alloc",
                allocator = %self.id,
                origin = %block.origin(),
                "rejected release of foreign block"
            );
            return Err(ForeignBlock(block));
        }
        let bytes = block.len();
        let epoch = block.epoch();
        raw::return_storage(&self.raw, block);
        if epoch == self.epoch {
            self.stats.live -= 1;
            self.stats.releases += 1;
        } else {
            self.stats.stale_releases += 1;
        }
        tracing::trace!(
            target: "sparsa.alloc",
            allocator = %self.id,
            bytes,
            epoch,
            live = self.stats.live,
            "release"
        );
        Ok(())
    }

    /// Blocks allocated and not yet released.
    pub fn live_allocations(&self) -> u64 {
        self.stats.live
    }

    /// Allocation accounting.
    pub fn stats(&self) -> &AllocStats {
        &self.stats
    }

    /// The fault injection policy.
    pub fn fault(&self) -> FaultInjector {
        self.fault
    }

    /// Replace the fault injection policy.
    pub fn set_fault(&mut self, fault: FaultInjector) {
        self.fault = fault;
    }

    /// Zero all counters, disable fault injection, and start a new epoch.
    ///
    /// Outstanding blocks remain valid and may still be released; they no
    /// longer count towards `live`.
    pub fn reset_counters(&mut self) {
        self.stats = AllocStats::default();
        self.fault = FaultInjector::disabled();
        self.epoch += 1;
    }

    /// Number of resets so far. Blocks record the epoch they came from.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// This allocator's unique id.
    pub fn id(&self) -> AllocatorId {
        self.id
    }

    /// Active configuration.
    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    /// The underlying raw allocator.
    pub fn raw(&self) -> &A {
        &self.raw
    }
}

impl<A: RawAllocator> fmt::Debug for Allocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("id", &self.id)
            .field("epoch", &self.epoch)
            .field("config", &self.config)
            .field("fault", &self.fault)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
