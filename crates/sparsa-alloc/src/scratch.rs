//! Reusable scratch buffers with high-water-mark growth.
//!
//! A [`ScratchBuffer`] keeps its storage across operations so repeated
//! requests of similar size cost nothing after the first. A request for at
//! least `n` bytes reuses the current storage when `capacity >= n`;
//! otherwise the buffer is regrown through the allocation primitive and the
//! old block released. Buffers never shrink on their own; only
//! [`release`](ScratchBuffer::release) (called on session reset) gives the
//! storage back.
//!
//! Storage always goes back to the allocator that produced it. Once a
//! buffer owns storage, calls supplying any other allocator are rejected
//! and leave the buffer untouched.

use std::mem::MaybeUninit;

use crate::allocator::{Allocator, AllocatorId};
use crate::block::Block;
use crate::error::AllocatorMismatch;
use crate::raw::RawAllocator;

/// How a buffer's contents are treated across regrowth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScratchKind {
    /// The prefix up to the high-water mark is carried into regrown
    /// storage; bytes beyond it are uninitialized.
    Tracked,
    /// Contents are never preserved; every request sees uninitialized
    /// memory.
    Uninitialized,
}

/// A single session-owned scratch buffer.
///
/// `capacity` is the size of the owned storage in bytes and is
/// monotonically non-decreasing until the buffer is released.
/// `high_water` is the largest request served since the last release.
#[derive(Debug)]
pub struct ScratchBuffer {
    kind: ScratchKind,
    storage: Option<Block>,
    capacity: usize,
    high_water: usize,
}

impl ScratchBuffer {
    /// An empty buffer with no storage.
    pub const fn new(kind: ScratchKind) -> Self {
        Self {
            kind,
            storage: None,
            capacity: 0,
            high_water: 0,
        }
    }

    /// Make at least `bytes` bytes available and return exactly that many.
    ///
    /// Returns `None` if regrowth fails or `alloc` does not own the
    /// current storage; the existing storage, capacity and contents are
    /// left intact in that case.
    pub fn ensure<A: RawAllocator>(
        &mut self,
        alloc: &mut Allocator<A>,
        bytes: usize,
    ) -> Option<&mut [MaybeUninit<u8>]> {
        if let Err(e) = self.check_owner(alloc) {
            tracing::warn!(target: "sparsa.alloc", error = %e, "scratch request rejected");
            return None;
        }
        if bytes > self.capacity {
            self.grow(alloc, bytes)?;
        }
        self.high_water = self.high_water.max(bytes);
        match self.storage.as_mut() {
            Some(block) => Some(&mut block.as_uninit_mut()[..bytes]),
            None => Some(&mut []),
        }
    }

    fn grow<A: RawAllocator>(&mut self, alloc: &mut Allocator<A>, bytes: usize) -> Option<()> {
        let mut fresh = alloc.allocate(bytes, 1)?;
        if let (ScratchKind::Tracked, Some(old)) = (self.kind, self.storage.as_ref()) {
            let keep = self.high_water.min(old.len());
            fresh.as_uninit_mut()[..keep].copy_from_slice(&old.as_uninit()[..keep]);
        }
        tracing::debug!(
            target: "sparsa.alloc",
            kind = ?self.kind,
            from = self.capacity,
            to = bytes,
            "scratch regrow"
        );
        if let Some(old) = self.storage.replace(fresh) {
            let released = alloc.release(old);
            debug_assert!(released.is_ok(), "owner checked in ensure");
        }
        self.capacity = bytes;
        Some(())
    }

    /// Return the storage to `alloc` and reset to zero size.
    ///
    /// Fails without changing anything if `alloc` did not produce the
    /// storage.
    pub fn release<A: RawAllocator>(
        &mut self,
        alloc: &mut Allocator<A>,
    ) -> Result<(), AllocatorMismatch> {
        self.check_owner(alloc)?;
        if let Some(block) = self.storage.take() {
            let released = alloc.release(block);
            debug_assert!(released.is_ok(), "owner checked above");
        }
        self.capacity = 0;
        self.high_water = 0;
        Ok(())
    }

    /// Allocator that produced the current storage, if any.
    pub fn owner(&self) -> Option<AllocatorId> {
        self.storage.as_ref().map(Block::origin)
    }

    pub(crate) fn check_owner<A: RawAllocator>(
        &self,
        alloc: &Allocator<A>,
    ) -> Result<(), AllocatorMismatch> {
        match self.owner() {
            Some(owner) if owner != alloc.id() => Err(AllocatorMismatch {
                owner,
                found: alloc.id(),
            }),
            _ => Ok(()),
        }
    }

    /// The tracked prefix (`..high_water`) of the storage.
    pub fn tracked(&self) -> &[MaybeUninit<u8>] {
        match self.storage.as_ref() {
            Some(block) => &block.as_uninit()[..self.high_water],
            None => &[],
        }
    }

    /// Overwrite the tracked prefix with zeroes.
    pub fn clear_tracked(&mut self) {
        let hw = self.high_water;
        if let Some(block) = self.storage.as_mut() {
            for b in &mut block.as_uninit_mut()[..hw] {
                b.write(0);
            }
        }
    }

    /// How contents are treated across regrowth.
    pub fn kind(&self) -> ScratchKind {
        self.kind
    }

    /// Bytes of owned storage.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest request served since the last release.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Whether the buffer currently owns storage.
    pub fn is_allocated(&self) -> bool {
        self.storage.is_some()
    }
}
