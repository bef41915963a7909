//! The session's three scratch buffers.
//!
//! [`Workspace`] bundles the buffers every engine operation may borrow:
//!
//! - **mark**: tracked; paired with a `mark_flag` watermark so a caller
//!   can invalidate every mark at once by advancing the flag instead of
//!   clearing the buffer.
//! - **work**: always uninitialized; for throwaway intermediate values.
//! - **flag**: tracked; for per-entry boolean state.

use std::mem::MaybeUninit;

use crate::allocator::Allocator;
use crate::error::AllocatorMismatch;
use crate::raw::RawAllocator;
use crate::scratch::{ScratchBuffer, ScratchKind};

/// Selects one of the workspace buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScratchSlot {
    /// The tracked mark buffer.
    Mark,
    /// The uninitialized work buffer.
    Work,
    /// The tracked flag buffer.
    Flag,
}

impl ScratchSlot {
    /// All slots, in a fixed order.
    pub const ALL: [ScratchSlot; 3] = [ScratchSlot::Mark, ScratchSlot::Work, ScratchSlot::Flag];
}

/// Session-owned scratch memory.
#[derive(Debug)]
pub struct Workspace {
    mark: ScratchBuffer,
    work: ScratchBuffer,
    flag: ScratchBuffer,
    mark_flag: i64,
}

impl Workspace {
    /// Initial value of the mark watermark.
    pub const INITIAL_MARK: i64 = 1;

    /// An empty workspace; no storage is allocated until first use.
    pub const fn new() -> Self {
        Self {
            mark: ScratchBuffer::new(ScratchKind::Tracked),
            work: ScratchBuffer::new(ScratchKind::Uninitialized),
            flag: ScratchBuffer::new(ScratchKind::Tracked),
            mark_flag: Self::INITIAL_MARK,
        }
    }

    /// Read access to one buffer.
    pub fn buffer(&self, slot: ScratchSlot) -> &ScratchBuffer {
        match slot {
            ScratchSlot::Mark => &self.mark,
            ScratchSlot::Work => &self.work,
            ScratchSlot::Flag => &self.flag,
        }
    }

    fn buffer_mut(&mut self, slot: ScratchSlot) -> &mut ScratchBuffer {
        match slot {
            ScratchSlot::Mark => &mut self.mark,
            ScratchSlot::Work => &mut self.work,
            ScratchSlot::Flag => &mut self.flag,
        }
    }

    /// Grow `slot` to at least `bytes` if needed and borrow that many bytes.
    ///
    /// See [`ScratchBuffer::ensure`].
    pub fn ensure<A: RawAllocator>(
        &mut self,
        alloc: &mut Allocator<A>,
        slot: ScratchSlot,
        bytes: usize,
    ) -> Option<&mut [MaybeUninit<u8>]> {
        self.buffer_mut(slot).ensure(alloc, bytes)
    }

    /// Current mark watermark.
    pub fn mark_flag(&self) -> i64 {
        self.mark_flag
    }

    /// Advance the mark watermark and return the new value.
    ///
    /// Entries stamped with an older flag are implicitly unmarked. On
    /// overflow the flag restarts at [`INITIAL_MARK`](Self::INITIAL_MARK)
    /// and the tracked prefix of the mark buffer is zeroed, since stale
    /// stamps could otherwise collide with new ones.
    pub fn advance_mark(&mut self) -> i64 {
        match self.mark_flag.checked_add(1) {
            Some(next) => self.mark_flag = next,
            None => {
                self.mark.clear_tracked();
                self.mark_flag = Self::INITIAL_MARK;
            }
        }
        self.mark_flag
    }

    /// Release every buffer to `alloc`, zero-size them, and reset the mark
    /// watermark.
    ///
    /// If any buffer's storage came from a different allocator, nothing is
    /// released.
    pub fn release_all<A: RawAllocator>(
        &mut self,
        alloc: &mut Allocator<A>,
    ) -> Result<(), AllocatorMismatch> {
        for slot in ScratchSlot::ALL {
            self.buffer(slot).check_owner(alloc)?;
        }
        for slot in ScratchSlot::ALL {
            self.buffer_mut(slot).release(alloc)?;
        }
        self.mark_flag = Self::INITIAL_MARK;
        Ok(())
    }

    /// Total owned storage across all buffers, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.mark.capacity() + self.work.capacity() + self.flag.capacity()
    }

    /// Whether no buffer owns storage.
    pub fn is_empty(&self) -> bool {
        ScratchSlot::ALL
            .iter()
            .all(|&slot| !self.buffer(slot).is_allocated())
    }

    #[cfg(test)]
    pub(crate) fn set_mark_flag(&mut self, flag: i64) {
        self.mark_flag = flag;
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_workspace_is_empty() {
        let ws = Workspace::new();
        assert!(ws.is_empty());
        assert_eq!(ws.memory_bytes(), 0);
        assert_eq!(ws.mark_flag(), Workspace::INITIAL_MARK);
        assert_eq!(ws.buffer(ScratchSlot::Work).kind(), ScratchKind::Uninitialized);
        assert_eq!(ws.buffer(ScratchSlot::Mark).kind(), ScratchKind::Tracked);
        assert_eq!(ws.buffer(ScratchSlot::Flag).kind(), ScratchKind::Tracked);
    }

    #[test]
    fn buffers_grow_independently() {
        let mut alloc = Allocator::system();
        let mut ws = Workspace::new();
        ws.ensure(&mut alloc, ScratchSlot::Mark, 64).unwrap();
        ws.ensure(&mut alloc, ScratchSlot::Flag, 8).unwrap();

        assert_eq!(ws.buffer(ScratchSlot::Mark).capacity(), 64);
        assert_eq!(ws.buffer(ScratchSlot::Work).capacity(), 0);
        assert_eq!(ws.buffer(ScratchSlot::Flag).capacity(), 8);
        assert_eq!(ws.memory_bytes(), 72);
        assert_eq!(alloc.live_allocations(), 2);

        ws.release_all(&mut alloc).unwrap();
        assert!(ws.is_empty());
        assert_eq!(alloc.live_allocations(), 0);
    }

    #[test]
    fn advance_mark_increments() {
        let mut ws = Workspace::new();
        assert_eq!(ws.advance_mark(), 2);
        assert_eq!(ws.advance_mark(), 3);
    }

    #[test]
    #[allow(unsafe_code)]
    fn advance_mark_wraps_and_clears() {
        let mut alloc = Allocator::system();
        let mut ws = Workspace::new();
        for b in ws.ensure(&mut alloc, ScratchSlot::Mark, 16).unwrap() {
            b.write(0xFF);
        }
        ws.set_mark_flag(i64::MAX);

        assert_eq!(ws.advance_mark(), Workspace::INITIAL_MARK);
        let tracked = ws.buffer(ScratchSlot::Mark).tracked();
        // SAFETY: clear_tracked wrote every tracked byte.
        assert!(tracked.iter().all(|b| unsafe { b.assume_init() } == 0));
        ws.release_all(&mut alloc).unwrap();
    }

    #[test]
    fn release_all_resets_mark_flag() {
        let mut alloc = Allocator::system();
        let mut ws = Workspace::new();
        ws.advance_mark();
        ws.release_all(&mut alloc).unwrap();
        assert_eq!(ws.mark_flag(), Workspace::INITIAL_MARK);
    }

    #[test]
    fn release_all_to_wrong_allocator_is_atomic() {
        let mut alloc = Allocator::system();
        let mut other = Allocator::system();
        let mut ws = Workspace::new();
        ws.ensure(&mut alloc, ScratchSlot::Work, 16).unwrap();
        ws.ensure(&mut alloc, ScratchSlot::Flag, 16).unwrap();
        ws.advance_mark();

        assert!(ws.release_all(&mut other).is_err());
        assert_eq!(ws.memory_bytes(), 32);
        assert_eq!(ws.mark_flag(), 2);
        assert_eq!(alloc.live_allocations(), 2);

        ws.release_all(&mut alloc).unwrap();
        assert!(ws.is_empty());
    }
}
