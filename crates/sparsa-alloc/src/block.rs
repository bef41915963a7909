//! Owned blocks of raw storage returned by the allocation primitive.
//!
//! A [`Block`] is the caller's exclusive handle to one successful
//! allocation. It is move-only: the only way to return it is
//! [`Allocator::release`](crate::Allocator::release), which consumes it, so
//! a block cannot be released twice.

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;

use crate::allocator::AllocatorId;

/// Exclusive ownership of one allocation.
///
/// The storage is uninitialized unless the block came from
/// `allocate_zeroed` or has been [`fill`](Block::fill)ed. Dropping a block
/// without releasing it leaks the storage, and the allocation stays counted
/// in the allocator's live count, which is what leak checks look at.
#[must_use = "a Block leaks unless passed back to Allocator::release"]
pub struct Block {
    pub(crate) ptr: NonNull<u8>,
    pub(crate) layout: Layout,
    /// Allocator that produced this block.
    pub(crate) origin: AllocatorId,
    /// Allocator epoch at the time of allocation.
    pub(crate) epoch: u64,
    /// Whether every byte has been written.
    pub(crate) initialized: bool,
}

impl Block {
    pub(crate) fn new(
        ptr: NonNull<u8>,
        layout: Layout,
        origin: AllocatorId,
        epoch: u64,
        initialized: bool,
    ) -> Self {
        Self {
            ptr,
            layout,
            origin,
            epoch,
            initialized,
        }
    }

    /// Size of the block in bytes. Never zero.
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always `false`: zero-sized requests are normalized to one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Raw pointer to the first byte.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The allocator this block must be released to.
    pub fn origin(&self) -> AllocatorId {
        self.origin
    }

    /// Reset epoch of the origin allocator when this block was handed out.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether every byte is known to be initialized.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Overwrite every byte with `byte`, marking the block initialized.
    pub fn fill(&mut self, byte: u8) {
        for b in self.as_uninit_mut() {
            b.write(byte);
        }
        self.initialized = true;
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("ptr", &self.ptr)
            .field("len", &self.len())
            .field("origin", &self.origin)
            .field("epoch", &self.epoch)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(ptr={:p}, len={}, origin={})",
            self.ptr, self.len(), self.origin
        )
    }
}
