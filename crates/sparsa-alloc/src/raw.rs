//! Low-level primitives for raw heap memory.
//!
//! This is the only module in the workspace allowed to contain `unsafe`.
//! It holds the [`RawAllocator`] seam (the compile-time substitution point
//! for the underlying allocation call), the default [`SystemAllocator`],
//! and the handful of pointer operations [`Block`] needs. Each `unsafe`
//! block carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem::MaybeUninit;
use std::ptr::NonNull;

use crate::block::Block;

/// Alignment of every block handed out by the allocation primitive.
///
/// Matches the strictest fundamental alignment on mainstream 64-bit
/// targets, so a block can back any primitive numeric array.
pub const BLOCK_ALIGN: usize = 16;

/// The underlying raw allocation call.
///
/// The engine's allocator is generic over this trait; choosing a different
/// implementation is a compile-time decision (`Allocator<MyAlloc>`), not a
/// runtime switch.
///
/// # Safety
///
/// Implementors must return either `None` or a pointer to at least
/// `layout.size()` writable bytes aligned to `layout.align()`, valid until
/// passed back to [`dealloc`](RawAllocator::dealloc) with the same layout.
/// Callers never pass a zero-sized layout.
pub unsafe trait RawAllocator {
    /// Allocate uninitialized storage for `layout`.
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Allocate zero-filled storage for `layout`.
    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.alloc(layout)?;
        // SAFETY: `alloc` returned a pointer to at least `layout.size()`
        // writable bytes per the trait contract.
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Some(ptr)
    }

    /// Return storage obtained from this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `alloc` or `alloc_zeroed` on this
    /// allocator with the same `layout`, and must not be used afterwards.
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: forwards to the referenced allocator, which upholds the contract.
unsafe impl<R: RawAllocator + ?Sized> RawAllocator for &R {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).alloc(layout)
    }

    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller's guarantees carry over unchanged.
        unsafe { (**self).dealloc(ptr, layout) }
    }
}

/// The process-wide global allocator (`std::alloc`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

// SAFETY: delegates to the global allocator, which upholds the contract
// for non-zero-sized layouts; zero-sized layouts are refused.
unsafe impl RawAllocator for SystemAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: layout has non-zero size.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: layout has non-zero size.
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr came from this allocator with layout.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: a Block is the unique owner of its storage; nothing else holds
// the pointer, so moving it to another thread cannot create aliasing.
unsafe impl Send for Block {}

impl Block {
    /// The block's storage as possibly-uninitialized bytes.
    pub fn as_uninit(&self) -> &[MaybeUninit<u8>] {
        // SAFETY: ptr addresses layout.size() bytes owned by this block;
        // MaybeUninit<u8> has no validity requirement.
        unsafe {
            std::slice::from_raw_parts(self.ptr.as_ptr().cast::<MaybeUninit<u8>>(), self.len())
        }
    }

    /// The block's storage as possibly-uninitialized bytes, mutably.
    pub fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe {
            std::slice::from_raw_parts_mut(
                self.ptr.as_ptr().cast::<MaybeUninit<u8>>(),
                self.len(),
            )
        }
    }

    /// The block's bytes, if every byte is known to be initialized.
    ///
    /// True for blocks from `allocate_zeroed` and after [`fill`](Block::fill).
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if !self.initialized {
            return None;
        }
        // SAFETY: `initialized` is only set once all len() bytes were written.
        Some(unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len()) })
    }

    /// Mutable access to the block's bytes, if fully initialized.
    pub fn as_bytes_mut(&mut self) -> Option<&mut [u8]> {
        if !self.initialized {
            return None;
        }
        // SAFETY: as in `as_bytes`, plus exclusive access through `&mut self`.
        Some(unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len()) })
    }
}

/// Obtain raw storage for `layout`, zero-filled if requested.
pub(crate) fn obtain<A: RawAllocator>(raw: &A, layout: Layout, zeroed: bool) -> Option<NonNull<u8>> {
    if zeroed {
        raw.alloc_zeroed(layout)
    } else {
        raw.alloc(layout)
    }
}

/// Hand a block's storage back to the raw allocator it came from.
///
/// The caller must have verified that `block.origin` names the allocator
/// owning `raw`.
pub(crate) fn return_storage<A: RawAllocator>(raw: &A, block: Block) {
    let (ptr, layout) = (block.ptr, block.layout);
    // SAFETY: the block was produced by `obtain` on this raw allocator with
    // this layout (origin checked by the caller) and is consumed here, so
    // the pointer cannot be used again.
    unsafe { raw.dealloc(ptr, layout) }
}
