//! Test utilities and mock types for Sparsa development.
//!
//! Provides raw allocators that observe or refuse every call the
//! allocation primitive makes ([`CountingAllocator`],
//! [`ExhaustedAllocator`]), and mock deferred-execution collaborators in
//! [`fixtures`].

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use indexmap::IndexMap;
use sparsa_alloc::{RawAllocator, SystemAllocator};

pub use fixtures::{MockQueue, StuckQueue};

/// Wraps the system allocator and records every raw call.
///
/// Live blocks are tracked by address in allocation order, so a test can
/// assert both how many raw calls an operation made and exactly which
/// blocks are still outstanding.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    alloc_calls: Cell<u64>,
    dealloc_calls: Cell<u64>,
    live: RefCell<IndexMap<usize, usize>>,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw allocation calls made, successful or not.
    pub fn alloc_calls(&self) -> u64 {
        self.alloc_calls.get()
    }

    /// Raw deallocation calls made.
    pub fn dealloc_calls(&self) -> u64 {
        self.dealloc_calls.get()
    }

    /// Number of raw blocks not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.live.borrow().len()
    }

    /// Sizes of outstanding raw blocks, oldest first.
    pub fn live_sizes(&self) -> Vec<usize> {
        self.live.borrow().values().copied().collect()
    }

    fn track(&self, ptr: Option<NonNull<u8>>, layout: Layout) -> Option<NonNull<u8>> {
        self.alloc_calls.set(self.alloc_calls.get() + 1);
        if let Some(p) = ptr {
            self.live.borrow_mut().insert(p.as_ptr() as usize, layout.size());
        }
        ptr
    }
}

// SAFETY: every call is forwarded to SystemAllocator unchanged.
#[allow(unsafe_code)]
unsafe impl RawAllocator for CountingAllocator {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.track(SystemAllocator.alloc(layout), layout)
    }

    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.track(SystemAllocator.alloc_zeroed(layout), layout)
    }

    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        self.dealloc_calls.set(self.dealloc_calls.get() + 1);
        self.live.borrow_mut().shift_remove(&(ptr.as_ptr() as usize));
        // SAFETY: caller upholds the dealloc contract; the pointer came
        // from SystemAllocator via alloc/alloc_zeroed above.
        unsafe { SystemAllocator.dealloc(ptr, layout) }
    }
}

/// A raw allocator with no memory left. Every request fails.
#[derive(Debug, Default)]
pub struct ExhaustedAllocator {
    attempts: Cell<u64>,
}

impl ExhaustedAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocation attempts observed.
    pub fn attempts(&self) -> u64 {
        self.attempts.get()
    }
}

// SAFETY: never returns a pointer, so there is nothing to deallocate.
#[allow(unsafe_code)]
unsafe impl RawAllocator for ExhaustedAllocator {
    fn alloc(&self, _layout: Layout) -> Option<NonNull<u8>> {
        self.attempts.set(self.attempts.get() + 1);
        None
    }

    fn alloc_zeroed(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.alloc(layout)
    }

    unsafe fn dealloc(&self, _ptr: NonNull<u8>, _layout: Layout) {
        unreachable!("ExhaustedAllocator never hands out storage");
    }
}
