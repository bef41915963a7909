//! Allocator error types.

use std::error::Error;
use std::fmt;

use crate::allocator::AllocatorId;
use crate::block::Block;

/// A block was handed to an allocator that did not produce it.
///
/// The block is returned untouched so the caller can release it to its
/// real origin. No counters change.
#[derive(Debug)]
pub struct ForeignBlock(pub Block);

impl ForeignBlock {
    /// Recover the rejected block.
    pub fn into_inner(self) -> Block {
        self.0
    }
}

impl fmt::Display for ForeignBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block from allocator {} released to a different allocator",
            self.0.origin()
        )
    }
}

impl Error for ForeignBlock {}

/// A scratch buffer was used with an allocator other than the one that
/// owns its storage.
///
/// The buffer is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocatorMismatch {
    /// Allocator that produced the buffer's storage.
    pub owner: AllocatorId,
    /// Allocator the caller supplied.
    pub found: AllocatorId,
}

impl fmt::Display for AllocatorMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scratch storage belongs to allocator {}, not {}",
            self.owner, self.found
        )
    }
}

impl Error for AllocatorMismatch {}

/// Why a single allocation request failed.
///
/// Never returned to callers of `allocate`; used for counters and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AllocFailure {
    /// `count * size` overflowed, or did not form a valid layout.
    Overflow { count: usize, size: usize },
    /// `count` or `size` exceeded the configured index bound.
    IndexBound { count: usize, size: usize, bound: u64 },
    /// The fault injector's countdown reached zero.
    Injected,
    /// The raw allocator returned null.
    OutOfMemory { bytes: usize },
}

impl fmt::Display for AllocFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow { count, size } => {
                write!(f, "size overflow: {count} items of {size} bytes")
            }
            Self::IndexBound { count, size, bound } => {
                write!(f, "index bound exceeded: {count} items of {size} bytes, bound {bound}")
            }
            Self::Injected => write!(f, "injected allocation failure"),
            Self::OutOfMemory { bytes } => write!(f, "out of memory allocating {bytes} bytes"),
        }
    }
}
