//! Mock deferred-execution collaborators.
//!
//! - [`MockQueue`]: drains the pending queue on every flush, or fails with
//!   a fixed reason.
//! - [`StuckQueue`]: reports success but never clears the pending head.

use sparsa_alloc::RawAllocator;
use sparsa_core::SessionError;
use sparsa_session::{Flush, Session};

/// Drains the pending queue, optionally allocating while doing so.
#[derive(Debug, Default)]
pub struct MockQueue {
    pub flushes: usize,
    /// Blocks to allocate (and release) per flush, to exercise the
    /// allocator from inside the collaborator.
    pub scratch_allocs: usize,
    fail_with: Option<String>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that allocates and releases `n` blocks on every flush.
    pub fn with_scratch_allocs(n: usize) -> Self {
        Self {
            scratch_allocs: n,
            ..Self::default()
        }
    }

    /// A queue whose every flush fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }
}

impl<A: RawAllocator> Flush<A> for MockQueue {
    fn flush(&mut self, session: &mut Session<A>) -> Result<(), SessionError> {
        self.flushes += 1;
        if let Some(reason) = &self.fail_with {
            return Err(SessionError::FlushFailed {
                reason: reason.clone(),
            });
        }
        for _ in 0..self.scratch_allocs {
            let block = session.try_allocate(16, 8)?;
            if session.release(block).is_err() {
                return Err(SessionError::FlushFailed {
                    reason: "foreign block".into(),
                });
            }
        }
        session.take_pending_head();
        Ok(())
    }
}

/// Claims success but leaves the queue untouched.
#[derive(Debug, Default)]
pub struct StuckQueue {
    pub flushes: usize,
}

impl<A: RawAllocator> Flush<A> for StuckQueue {
    fn flush(&mut self, _session: &mut Session<A>) -> Result<(), SessionError> {
        self.flushes += 1;
        Ok(())
    }
}
