//! Contract with the deferred-execution collaborator.
//!
//! The session stores a [`PendingHead`](sparsa_core::PendingHead) token
//! but never interprets it. Draining the queue belongs to whoever owns
//! the queue; the session only calls back into it through [`Flush`] when
//! the blocking-mode contract requires the queue to be empty.

use sparsa_alloc::{RawAllocator, SystemAllocator};
use sparsa_core::SessionError;

use crate::session::Session;

/// Completes every pending operation reachable from the session's pending
/// head.
///
/// An implementation must clear the head (via
/// [`Session::take_pending_head`] or
/// [`Session::set_pending_head`]`(None)`) once the queue is empty. It may
/// allocate through the session while doing so.
pub trait Flush<A: RawAllocator = SystemAllocator> {
    /// Drain the pending queue.
    fn flush(&mut self, session: &mut Session<A>) -> Result<(), SessionError>;
}

impl<A: RawAllocator, F: Flush<A> + ?Sized> Flush<A> for &mut F {
    fn flush(&mut self, session: &mut Session<A>) -> Result<(), SessionError> {
        (**self).flush(session)
    }
}
