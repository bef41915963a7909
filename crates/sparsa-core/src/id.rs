//! Opaque identifiers shared between the session and its collaborators.

use std::fmt;
use std::num::NonZeroU64;

/// Weak, opaque reference to the head of the pending-operation queue.
///
/// The queue itself is owned by the deferred-execution collaborator. The
/// session only stores the token it is handed and clears it on reset; it
/// never dereferences, traverses, or drains the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PendingHead(NonZeroU64);

impl PendingHead {
    /// Wrap a collaborator-assigned token. Returns `None` for zero, which
    /// is reserved for "no pending work".
    pub fn new(token: u64) -> Option<Self> {
        NonZeroU64::new(token).map(Self)
    }

    /// The raw token value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl From<NonZeroU64> for PendingHead {
    fn from(v: NonZeroU64) -> Self {
        Self(v)
    }
}

impl fmt::Display for PendingHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
