//! Sparsa: the session and allocation core of a sparse linear-algebra engine.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Sparsa sub-crates. For most users, adding `sparsa` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sparsa::prelude::*;
//!
//! let mut session = Session::new();
//! session.initialize(Mode::Blocking).unwrap();
//!
//! // Every dynamic allocation goes through the session's primitive.
//! let block = session.allocate(1000, 8).unwrap();
//! assert_eq!(block.len(), 8000);
//! assert_eq!(session.live_allocations(), 1);
//! session.release(block).unwrap();
//!
//! // Oversized requests fail cleanly instead of wrapping.
//! assert!(session.allocate(usize::MAX, 2).is_none());
//!
//! // Unknown mode codes are rejected and leave the session untouched.
//! let err = session.initialize(7).unwrap_err();
//! assert_eq!(err.status(), Info::InvalidValue);
//! assert_eq!(session.mode(), Mode::Blocking);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sparsa-core` | Mode, status codes, index bound, error types |
//! | [`alloc`] | `sparsa-alloc` | Allocation primitive, raw allocator seam, scratch buffers |
//! | [`session`] | `sparsa-session` | Session context, initialization, error slot, flush contract |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary types (`sparsa-core`).
///
/// Contains [`types::Mode`], the [`types::Info`] status table,
/// [`types::SessionError`], and the [`types::INDEX_MAX`] bound.
pub use sparsa_core as types;

/// The allocation primitive (`sparsa-alloc`).
///
/// [`alloc::Allocator`] is generic over [`alloc::RawAllocator`], which is
/// the compile-time seam for substituting the underlying allocator.
pub use sparsa_alloc as alloc;

/// Session lifecycle (`sparsa-session`).
pub use sparsa_session as session;

/// Common imports for typical Sparsa usage.
///
/// ```rust
/// use sparsa::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use sparsa_core::{Info, Mode, PendingHead, SessionError};

    // Allocation
    pub use sparsa_alloc::{Block, RawAllocator, ScratchSlot, SystemAllocator};

    // Session
    pub use sparsa_session::{Flush, Session, SessionConfig};
}
