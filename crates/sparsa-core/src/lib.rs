//! Core types and status codes for the Sparsa sparse linear-algebra engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every other Sparsa crate: the execution [`Mode`],
//! the [`Info`] status code table, session error types, the engine-wide
//! index bound, and the pending-operation token ([`PendingHead`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod index;
pub mod mode;

pub use error::{Info, SessionError};
pub use id::PendingHead;
pub use index::{checked_mul, INDEX_MAX};
pub use mode::{Mode, ModeCode};
