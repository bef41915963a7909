//! Session lifecycle for the Sparsa sparse linear-algebra engine.
//!
//! Every engine operation receives a [`Session`] by `&mut` reference and
//! consults it before doing real work. The session owns:
//!
//! - the execution [`Mode`](sparsa_core::Mode), chosen by
//!   [`Session::initialize`];
//! - a single-slot [`ErrorRecord`] describing the most recent failure;
//! - an opaque token for the head of the pending-operation queue;
//! - the allocation primitive, its counters, and its fault injector;
//! - the three reusable scratch buffers.
//!
//! # Execution contract
//!
//! In blocking mode a state-mutating operation calls
//! [`Session::finish_operation`] before returning, which hands the session
//! to a [`Flush`] collaborator and requires the pending queue to be empty
//! afterwards. In non-blocking mode the call is a no-op and deferred work
//! may stay queued.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod pending;
pub mod report;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use pending::Flush;
pub use report::{EntryCoord, ErrorRecord, SourceLocation};
pub use session::Session;
