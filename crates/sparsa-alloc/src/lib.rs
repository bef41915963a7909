//! Overflow-checked, fault-injectable allocation for the Sparsa engine.
//!
//! Every dynamically sized allocation in the engine routes through
//! [`Allocator::allocate`]. This crate is the only production crate
//! that contains `unsafe` code, and all of it lives in the private `raw`
//! module.
//!
//! # Architecture
//!
//! ```text
//! Allocator<A: RawAllocator> (one per session)
//! ├── A: RawAllocator          (compile-time seam, default SystemAllocator)
//! ├── AllocConfig              (index bound)
//! ├── FaultInjector            (deterministic failure countdown)
//! └── AllocStats               (live count + cumulative counters)
//!
//! Workspace (one per session)
//! ├── mark: ScratchBuffer      (tracked, plus mark_flag watermark)
//! ├── work: ScratchBuffer      (always uninitialized)
//! └── flag: ScratchBuffer      (tracked)
//! ```
//!
//! # Failure signal
//!
//! `allocate` returns `None` for overflow, an index-bound violation, a
//! real out-of-memory, or an injected fault. Callers see one signal; the
//! cause is only visible through [`AllocStats`] and `tracing` output.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod allocator;
pub mod block;
pub mod config;
pub mod error;
pub mod fault;
mod raw;
pub mod scratch;
pub mod workspace;

// Public re-exports for the primary API surface.
pub use allocator::{AllocStats, Allocator, AllocatorId};
pub use block::Block;
pub use config::AllocConfig;
pub use error::{AllocatorMismatch, ForeignBlock};
pub use fault::FaultInjector;
pub use raw::{RawAllocator, SystemAllocator, BLOCK_ALIGN};
pub use scratch::{ScratchBuffer, ScratchKind};
pub use workspace::{ScratchSlot, Workspace};
