//! The per-thread session context and its initialization entry point.
//!
//! [`Session`] holds everything an engine operation consults before doing
//! real work: the execution mode, the last-error slot, the pending-queue
//! token, the allocation primitive with its counters and fault injector,
//! and the three reusable scratch buffers.
//!
//! # Ownership model
//!
//! A session is passed explicitly by `&mut` reference; there is no
//! thread-local or global state. `Session` is [`Send`] whenever its raw
//! allocator is, so it can be moved to a worker thread, but all mutation
//! requires exclusive access.
//!
//! # Shutdown
//!
//! Dropping a session returns scratch storage to the raw allocator.
//! Blocks handed out by [`allocate`](Session::allocate) and never released
//! are leaked and remain counted in
//! [`live_allocations`](Session::live_allocations).

use std::mem::MaybeUninit;
use std::panic::Location;

use sparsa_alloc::{
    AllocStats, Allocator, Block, FaultInjector, ForeignBlock, RawAllocator, ScratchSlot,
    SystemAllocator, Workspace,
};
use sparsa_core::{Info, Mode, ModeCode, PendingHead, SessionError};

use crate::config::{ConfigError, SessionConfig};
use crate::pending::Flush;
use crate::report::{EntryCoord, ErrorRecord, SourceLocation};

// Compile-time assertion: the default session is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Session>();
    }
};

// ── Session ────────────────────────────────────────────────────────

/// Engine session context.
///
/// A session that is never [`initialize`](Session::initialize)d behaves as
/// a freshly initialized non-blocking session.
///
/// # Example
///
/// ```
/// use sparsa_core::Mode;
/// use sparsa_session::Session;
///
/// let mut session = Session::new();
/// session.initialize(Mode::Blocking).unwrap();
///
/// let block = session.allocate(0, 0).unwrap();
/// assert_eq!(block.len(), 1);
/// assert_eq!(session.live_allocations(), 1);
/// session.release(block).unwrap();
/// ```
pub struct Session<A: RawAllocator = SystemAllocator> {
    mode: Mode,
    error: ErrorRecord,
    pending: Option<PendingHead>,
    alloc: Allocator<A>,
    workspace: Workspace,
}

impl Session<SystemAllocator> {
    /// A non-blocking session over the global heap.
    pub fn new() -> Self {
        Self::with_allocator(SystemAllocator)
    }
}

impl Default for Session<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: RawAllocator> Session<A> {
    /// A non-blocking session over `raw`, with default configuration.
    pub fn with_allocator(raw: A) -> Self {
        Self {
            mode: Mode::NonBlocking,
            error: ErrorRecord::default(),
            pending: None,
            alloc: Allocator::new(raw),
            workspace: Workspace::new(),
        }
    }

    /// A session over `raw` built from a validated configuration.
    pub fn with_config(config: SessionConfig, raw: A) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut alloc = Allocator::with_config(raw, config.alloc);
        if let Some(n) = config.fault_countdown {
            alloc.set_fault(FaultInjector::after(n));
        }
        Ok(Self {
            mode: config.mode,
            error: ErrorRecord::default(),
            pending: None,
            alloc,
            workspace: Workspace::new(),
        })
    }

    // ── Initialization ─────────────────────────────────────────────

    /// Reset the session and select its execution mode.
    ///
    /// Accepts a [`Mode`] or a raw integer code. An unknown code returns
    /// [`SessionError::InvalidValue`] naming the code and the legal set;
    /// in that case nothing about the session changes, not even the error
    /// slot.
    ///
    /// A valid mode clears the error slot and the pending head, zeroes the
    /// allocation counters, disables fault injection, releases all scratch
    /// storage and resets the mark watermark, then stores the mode.
    /// Calling it repeatedly with the same mode is harmless.
    pub fn initialize(&mut self, mode: impl Into<ModeCode>) -> Result<(), SessionError> {
        let code = mode.into();
        let mode = match Mode::try_from(code) {
            Ok(mode) => mode,
            Err(e) => {
                tracing::warn!(
                    target: "sparsa.session",
                    code = code.0,
                    error = %e,
                    "rejected initialization"
                );
                return Err(e);
            }
        };

        let outstanding = self.alloc.live_allocations();
        self.release_scratch();
        self.alloc.reset_counters();
        self.error = ErrorRecord::default();
        self.pending = None;
        self.mode = mode;

        tracing::info!(
            target: "sparsa.session",
            %mode,
            outstanding,
            "session initialized"
        );
        Ok(())
    }

    /// Current execution mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    // ── Error slot ─────────────────────────────────────────────────

    /// Record a failure in the error slot, replacing whatever was there.
    ///
    /// The caller's source location is captured automatically. Returns
    /// `status` so a failing operation can write
    /// `return Err(session.record_error(..))`-style code.
    #[track_caller]
    pub fn record_error(&mut self, status: Info, detail: impl Into<String>) -> Info {
        self.store_error(status, Location::caller(), detail.into(), None)
    }

    /// Record a failure tied to one entry of a matrix or vector.
    #[track_caller]
    pub fn record_entry_error(
        &mut self,
        status: Info,
        entry: EntryCoord,
        detail: impl Into<String>,
    ) -> Info {
        self.store_error(status, Location::caller(), detail.into(), Some(entry))
    }

    /// Record a structured session error and hand it back.
    #[track_caller]
    pub fn fail(&mut self, err: SessionError) -> SessionError {
        self.store_error(err.status(), Location::caller(), err.to_string(), None);
        err
    }

    fn store_error(
        &mut self,
        status: Info,
        location: &'static Location<'static>,
        detail: String,
        entry: Option<EntryCoord>,
    ) -> Info {
        self.error = ErrorRecord::new(status, SourceLocation::from(location), detail, entry);
        tracing::debug!(
            target: "sparsa.session",
            status = status.code(),
            report = self.error.report(),
            "error recorded"
        );
        status
    }

    /// The most recent recorded failure.
    pub fn last_error(&self) -> &ErrorRecord {
        &self.error
    }

    /// Report text of the most recent failure; empty if none.
    pub fn error_report(&self) -> &str {
        self.error.report()
    }

    /// Reset the error slot to success.
    pub fn clear_error(&mut self) {
        self.error = ErrorRecord::default();
    }

    // ── Pending queue ──────────────────────────────────────────────

    /// Token for the head of the pending-operation queue, if any.
    pub fn pending_head(&self) -> Option<PendingHead> {
        self.pending
    }

    /// Replace the pending head. Only the queue owner should call this.
    pub fn set_pending_head(&mut self, head: Option<PendingHead>) {
        self.pending = head;
    }

    /// Remove and return the pending head.
    pub fn take_pending_head(&mut self) -> Option<PendingHead> {
        self.pending.take()
    }

    /// Whether deferred work is queued.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the execution-mode contract at the end of a state-mutating
    /// operation.
    ///
    /// In non-blocking mode, or with nothing pending, this does nothing.
    /// In blocking mode it hands the session to `flush` and then requires
    /// the pending head to be clear. A flush failure is recorded and
    /// returned unchanged; a queue left non-empty yields
    /// [`SessionError::PendingNotDrained`].
    #[track_caller]
    pub fn finish_operation<F: Flush<A> + ?Sized>(
        &mut self,
        flush: &mut F,
    ) -> Result<(), SessionError> {
        if !self.mode.is_blocking() || self.pending.is_none() {
            return Ok(());
        }
        let location = Location::caller();
        if let Err(e) = flush.flush(self) {
            self.store_error(e.status(), location, e.to_string(), None);
            return Err(e);
        }
        if let Some(head) = self.pending {
            tracing::warn!(
                target: "sparsa.session",
                %head,
                "pending queue not drained in blocking mode"
            );
            let e = SessionError::PendingNotDrained;
            self.store_error(e.status(), location, e.to_string(), None);
            return Err(e);
        }
        Ok(())
    }

    // ── Allocation ─────────────────────────────────────────────────

    /// Allocate uninitialized storage for `count * size` bytes.
    ///
    /// See [`Allocator::allocate`]; zero inputs are treated as one.
    pub fn allocate(&mut self, count: usize, size: usize) -> Option<Block> {
        self.alloc.allocate(count, size)
    }

    /// Allocate zero-filled storage for `count * size` bytes.
    pub fn allocate_zeroed(&mut self, count: usize, size: usize) -> Option<Block> {
        self.alloc.allocate_zeroed(count, size)
    }

    /// Like [`allocate`](Self::allocate), but a failure is recorded in the
    /// error slot and returned as [`SessionError::OutOfMemory`].
    #[track_caller]
    pub fn try_allocate(&mut self, count: usize, size: usize) -> Result<Block, SessionError> {
        match self.alloc.allocate(count, size) {
            Some(block) => Ok(block),
            None => {
                self.store_error(
                    Info::OutOfMemory,
                    Location::caller(),
                    format!("cannot allocate {count} x {size} bytes"),
                    None,
                );
                Err(SessionError::OutOfMemory)
            }
        }
    }

    /// Return a block to the session's allocator.
    pub fn release(&mut self, block: Block) -> Result<(), ForeignBlock> {
        self.alloc.release(block)
    }

    /// Blocks allocated through this session and not yet released.
    pub fn live_allocations(&self) -> u64 {
        self.alloc.live_allocations()
    }

    /// Allocation accounting since the last initialization.
    pub fn alloc_stats(&self) -> &AllocStats {
        self.alloc.stats()
    }

    /// The session's allocation primitive.
    pub fn allocator(&self) -> &Allocator<A> {
        &self.alloc
    }

    /// Let `countdown` further allocations succeed, then fail every one
    /// after that until cleared or the session is reinitialized.
    pub fn set_fault_injection(&mut self, countdown: i64) {
        tracing::debug!(target: "sparsa.session", countdown, "fault injection enabled");
        self.alloc.set_fault(FaultInjector::after(countdown));
    }

    /// Disable fault injection.
    pub fn clear_fault_injection(&mut self) {
        self.alloc.set_fault(FaultInjector::disabled());
    }

    /// Current fault injection policy.
    pub fn fault(&self) -> FaultInjector {
        self.alloc.fault()
    }

    // ── Scratch workspace ──────────────────────────────────────────

    /// Borrow `bytes` bytes of the scratch buffer `slot`, growing it first
    /// if it is too small.
    ///
    /// Returns `None` if growth fails; the buffer keeps its previous
    /// storage and contents.
    pub fn scratch(&mut self, slot: ScratchSlot, bytes: usize) -> Option<&mut [MaybeUninit<u8>]> {
        self.workspace.ensure(&mut self.alloc, slot, bytes)
    }

    /// Read access to the scratch buffers.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Advance the mark watermark, invalidating every current mark.
    pub fn advance_mark(&mut self) -> i64 {
        self.workspace.advance_mark()
    }

    /// Current mark watermark.
    pub fn mark_flag(&self) -> i64 {
        self.workspace.mark_flag()
    }

    fn release_scratch(&mut self) {
        // The workspace is only ever grown through `self.alloc`.
        if let Err(e) = self.workspace.release_all(&mut self.alloc) {
            tracing::warn!(target: "sparsa.session", error = %e, "scratch not released");
        }
    }
}

impl<A: RawAllocator> Drop for Session<A> {
    fn drop(&mut self) {
        self.release_scratch();
    }
}

impl<A: RawAllocator> std::fmt::Debug for Session<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("status", &self.error.status())
            .field("pending", &self.pending)
            .field("live_allocations", &self.alloc.live_allocations())
            .field("scratch_bytes", &self.workspace.memory_bytes())
            .finish_non_exhaustive()
    }
}
