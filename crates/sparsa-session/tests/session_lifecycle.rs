//! Integration test: session initialization and reset semantics.
//!
//! Walks a session through the mode transitions and reset paths an engine
//! sees over its lifetime, checking that every piece of session state is
//! reset by a valid initialization and untouched by an invalid one.

use sparsa_alloc::{AllocStats, FaultInjector, ScratchSlot};
use sparsa_core::{Info, Mode, PendingHead, SessionError};
use sparsa_session::{Session, SessionConfig};
use sparsa_test_utils::CountingAllocator;

fn dirty(session: &mut Session<CountingAllocator>) {
    session.record_error(Info::DimensionMismatch, "3x4 vs 5x4");
    session.set_pending_head(PendingHead::new(77));
    session.set_fault_injection(100);
    session.scratch(ScratchSlot::Mark, 40).unwrap();
    session.scratch(ScratchSlot::Work, 400).unwrap();
    session.scratch(ScratchSlot::Flag, 4).unwrap();
    session.advance_mark();
}

fn assert_reset(session: &Session<CountingAllocator>) {
    assert!(!session.last_error().is_set());
    assert!(session.error_report().is_empty());
    assert!(session.pending_head().is_none());
    assert_eq!(session.live_allocations(), 0);
    assert_eq!(session.alloc_stats(), &AllocStats::default());
    assert!(!session.fault().is_enabled());
    assert!(session.workspace().is_empty());
    assert_eq!(session.mark_flag(), 1);
}

#[test]
fn fresh_session_allocates_zero_by_zero() {
    let mut session = Session::new();
    let block = session.allocate(0, 0).unwrap();
    assert_eq!(block.len(), 1);
    assert_eq!(session.live_allocations(), 1);
    session.release(block).unwrap();
}

#[test]
fn overflowing_request_leaves_counter() {
    let mut session = Session::with_allocator(CountingAllocator::new());
    assert!(session.allocate(usize::MAX, 2).is_none());
    assert_eq!(session.live_allocations(), 0);
    assert_eq!(session.alloc_stats().overflow_rejections, 1);
    assert_eq!(session.alloc_stats().bound_rejections, 0);
    assert_eq!(session.allocator().raw().alloc_calls(), 0);
}

#[test]
fn blocking_then_non_blocking_resets() {
    let mut session = Session::with_allocator(CountingAllocator::new());
    session.initialize(Mode::Blocking).unwrap();
    dirty(&mut session);
    assert_eq!(session.allocator().raw().live_blocks(), 3);

    session.initialize(Mode::NonBlocking).unwrap();
    assert_eq!(session.mode(), Mode::NonBlocking);
    assert_reset(&session);
    // All scratch storage went back to the raw allocator.
    assert_eq!(session.allocator().raw().live_blocks(), 0);
}

#[test]
fn unknown_code_then_valid_init() {
    let mut session = Session::with_allocator(CountingAllocator::new());
    dirty(&mut session);

    let err = session.initialize(7).unwrap_err();
    match &err {
        SessionError::InvalidValue { value, message } => {
            assert_eq!(*value, 7);
            assert!(message.contains('7'), "message was: {message}");
            assert!(message.contains('0') && message.contains('1'));
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
    assert_eq!(err.status(), Info::InvalidValue);

    // Nothing moved, including the previous error.
    assert_eq!(session.mode(), Mode::NonBlocking);
    assert_eq!(session.last_error().status(), Info::DimensionMismatch);
    assert!(session.error_report().contains("3x4 vs 5x4"));
    assert_eq!(session.pending_head(), PendingHead::new(77));
    assert_eq!(session.fault(), FaultInjector::after(97));
    assert_eq!(session.mark_flag(), 2);
    assert_eq!(session.workspace().memory_bytes(), 444);

    session.initialize(Mode::Blocking).unwrap();
    assert_eq!(session.mode(), Mode::Blocking);
    assert_reset(&session);
}

#[test]
fn negative_code_rejected() {
    let mut session = Session::new();
    assert!(matches!(
        session.initialize(-1),
        Err(SessionError::InvalidValue { value: -1, .. })
    ));
    assert_eq!(session.mode(), Mode::NonBlocking);
}

#[test]
fn raw_codes_accepted() {
    let mut session = Session::new();
    session.initialize(1).unwrap();
    assert_eq!(session.mode(), Mode::Blocking);
    session.initialize(0).unwrap();
    assert_eq!(session.mode(), Mode::NonBlocking);
}

#[test]
fn block_outstanding_across_reset() {
    let mut session = Session::with_allocator(CountingAllocator::new());
    let block = session.allocate(8, 8).unwrap();
    session.initialize(Mode::Blocking).unwrap();
    assert_eq!(session.live_allocations(), 0);
    assert_eq!(session.allocator().raw().live_blocks(), 1);

    session.release(block).unwrap();
    assert_eq!(session.live_allocations(), 0);
    assert_eq!(session.allocator().raw().live_blocks(), 0);
}

#[test]
fn releasing_pre_reset_block_keeps_leak_visible() {
    let mut session = Session::with_allocator(CountingAllocator::new());
    let old = session.allocate(4, 4).unwrap();
    session.initialize(Mode::NonBlocking).unwrap();
    let fresh = session.allocate(4, 4).unwrap();

    session.release(old).unwrap();
    assert_eq!(session.live_allocations(), 1);
    assert_eq!(session.allocator().raw().live_blocks(), 1);

    // Forgetting the post-reset block is still a detectable leak.
    drop(fresh);
    assert_eq!(session.live_allocations(), 1);
}

#[test]
fn unreleased_block_is_visible_as_leak() {
    let mut session = Session::new();
    let block = session.allocate(4, 4).unwrap();
    drop(block);
    assert_eq!(session.live_allocations(), 1);
}

#[test]
fn config_built_session() {
    let config = SessionConfig {
        mode: Mode::Blocking,
        ..Default::default()
    };
    let session = Session::with_config(config, CountingAllocator::new()).unwrap();
    assert_eq!(session.mode(), Mode::Blocking);
    assert_eq!(session.live_allocations(), 0);
}

#[test]
fn session_moves_across_threads() {
    let mut session = Session::new();
    session.initialize(Mode::Blocking).unwrap();
    let session = std::thread::spawn(move || {
        let block = session.allocate(16, 1).unwrap();
        session.release(block).unwrap();
        session
    })
    .join()
    .unwrap();
    assert_eq!(session.alloc_stats().allocations, 1);
    assert_eq!(session.live_allocations(), 0);
}
