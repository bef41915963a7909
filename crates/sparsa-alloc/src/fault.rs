//! Deterministic allocation-failure injection.
//!
//! [`FaultInjector`] is a small policy value owned by each
//! [`Allocator`](crate::Allocator). When enabled, it lets a fixed number of
//! allocations succeed and then fails every later one, without touching
//! the raw allocator. Tests walk the countdown from 0 upwards to drive
//! every out-of-memory recovery path in an operation.

/// Countdown-based failure injection policy.
///
/// Disabled by default. While enabled, each real successful allocation
/// decrements `countdown`; once it is `<= 0` every request fails until the
/// injector is disabled or the countdown is raised again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaultInjector {
    enabled: bool,
    countdown: i64,
}

impl FaultInjector {
    /// An injector that never fails an allocation.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            countdown: 0,
        }
    }

    /// An enabled injector that lets `successes` allocations through.
    ///
    /// `after(0)` fails the very next allocation.
    pub const fn after(successes: i64) -> Self {
        Self {
            enabled: true,
            countdown: successes,
        }
    }

    /// Whether injection is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Remaining successes before injected failures start.
    pub fn countdown(&self) -> i64 {
        self.countdown
    }

    /// Whether the next allocation must fail.
    pub fn should_fail(&self) -> bool {
        self.enabled && self.countdown <= 0
    }

    /// Account for one real successful allocation.
    pub fn record_success(&mut self) {
        if self.enabled {
            self.countdown = self.countdown.saturating_sub(1);
        }
    }
}
