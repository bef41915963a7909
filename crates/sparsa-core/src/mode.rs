//! Execution mode: blocking vs non-blocking completion of deferred work.

use std::fmt;

use crate::error::SessionError;

/// Whether deferred work must complete before an operation returns.
///
/// The mode is chosen once per session initialization and read by every
/// engine operation. No operation other than initialization changes it.
///
/// # Hazards of non-blocking mode
///
/// In [`NonBlocking`](Mode::NonBlocking) mode an operation may be left
/// pending and computed later. If a user-defined operator reads state the
/// caller later mutates, or the operator itself is freed, the pending
/// work observes the new state. Callers must flush the pending queue
/// before mutating anything a pending operation may reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Mode {
    /// Operations may remain pending across call boundaries.
    #[default]
    NonBlocking = 0,
    /// Every state-mutating operation drains the pending queue before
    /// returning to the caller.
    Blocking = 1,
}

impl Mode {
    /// Stable integer code of this mode.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether pending work must be drained before returning.
    pub fn is_blocking(self) -> bool {
        matches!(self, Mode::Blocking)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonBlocking => write!(f, "non-blocking"),
            Self::Blocking => write!(f, "blocking"),
        }
    }
}

/// A raw, not-yet-validated execution mode code.
///
/// Initialization accepts anything convertible into a `ModeCode`, so both
/// a typed [`Mode`] and an untrusted integer (e.g. read from a binding
/// layer) go through the same validation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModeCode(pub i32);

impl From<Mode> for ModeCode {
    fn from(mode: Mode) -> Self {
        Self(mode.code())
    }
}

impl From<i32> for ModeCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl TryFrom<ModeCode> for Mode {
    type Error = SessionError;

    fn try_from(code: ModeCode) -> Result<Self, Self::Error> {
        match code.0 {
            0 => Ok(Mode::NonBlocking),
            1 => Ok(Mode::Blocking),
            other => Err(SessionError::InvalidValue {
                value: i64::from(other),
                message: format!(
                    "unknown mode: {other}; must be {} (non-blocking) or {} (blocking)",
                    Mode::NonBlocking.code(),
                    Mode::Blocking.code()
                ),
            }),
        }
    }
}

impl TryFrom<i32> for Mode {
    type Error = SessionError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Mode::try_from(ModeCode(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_non_blocking() {
        assert_eq!(Mode::default(), Mode::NonBlocking);
        assert!(!Mode::default().is_blocking());
    }

    #[test]
    fn codes_round_trip() {
        for mode in [Mode::NonBlocking, Mode::Blocking] {
            assert_eq!(Mode::try_from(ModeCode::from(mode)).unwrap(), mode);
        }
        assert_eq!(Mode::Blocking.code(), 1);
        assert_eq!(Mode::NonBlocking.code(), 0);
    }

    #[test]
    fn unknown_code_names_value() {
        let err = Mode::try_from(7).unwrap_err();
        match err {
            SessionError::InvalidValue { value, ref message } => {
                assert_eq!(value, 7);
                assert!(message.contains("7"), "message was: {message}");
                assert!(message.contains("blocking"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn negative_code_rejected() {
        assert!(Mode::try_from(-1).is_err());
    }
}
