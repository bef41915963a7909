//! Status codes and session-level error types.
//!
//! [`Info`] is the stable status code table every engine operation reports
//! through. [`SessionError`] is the structured error returned by session
//! operations; each variant maps onto exactly one `Info` code.

use std::error::Error;
use std::fmt;

/// Status code reported by every engine operation.
///
/// `Success` = 0, failures are positive. Values are ABI-stable and may be
/// handed across a binding layer unchanged.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Info {
    /// The operation completed.
    #[default]
    Success = 0,
    /// The requested entry is not present.
    NoValue = 1,
    /// An object was used before it was initialized.
    UninitializedObject = 2,
    /// An object is corrupt or was already freed.
    InvalidObject = 3,
    /// A required reference was null.
    NullPointer = 4,
    /// An argument has an illegal value (e.g. an unknown mode code).
    InvalidValue = 5,
    /// An index is outside the legal index range.
    InvalidIndex = 6,
    /// Operand domains are incompatible.
    DomainMismatch = 7,
    /// Operand dimensions are incompatible.
    DimensionMismatch = 8,
    /// The output object must be empty.
    OutputNotEmpty = 9,
    /// An allocation failed.
    OutOfMemory = 10,
    /// An index is outside the bounds of its object.
    IndexOutOfBounds = 11,
    /// Unrecoverable internal failure.
    Panic = 12,
}

impl Info {
    /// Stable integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this code denotes success.
    pub fn is_success(self) -> bool {
        self == Info::Success
    }

    /// Short lowercase name used in error reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoValue => "no value",
            Self::UninitializedObject => "uninitialized object",
            Self::InvalidObject => "invalid object",
            Self::NullPointer => "null pointer",
            Self::InvalidValue => "invalid value",
            Self::InvalidIndex => "invalid index",
            Self::DomainMismatch => "domain mismatch",
            Self::DimensionMismatch => "dimension mismatch",
            Self::OutputNotEmpty => "output not empty",
            Self::OutOfMemory => "out of memory",
            Self::IndexOutOfBounds => "index out of bounds",
            Self::Panic => "panic",
        }
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by session operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// An argument had an illegal value (`Info::InvalidValue`).
    InvalidValue {
        /// The offending value.
        value: i64,
        /// Human-readable description naming the value and the legal set.
        message: String,
    },
    /// An allocation through the session's allocator failed
    /// (`Info::OutOfMemory`).
    OutOfMemory,
    /// Blocking mode requires an empty pending queue on return, but the
    /// flush collaborator left work queued (`Info::Panic`).
    PendingNotDrained,
    /// The flush collaborator reported a failure while completing pending
    /// work (`Info::InvalidObject`).
    FlushFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl SessionError {
    /// The status code this error maps onto.
    pub fn status(&self) -> Info {
        Info::from(self)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { message, .. } => write!(f, "invalid value: {message}"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::PendingNotDrained => {
                write!(f, "pending operations remain after flush in blocking mode")
            }
            Self::FlushFailed { reason } => write!(f, "flush failed: {reason}"),
        }
    }
}

impl Error for SessionError {}

impl From<&SessionError> for Info {
    fn from(e: &SessionError) -> Self {
        match e {
            SessionError::InvalidValue { .. } => Info::InvalidValue,
            SessionError::OutOfMemory => Info::OutOfMemory,
            SessionError::PendingNotDrained => Info::Panic,
            SessionError::FlushFailed { .. } => Info::InvalidObject,
        }
    }
}
