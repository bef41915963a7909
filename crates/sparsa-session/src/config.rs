//! Session configuration, validation, and error types.
//!
//! [`SessionConfig`] is the builder-input for
//! [`Session::with_config`](crate::Session::with_config). Sessions created
//! with [`Session::new`](crate::Session::new) use the defaults.

use std::error::Error;
use std::fmt;

use sparsa_alloc::AllocConfig;
use sparsa_core::{Mode, INDEX_MAX};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SessionConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The allocation index bound is zero or exceeds `INDEX_MAX`.
    InvalidIndexMax {
        /// The configured bound.
        value: u64,
    },
    /// A fault-injection countdown was negative.
    NegativeFaultCountdown {
        /// The configured countdown.
        value: i64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIndexMax { value } => {
                write!(f, "index_max must be in 1..={INDEX_MAX}, got {value}")
            }
            Self::NegativeFaultCountdown { value } => {
                write!(f, "fault countdown must be non-negative, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SessionConfig ──────────────────────────────────────────────────

/// Complete configuration for constructing a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Initial execution mode. Default: non-blocking.
    pub mode: Mode,
    /// Allocation primitive configuration.
    pub alloc: AllocConfig,
    /// Enable fault injection with this many successful allocations before
    /// failures start. Default: disabled.
    pub fault_countdown: Option<i64>,
}

impl SessionConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alloc.is_valid() {
            return Err(ConfigError::InvalidIndexMax {
                value: self.alloc.index_max,
            });
        }
        if let Some(n) = self.fault_countdown {
            if n < 0 {
                return Err(ConfigError::NegativeFaultCountdown { value: n });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = SessionConfig::default();
        assert_eq!(config.mode, Mode::NonBlocking);
        assert!(config.fault_countdown.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn zero_index_max_rejected() {
        let config = SessionConfig {
            alloc: AllocConfig::with_index_max(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidIndexMax { value: 0 })
        );
    }

    #[test]
    fn oversized_index_max_rejected() {
        let config = SessionConfig {
            alloc: AllocConfig::with_index_max(INDEX_MAX + 1),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIndexMax { .. })
        ));
    }

    #[test]
    fn negative_countdown_rejected() {
        let config = SessionConfig {
            fault_countdown: Some(-1),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeFaultCountdown { value: -1 })
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("-1"));
    }
}
