//! Error types for breaker construction and guarded calls

use std::time::Duration;
use thiserror::Error;

/// Invalid breaker configuration, reported before any breaker exists
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The outcome window must hold at least one call
    #[error("record length must be greater than 0")]
    ZeroRecordLength,
    /// The failure ratio threshold must lie in [0, 1]
    #[error("failure ratio threshold {0} is outside [0, 1]")]
    FailureRatioOutOfRange(f64),
    /// At least one successful probe is required to recover
    #[error("recovery threshold must be at least 1")]
    ZeroRecoveryThreshold,
    /// Open timeout in seconds was negative, NaN, infinite or too large
    #[error("open timeout of {0} seconds is not a valid duration")]
    InvalidOpenTimeout(f64),
}

/// Result of a guarded call that did not produce a value
///
/// `Rejected` means the operation never ran. `Execution` carries the
/// operation's own error untouched.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// Breaker is open, the call was not attempted
    #[error("breaker '{breaker}' is open (opened at {opened_at:?}), call rejected")]
    Rejected { breaker: String, opened_at: Duration },
    /// The wrapped operation ran and failed
    #[error("guarded call failed: {0}")]
    Execution(#[source] E),
}

impl<E> BreakerError<E> {
    /// True when the operation was never invoked
    pub fn is_rejected(&self) -> bool {
        matches!(self, BreakerError::Rejected { .. })
    }

    /// The operation's own error, if it ran
    pub fn into_execution(self) -> Option<E> {
        match self {
            BreakerError::Execution(e) => Some(e),
            BreakerError::Rejected { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_rejected_is_distinct_from_execution() {
        let rejected: BreakerError<io::Error> = BreakerError::Rejected {
            breaker: "payments".to_string(),
            opened_at: Duration::from_secs(3),
        };
        assert!(rejected.is_rejected());
        assert!(rejected.into_execution().is_none());

        let failed = BreakerError::Execution(io::Error::other("boom"));
        assert!(!failed.is_rejected());
        assert_eq!(failed.into_execution().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_execution_exposes_source() {
        let failed = BreakerError::Execution(io::Error::other("downstream timeout"));
        let source = failed.source().expect("source should be the operation error");
        assert_eq!(source.to_string(), "downstream timeout");
        assert_eq!(failed.to_string(), "guarded call failed: downstream timeout");
    }

    #[test]
    fn test_rejected_message_names_breaker() {
        let rejected: BreakerError<io::Error> = BreakerError::Rejected {
            breaker: "inventory".to_string(),
            opened_at: Duration::from_millis(1500),
        };
        let message = rejected.to_string();
        assert!(message.contains("'inventory'"));
        assert!(message.contains("1.5s"));
    }

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::FailureRatioOutOfRange(1.5).to_string(),
            "failure ratio threshold 1.5 is outside [0, 1]"
        );
        assert_eq!(
            ConfigError::ZeroRecordLength.to_string(),
            "record length must be greater than 0"
        );
        assert_eq!(
            ConfigError::InvalidOpenTimeout(-2.0).to_string(),
            "open timeout of -2 seconds is not a valid duration"
        );
    }
}
