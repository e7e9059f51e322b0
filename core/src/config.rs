//! Breaker configuration

use crate::errors::ConfigError;
use std::time::Duration;

/// Breaker configuration, fixed for the breaker's lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of trailing calls tracked by the outcome window
    pub record_length: usize,

    /// How long the breaker stays Open before a call may probe
    pub open_timeout: Duration,

    /// Failure ratio (0.0-1.0) over the whole window that opens the breaker
    /// Compared with `>=`
    pub failure_ratio_threshold: f64,

    /// HalfOpen closes after strictly more than this many consecutive successes
    pub recovery_threshold: usize,
}

impl Config {
    /// Check every invariant the breaker relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.record_length == 0 {
            return Err(ConfigError::ZeroRecordLength);
        }
        // NaN fails `contains` as well
        if !(0.0..=1.0).contains(&self.failure_ratio_threshold) {
            return Err(ConfigError::FailureRatioOutOfRange(
                self.failure_ratio_threshold,
            ));
        }
        if self.recovery_threshold == 0 {
            return Err(ConfigError::ZeroRecoveryThreshold);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_length: 100,
            open_timeout: Duration::from_secs(2),
            failure_ratio_threshold: 0.3,
            recovery_threshold: 10,
        }
    }
}
