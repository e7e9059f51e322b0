//! Builder API for ergonomic breaker configuration

use crate::{
    breaker::Breaker,
    callbacks::Callbacks,
    clock::{Clock, MonotonicClock},
    config::Config,
    errors::ConfigError,
    machine::BreakerContext,
};
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating breakers with a fluent API
///
/// Values are validated by `build`, never clamped.
pub struct BreakerBuilder {
    name: String,
    config: Config,
    clock: Option<Arc<dyn Clock>>,
    callbacks: Callbacks,
    /// Seconds passed to `open_timeout_secs` that are not a `Duration`
    invalid_timeout_secs: Option<f64>,
}

impl BreakerBuilder {
    /// Create a new builder for a breaker with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Config::default(),
            clock: None,
            callbacks: Callbacks::new(),
            invalid_timeout_secs: None,
        }
    }

    /// Number of trailing calls the outcome window tracks
    pub fn record_length(mut self, length: usize) -> Self {
        self.config.record_length = length;
        self
    }

    /// How long the breaker stays open before probing
    pub fn open_timeout(mut self, timeout: Duration) -> Self {
        self.config.open_timeout = timeout;
        self.invalid_timeout_secs = None;
        self
    }

    /// Same as `open_timeout`, in seconds
    ///
    /// Negative, NaN, infinite or overflowing values make `build` fail with
    /// `ConfigError::InvalidOpenTimeout`.
    pub fn open_timeout_secs(mut self, seconds: f64) -> Self {
        match Duration::try_from_secs_f64(seconds) {
            Ok(timeout) => {
                self.config.open_timeout = timeout;
                self.invalid_timeout_secs = None;
            }
            Err(_) => self.invalid_timeout_secs = Some(seconds),
        }
        self
    }

    /// Failure ratio (0.0-1.0) over the window that opens the breaker
    pub fn failure_ratio(mut self, ratio: f64) -> Self {
        self.config.failure_ratio_threshold = ratio;
        self
    }

    /// Probes that must succeed in a row, plus one, before closing
    pub fn recovery_threshold(mut self, threshold: usize) -> Self {
        self.config.recovery_threshold = threshold;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self.invalid_timeout_secs = None;
        self
    }

    /// Set a custom time source (defaults to `MonotonicClock`)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set callback for when the breaker opens
    pub fn on_open<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_open = Some(Arc::new(f));
        self
    }

    /// Set callback for when the breaker starts probing
    pub fn on_half_open<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_half_open = Some(Arc::new(f));
        self
    }

    /// Set callback for when the breaker closes after recovery
    pub fn on_close<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_close = Some(Arc::new(f));
        self
    }

    /// Validate the configuration and build the breaker
    pub fn build(self) -> Result<Breaker, ConfigError> {
        if let Some(seconds) = self.invalid_timeout_secs {
            return Err(ConfigError::InvalidOpenTimeout(seconds));
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        let context = BreakerContext {
            name: self.name,
            config: self.config,
            clock,
        };

        Breaker::with_context_and_callbacks(context, self.callbacks)
    }
}
