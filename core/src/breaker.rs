//! The public breaker handle
//!
//! All mutable state (state machine, outcome window, cursor, open timestamp,
//! half-open counter) sits in one `Core` behind a single mutex. The lock is
//! taken twice per call, once to admit and once to record, and is never held
//! while the protected operation runs.

use crate::{
    Outcome,
    callbacks::{Callbacks, Transition},
    clock::MonotonicClock,
    config::Config,
    errors::{BreakerError, ConfigError},
    machine::{BreakerContext, CircuitEvent, DynamicCircuit},
    window::OutcomeWindow,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Observable breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "Closed",
            BreakerState::Open => "Open",
            BreakerState::HalfOpen => "HalfOpen",
        }
    }

    fn from_machine(name: &str) -> Self {
        match name {
            "Closed" => BreakerState::Closed,
            "Open" => BreakerState::Open,
            "HalfOpen" => BreakerState::HalfOpen,
            other => unreachable!("state machine reported unknown state {:?}", other),
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context handed to a fallback when the breaker rejects a call
#[derive(Debug, Clone)]
pub struct FallbackContext {
    pub breaker: String,
    /// Clock reading when the breaker opened
    pub opened_at: Duration,
}

/// Point-in-time copy of the breaker's internals
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: BreakerState,
    pub failures: usize,
    pub failure_ratio: f64,
    pub cursor: usize,
    /// Zero outside HalfOpen
    pub half_open_successes: usize,
    /// Set only while Open
    pub opened_at: Option<Duration>,
    /// Window contents, oldest first
    pub outcomes: Vec<Outcome>,
}

struct Core {
    machine: DynamicCircuit,
    window: OutcomeWindow,
}

impl Core {
    fn new(context: &BreakerContext) -> Self {
        Self {
            machine: DynamicCircuit::new(context.clone()),
            window: OutcomeWindow::new(context.config.record_length),
        }
    }

    fn state(&self) -> BreakerState {
        BreakerState::from_machine(self.machine.current_state())
    }

    /// Lazily move Open -> HalfOpen; `Err(opened_at)` if the call must be rejected
    fn admit(&mut self, ctx: &BreakerContext) -> Result<Option<Transition>, Duration> {
        if self.state() != BreakerState::Open {
            return Ok(None);
        }

        if self.machine.handle(CircuitEvent::Probe).is_ok() {
            info!(breaker = %ctx.name, "breaker half-open, probing dependency");
            return Ok(Some(Transition::HalfOpened));
        }

        let opened_at = self.opened_at().unwrap_or_default();
        debug!(breaker = %ctx.name, ?opened_at, "breaker open, call rejected");
        Err(opened_at)
    }

    /// Write one outcome into the window and apply the transition policy
    fn record(&mut self, ctx: &BreakerContext, outcome: Outcome) -> Option<Transition> {
        self.window.record(outcome);
        trace!(
            breaker = %ctx.name,
            ?outcome,
            cursor = self.window.cursor(),
            "outcome recorded"
        );

        match (self.state(), outcome) {
            (BreakerState::Closed, _) => {
                let ratio = self.window.failure_ratio();
                if ratio < ctx.config.failure_ratio_threshold {
                    return None;
                }
                self.trip(ctx)?;
                warn!(
                    breaker = %ctx.name,
                    failures = self.window.failures(),
                    ratio,
                    "failure ratio reached threshold, breaker opened"
                );
                Some(Transition::Opened)
            }
            (BreakerState::HalfOpen, Outcome::Success) => {
                if let Some(data) = self.machine.half_open_data_mut() {
                    data.consecutive_successes += 1;
                }
                self.machine.handle(CircuitEvent::Recover).ok()?;
                self.window.reset();
                info!(breaker = %ctx.name, "breaker recovered, closed");
                Some(Transition::Closed)
            }
            (BreakerState::HalfOpen, Outcome::Failure) => {
                self.trip(ctx)?;
                warn!(breaker = %ctx.name, "probe failed, breaker reopened");
                Some(Transition::Opened)
            }
            // A call admitted before the breaker opened finished late
            (BreakerState::Open, _) => None,
        }
    }

    fn trip(&mut self, ctx: &BreakerContext) -> Option<()> {
        self.machine.handle(CircuitEvent::Trip).ok()?;
        if let Some(data) = self.machine.open_data_mut() {
            data.opened_at = ctx.clock.now();
        }
        Some(())
    }

    fn opened_at(&self) -> Option<Duration> {
        self.machine.open_data().map(|data| data.opened_at)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state(),
            failures: self.window.failures(),
            failure_ratio: self.window.failure_ratio(),
            cursor: self.window.cursor(),
            half_open_successes: self
                .machine
                .half_open_data()
                .map(|data| data.consecutive_successes)
                .unwrap_or(0),
            opened_at: self.opened_at(),
            outcomes: self.window.outcomes(),
        }
    }
}

/// Circuit breaker guarding one dependency
///
/// Share it across threads with `Arc<Breaker>`; every method takes `&self`.
pub struct Breaker {
    context: BreakerContext,
    core: Mutex<Core>,
    callbacks: Callbacks,
}

impl Breaker {
    /// Create a breaker named `"breaker"` from the four thresholds
    pub fn new(
        record_length: usize,
        open_timeout: Duration,
        failure_ratio_threshold: f64,
        recovery_threshold: usize,
    ) -> Result<Self, ConfigError> {
        Self::with_config(
            "breaker",
            Config {
                record_length,
                open_timeout,
                failure_ratio_threshold,
                recovery_threshold,
            },
        )
    }

    /// Create a named breaker from a full configuration
    pub fn with_config(name: impl Into<String>, config: Config) -> Result<Self, ConfigError> {
        let context = BreakerContext {
            name: name.into(),
            config,
            clock: Arc::new(MonotonicClock::new()),
        };
        Self::with_context_and_callbacks(context, Callbacks::new())
    }

    /// Create a breaker with custom context and callbacks (used by builder)
    pub(crate) fn with_context_and_callbacks(
        context: BreakerContext,
        callbacks: Callbacks,
    ) -> Result<Self, ConfigError> {
        context.config.validate()?;
        let core = Mutex::new(Core::new(&context));

        Ok(Self {
            context,
            core,
            callbacks,
        })
    }

    /// Create a new breaker builder
    pub fn builder(name: impl Into<String>) -> crate::builder::BreakerBuilder {
        crate::builder::BreakerBuilder::new(name)
    }

    /// Run `operation` unless the breaker is open
    ///
    /// Returns the operation's value, its error wrapped in
    /// `BreakerError::Execution`, or `BreakerError::Rejected` without running it.
    pub fn call<T, E, F>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Err(opened_at) = self.admit() {
            return Err(BreakerError::Rejected {
                breaker: self.context.name.clone(),
                opened_at,
            });
        }

        let result = operation();
        self.record(if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        });

        result.map_err(BreakerError::Execution)
    }

    /// Like `call`, but answers a rejection with `fallback` instead
    ///
    /// The fallback's outcome is never recorded in the window.
    ///
    /// ```rust
    /// use ratio_breaker::Breaker;
    /// use std::time::Duration;
    ///
    /// let breaker = Breaker::new(2, Duration::from_secs(30), 0.5, 1).unwrap();
    /// let _ = breaker.call(|| Err::<&str, _>("down"));
    /// assert!(breaker.is_open());
    ///
    /// let value = breaker.call_with_fallback(|| Ok::<_, &str>("live"), |_ctx| Ok("cached"));
    /// assert_eq!(value.unwrap(), "cached");
    /// ```
    pub fn call_with_fallback<T, E, F, G>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        G: FnOnce(&FallbackContext) -> Result<T, E>,
    {
        match self.call(operation) {
            Err(BreakerError::Rejected { breaker, opened_at }) => {
                let ctx = FallbackContext { breaker, opened_at };
                fallback(&ctx).map_err(BreakerError::Execution)
            }
            other => other,
        }
    }

    /// Record an outcome observed outside `call` and apply the transition policy
    pub fn record(&self, outcome: Outcome) {
        let transition = self.core.lock().record(&self.context, outcome);
        self.notify(transition);
    }

    /// Force Closed with an all-success window
    pub fn reset(&self) {
        {
            let mut core = self.core.lock();
            *core = Core::new(&self.context);
        }
        info!(breaker = %self.context.name, "breaker reset");
    }

    pub fn state(&self) -> BreakerState {
        self.core.lock().state()
    }

    pub fn state_name(&self) -> &'static str {
        self.state().as_str()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == BreakerState::Closed
    }

    pub fn is_open(&self) -> bool {
        self.state() == BreakerState::Open
    }

    pub fn is_half_open(&self) -> bool {
        self.state() == BreakerState::HalfOpen
    }

    pub fn name(&self) -> &str {
        &self.context.name
    }

    pub fn config(&self) -> &Config {
        &self.context.config
    }

    /// Copy of the current internals; does not evaluate the open timeout
    pub fn snapshot(&self) -> Snapshot {
        self.core.lock().snapshot()
    }

    fn admit(&self) -> Result<(), Duration> {
        let transition = self.core.lock().admit(&self.context)?;
        self.notify(transition);
        Ok(())
    }

    fn notify(&self, transition: Option<Transition>) {
        if let Some(transition) = transition {
            self.callbacks.trigger(transition, &self.context.name);
        }
    }
}

impl fmt::Debug for Breaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breaker")
            .field("name", &self.context.name)
            .field("config", &self.context.config)
            .field("state", &self.state())
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
