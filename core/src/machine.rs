//! Breaker lifecycle as a declarative state machine
//!
//! Closed → Open is decided by the owner of the outcome window, so `trip`
//! carries no guard here. The two time/count driven transitions are guarded:
//! `probe` waits out the open timeout and `recover` waits for enough
//! consecutive successful probes.

use crate::clock::{Clock, MonotonicClock};
use crate::config::Config;
use state_machines::state_machine;
use std::sync::Arc;
use std::time::Duration;

/// Shared data visible to every state's guards
#[derive(Clone)]
pub struct BreakerContext {
    pub name: String,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
}

impl Default for BreakerContext {
    fn default() -> Self {
        Self {
            name: String::new(),
            config: Config::default(),
            clock: Arc::new(MonotonicClock::new()),
        }
    }
}

impl std::fmt::Debug for BreakerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerContext")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

/// Data specific to the Open state
#[derive(Debug, Clone, Default)]
pub struct OpenData {
    /// Clock reading when the breaker last opened
    pub opened_at: Duration,
}

/// Data specific to the HalfOpen state
#[derive(Debug, Clone, Default)]
pub struct HalfOpenData {
    pub consecutive_successes: usize,
}

state_machine! {
    name: Circuit,
    context: BreakerContext,
    dynamic: true,

    initial: Closed,
    states: [
        Closed,
        Open(OpenData),
        HalfOpen(HalfOpenData),
    ],
    events {
        trip {
            transition: { from: [Closed, HalfOpen], to: Open }
        }
        probe {
            guards: [open_timeout_elapsed],
            transition: { from: Open, to: HalfOpen }
        }
        recover {
            guards: [recovered],
            transition: { from: HalfOpen, to: Closed }
        }
    }
}

impl Circuit<Open> {
    /// Strictly more than `open_timeout` has passed since opening
    fn open_timeout_elapsed(&self, ctx: &BreakerContext) -> bool {
        self.state_data_open().is_some_and(|data| {
            ctx.clock.now().saturating_sub(data.opened_at) > ctx.config.open_timeout
        })
    }
}

impl Circuit<HalfOpen> {
    /// Strictly more than `recovery_threshold` consecutive successes
    fn recovered(&self, ctx: &BreakerContext) -> bool {
        self.state_data_half_open()
            .is_some_and(|data| data.consecutive_successes > ctx.config.recovery_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn context(clock: Arc<ManualClock>) -> BreakerContext {
        BreakerContext {
            name: "test_breaker".to_string(),
            config: Config {
                record_length: 4,
                open_timeout: Duration::from_secs(2),
                failure_ratio_threshold: 0.5,
                recovery_threshold: 1,
            },
            clock,
        }
    }

    fn opened(clock: &Arc<ManualClock>) -> DynamicCircuit {
        let mut machine = DynamicCircuit::new(context(clock.clone()));
        machine.handle(CircuitEvent::Trip).expect("Should open");
        if let Some(data) = machine.open_data_mut() {
            data.opened_at = clock.now();
        }
        machine
    }

    #[test]
    fn test_starts_closed() {
        let machine = DynamicCircuit::new(context(Arc::new(ManualClock::new())));
        assert_eq!(machine.current_state(), "Closed");
    }

    #[test]
    fn test_trip_from_closed_is_unconditional() {
        let clock = Arc::new(ManualClock::new());
        let machine = opened(&clock);
        assert_eq!(machine.current_state(), "Open");
    }

    #[test]
    fn test_probe_waits_strictly_past_timeout() {
        let clock = Arc::new(ManualClock::new());
        let mut machine = opened(&clock);

        clock.advance(Duration::from_secs(2));
        let result = machine.handle(CircuitEvent::Probe);
        assert!(result.is_err(), "Exactly the timeout is not enough");
        assert_eq!(machine.current_state(), "Open");

        clock.advance(Duration::from_millis(1));
        machine
            .handle(CircuitEvent::Probe)
            .expect("Should probe after timeout");
        assert_eq!(machine.current_state(), "HalfOpen");

        let data = machine.half_open_data().expect("Should have HalfOpen data");
        assert_eq!(data.consecutive_successes, 0);
    }

    #[test]
    fn test_recover_requires_more_than_threshold() {
        let clock = Arc::new(ManualClock::new());
        let mut machine = opened(&clock);
        clock.advance(Duration::from_secs(3));
        machine.handle(CircuitEvent::Probe).expect("Should probe");

        if let Some(data) = machine.half_open_data_mut() {
            data.consecutive_successes = 1;
        }
        assert!(machine.handle(CircuitEvent::Recover).is_err());
        assert_eq!(machine.current_state(), "HalfOpen");

        if let Some(data) = machine.half_open_data_mut() {
            data.consecutive_successes = 2;
        }
        machine
            .handle(CircuitEvent::Recover)
            .expect("Should close after threshold + 1 successes");
        assert_eq!(machine.current_state(), "Closed");
    }

    #[test]
    fn test_trip_from_half_open() {
        let clock = Arc::new(ManualClock::new());
        let mut machine = opened(&clock);
        clock.advance(Duration::from_secs(3));
        machine.handle(CircuitEvent::Probe).expect("Should probe");

        machine.handle(CircuitEvent::Trip).expect("Should reopen");
        assert_eq!(machine.current_state(), "Open");
        assert!(machine.open_data().is_some());
    }

    #[test]
    fn test_closed_cannot_probe_or_recover() {
        let mut machine = DynamicCircuit::new(context(Arc::new(ManualClock::new())));
        assert!(machine.handle(CircuitEvent::Probe).is_err());
        assert!(machine.handle(CircuitEvent::Recover).is_err());
        assert_eq!(machine.current_state(), "Closed");
    }
}
