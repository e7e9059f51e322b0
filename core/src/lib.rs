//! ratio-breaker - circuit breaker over a fixed trailing window of calls
//!
//! This crate provides a circuit breaker that:
//! - Tracks the last `record_length` call outcomes in a ring buffer
//! - Opens when the failure ratio of that window reaches a threshold
//! - Rejects calls while open, then probes after a fixed timeout
//! - Closes again after more than `recovery_threshold` successful probes in a row
//! - Measures time monotonically, immune to wall-clock jumps
//!
//! # Example
//!
//! ```rust
//! use ratio_breaker::{Breaker, BreakerError};
//! use std::time::Duration;
//!
//! let breaker = Breaker::builder("payment_api")
//!     .record_length(10)
//!     .failure_ratio(0.5)
//!     .open_timeout(Duration::from_secs(30))
//!     .recovery_threshold(2)
//!     .on_open(|name| println!("Breaker {} opened!", name))
//!     .build()
//!     .expect("valid configuration");
//!
//! // Execute with breaker protection
//! match breaker.call(|| Ok::<_, String>("charged")) {
//!     Ok(receipt) => println!("{}", receipt),
//!     Err(BreakerError::Rejected { .. }) => println!("skipped, dependency presumed down"),
//!     Err(BreakerError::Execution(e)) => println!("call failed: {}", e),
//! }
//!
//! assert!(breaker.is_closed());
//! ```

pub mod breaker;
pub mod builder;
pub mod callbacks;
pub mod clock;
pub mod config;
pub mod errors;
mod machine;
pub mod window;

pub use breaker::{Breaker, BreakerState, FallbackContext, Snapshot};
pub use builder::BreakerBuilder;
pub use callbacks::Transition;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::Config;
pub use errors::{BreakerError, ConfigError};
pub use window::OutcomeWindow;

/// Result of one guarded call, as seen by the outcome window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}
