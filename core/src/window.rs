//! Fixed-capacity trailing window of call outcomes
//!
//! The window is a ring buffer: each recorded outcome overwrites the slot at
//! the cursor, and the cursor wraps at capacity. Slots that were never written
//! count as successes, so a fresh window reports a failure ratio of zero.

use crate::Outcome;

/// Ring buffer of the most recent `capacity` outcomes
#[derive(Debug, Clone)]
pub struct OutcomeWindow {
    /// `true` marks a failure
    failed: Box<[bool]>,
    /// Next slot to overwrite, always in `[0, capacity)`
    cursor: usize,
}

impl OutcomeWindow {
    /// Create an all-success window
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. `Config::validate` rejects that before a
    /// breaker builds its window.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Outcome window capacity must be greater than 0");
        Self {
            failed: vec![false; capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Overwrite the oldest slot and advance the cursor
    pub fn record(&mut self, outcome: Outcome) {
        self.failed[self.cursor] = outcome == Outcome::Failure;
        self.cursor = (self.cursor + 1) % self.failed.len();
    }

    /// Number of failures currently in the window
    pub fn failures(&self) -> usize {
        self.failed.iter().filter(|&&failed| failed).count()
    }

    /// Failures divided by capacity (not by the number of recorded calls)
    pub fn failure_ratio(&self) -> f64 {
        self.failures() as f64 / self.failed.len() as f64
    }

    pub fn capacity(&self) -> usize {
        self.failed.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forget all history: every slot becomes a success, cursor back to 0
    pub fn reset(&mut self) {
        self.failed.fill(false);
        self.cursor = 0;
    }

    /// Outcomes from oldest to newest
    pub fn outcomes(&self) -> Vec<Outcome> {
        let (newest, oldest) = self.failed.split_at(self.cursor);
        oldest
            .iter()
            .chain(newest)
            .map(|&failed| {
                if failed {
                    Outcome::Failure
                } else {
                    Outcome::Success
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_window_is_all_success() {
        let window = OutcomeWindow::new(4);

        assert_eq!(window.capacity(), 4);
        assert_eq!(window.cursor(), 0);
        assert_eq!(window.failures(), 0);
        assert_eq!(window.failure_ratio(), 0.0);
        assert_eq!(window.outcomes(), vec![Outcome::Success; 4]);
    }

    #[test]
    #[should_panic(expected = "greater than 0")]
    fn test_zero_capacity_panics() {
        OutcomeWindow::new(0);
    }

    #[test]
    fn test_ratio_uses_capacity_as_denominator() {
        let mut window = OutcomeWindow::new(10);

        window.record(Outcome::Failure);
        window.record(Outcome::Failure);

        assert_eq!(window.failures(), 2);
        assert!((window.failure_ratio() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_wraps_and_overwrites_oldest() {
        let mut window = OutcomeWindow::new(3);

        window.record(Outcome::Failure);
        window.record(Outcome::Failure);
        window.record(Outcome::Success);
        assert_eq!(window.cursor(), 0);
        assert_eq!(window.failures(), 2);

        // Overwrites the first failure
        window.record(Outcome::Success);
        assert_eq!(window.cursor(), 1);
        assert_eq!(window.failures(), 1);
        assert_eq!(
            window.outcomes(),
            vec![Outcome::Failure, Outcome::Success, Outcome::Success]
        );
    }

    #[test]
    fn test_reset_clears_history() {
        let mut window = OutcomeWindow::new(4);
        window.record(Outcome::Failure);
        window.record(Outcome::Failure);
        window.record(Outcome::Failure);

        window.reset();

        assert_eq!(window.cursor(), 0);
        assert_eq!(window.failures(), 0);
        assert_eq!(window.outcomes(), vec![Outcome::Success; 4]);
    }

    fn outcome() -> impl Strategy<Value = Outcome> {
        prop_oneof![Just(Outcome::Success), Just(Outcome::Failure)]
    }

    proptest! {
        #[test]
        fn prop_window_holds_most_recent_outcomes(
            capacity in 1usize..16,
            recorded in proptest::collection::vec(outcome(), 0..64),
        ) {
            let mut window = OutcomeWindow::new(capacity);
            for &o in &recorded {
                window.record(o);
            }

            // Unwritten slots are leading successes
            let mut expected = vec![Outcome::Success; capacity.saturating_sub(recorded.len())];
            let keep = recorded.len().min(capacity);
            expected.extend_from_slice(&recorded[recorded.len() - keep..]);

            prop_assert_eq!(window.outcomes(), expected.clone());
            prop_assert_eq!(window.capacity(), capacity);
            prop_assert_eq!(window.cursor(), recorded.len() % capacity);
            prop_assert_eq!(
                window.failures(),
                expected.iter().filter(|&&o| o == Outcome::Failure).count()
            );
        }
    }
}
