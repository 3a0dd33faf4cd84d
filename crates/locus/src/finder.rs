//! Retry-Driven Element Finder
//!
//! Polls the driver for elements matching a constraint set, bounded by a
//! retry count and a fixed interval.
//!
//! ## Polling rules
//!
//! Each attempt calls [`UiDriver::find_descendants`] exactly once:
//!
//! | Driver answer | Effect                                    |
//! |---------------|-------------------------------------------|
//! | non-empty     | returned immediately                      |
//! | empty         | sleep `retry_interval`, consume one retry |
//! | error         | logged, consume one retry, no sleep       |
//!
//! Running out of retries yields an empty vector. The finder never fails.

use crate::constraint::Constraint;
use crate::driver::{ElementHandle, UiDriver};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of attempts per find
pub const DEFAULT_RETRY_COUNT: u32 = 12;

/// Default pause between attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1000);

/// Retry budget shared by element discovery and action attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts
    pub retry_count: u32,
    /// Pause after an attempt that found nothing
    pub retry_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(retry_count: u32, retry_interval: Duration) -> Self {
        Self {
            retry_count,
            retry_interval,
        }
    }

    /// Set the retry count
    #[must_use]
    pub const fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the retry interval
    #[must_use]
    pub const fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Worst-case time spent sleeping by one find
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.retry_interval * self.retry_count
    }
}

/// Blocking pause between attempts
pub trait Sleeper {
    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Polls a driver until elements appear or the retry budget runs out
#[derive(Debug, Clone, Default)]
pub struct ElementFinder<S = ThreadSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl ElementFinder<ThreadSleeper> {
    /// Create a finder that sleeps on the calling thread
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: Sleeper> ElementFinder<S> {
    /// Create a finder with a custom sleeper
    #[must_use]
    pub const fn with_sleeper(policy: RetryPolicy, sleeper: S) -> Self {
        Self { policy, sleeper }
    }

    /// Retry policy in use
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Sleeper in use
    #[must_use]
    pub const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Pause for one retry interval
    pub fn pause(&self) {
        self.sleeper.sleep(self.policy.retry_interval);
    }

    /// Find elements matching `constraints`, polling per the retry policy
    pub fn find<D: UiDriver + ?Sized>(
        &self,
        driver: &mut D,
        constraints: &[Constraint],
    ) -> Vec<ElementHandle> {
        for attempt in 1..=self.policy.retry_count {
            match driver.find_descendants(constraints) {
                Ok(found) if !found.is_empty() => {
                    tracing::debug!(attempt, matches = found.len(), "element found");
                    return found;
                }
                Ok(_) => {
                    tracing::debug!(attempt, "no element matched, waiting");
                    self.pause();
                }
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "driver error while finding element");
                }
            }
        }
        Vec::new()
    }

    /// Number of matching elements after polling
    pub fn count<D: UiDriver + ?Sized>(&self, driver: &mut D, constraints: &[Constraint]) -> usize {
        self.find(driver, constraints).len()
    }

    /// Poll until element presence equals `expected`.
    ///
    /// Uses the same budget and error rules as [`find`](Self::find); a
    /// mismatch is treated like an empty answer.
    pub fn probe<D: UiDriver + ?Sized>(
        &self,
        driver: &mut D,
        constraints: &[Constraint],
        expected: bool,
    ) -> bool {
        for attempt in 1..=self.policy.retry_count {
            match driver.find_descendants(constraints) {
                Ok(found) if found.is_empty() != expected => return true,
                Ok(found) => {
                    tracing::debug!(attempt, present = !found.is_empty(), expected, "presence mismatch, waiting");
                    self.pause();
                }
                Err(err) => {
                    tracing::debug!(attempt, error = %err, "driver error while probing element");
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverError;
    use crate::mock::{RecordingSleeper, ScriptedDriver};

    fn constraints() -> Vec<Constraint> {
        vec![Constraint::new(".id", "user")]
    }

    fn finder(count: u32) -> (ElementFinder<RecordingSleeper>, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::new(count, Duration::from_millis(250));
        (ElementFinder::with_sleeper(policy, sleeper.clone()), sleeper)
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let p = RetryPolicy::default();
            assert_eq!(p.retry_count, 12);
            assert_eq!(p.retry_interval, Duration::from_millis(1000));
        }

        #[test]
        fn test_builders() {
            let p = RetryPolicy::default()
                .with_retry_count(3)
                .with_retry_interval(Duration::from_millis(10));
            assert_eq!(p, RetryPolicy::new(3, Duration::from_millis(10)));
            assert_eq!(p.max_wait(), Duration::from_millis(30));
        }
    }

    mod find_tests {
        use super::*;

        #[test]
        fn test_found_first_attempt() {
            let (finder, sleeper) = finder(5);
            let mut driver = ScriptedDriver::new().then_found(1);
            let found = finder.find(&mut driver, &constraints());
            assert_eq!(found.len(), 1);
            assert_eq!(driver.find_calls(), 1);
            assert_eq!(sleeper.count(), 0);
        }

        #[test]
        fn test_empty_k_times_then_found() {
            let (finder, sleeper) = finder(12);
            let mut driver = ScriptedDriver::new()
                .then_empty()
                .then_empty()
                .then_empty()
                .then_found(2);
            let found = finder.find(&mut driver, &constraints());
            assert_eq!(found.len(), 2);
            assert_eq!(driver.find_calls(), 4);
            assert_eq!(sleeper.count(), 3);
            assert!(sleeper.durations().iter().all(|d| *d == Duration::from_millis(250)));
        }

        #[test]
        fn test_always_empty_exhausts_budget() {
            let (finder, sleeper) = finder(12);
            let mut driver = ScriptedDriver::new();
            let found = finder.find(&mut driver, &constraints());
            assert!(found.is_empty());
            assert_eq!(driver.find_calls(), 12);
            assert_eq!(sleeper.count(), 12);
        }

        #[test]
        fn test_driver_error_consumes_retry_without_sleep() {
            let (finder, sleeper) = finder(4);
            let mut driver = ScriptedDriver::new()
                .then_find_error(DriverError::other("tree busy"))
                .then_find_error(DriverError::other("tree busy"))
                .then_found(1);
            let found = finder.find(&mut driver, &constraints());
            assert_eq!(found.len(), 1);
            assert_eq!(driver.find_calls(), 3);
            assert_eq!(sleeper.count(), 0);
        }

        #[test]
        fn test_errors_only_return_empty() {
            let (finder, sleeper) = finder(3);
            let mut driver = ScriptedDriver::new().always_fail_find(DriverError::other("down"));
            assert!(finder.find(&mut driver, &constraints()).is_empty());
            assert_eq!(driver.find_calls(), 3);
            assert_eq!(sleeper.count(), 0);
        }

        #[test]
        fn test_zero_budget_never_calls_driver() {
            let (finder, _) = finder(0);
            let mut driver = ScriptedDriver::new().then_found(1);
            assert!(finder.find(&mut driver, &constraints()).is_empty());
            assert_eq!(driver.find_calls(), 0);
        }

        #[test]
        fn test_constraints_forwarded() {
            let (finder, _) = finder(1);
            let mut driver = ScriptedDriver::new().then_found(1);
            let _ = finder.find(&mut driver, &constraints());
            assert_eq!(driver.last_constraints(), Some(constraints().as_slice()));
        }

        #[test]
        fn test_count() {
            let (finder, _) = finder(2);
            let mut driver = ScriptedDriver::new().then_empty().then_found(3);
            assert_eq!(finder.count(&mut driver, &constraints()), 3);
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_probe_present() {
            let (finder, sleeper) = finder(5);
            let mut driver = ScriptedDriver::new().then_found(1);
            assert!(finder.probe(&mut driver, &constraints(), true));
            assert_eq!(sleeper.count(), 0);
        }

        #[test]
        fn test_probe_absent() {
            let (finder, _) = finder(5);
            let mut driver = ScriptedDriver::new();
            assert!(finder.probe(&mut driver, &constraints(), false));
            assert_eq!(driver.find_calls(), 1);
        }

        #[test]
        fn test_probe_waits_for_disappearance() {
            let (finder, sleeper) = finder(5);
            let mut driver = ScriptedDriver::new().then_found(1).then_found(1).then_empty();
            assert!(finder.probe(&mut driver, &constraints(), false));
            assert_eq!(driver.find_calls(), 3);
            assert_eq!(sleeper.count(), 2);
        }

        #[test]
        fn test_probe_mismatch_exhausts() {
            let (finder, _) = finder(4);
            let mut driver = ScriptedDriver::new();
            assert!(!finder.probe(&mut driver, &constraints(), true));
            assert_eq!(driver.find_calls(), 4);
        }
    }
}
