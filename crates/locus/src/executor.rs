//! Action Execution Framework
//!
//! Every element command funnels through [`ActionExecutor::execute`]:
//!
//! ```text
//! find (polling) ──empty──▶ report Failure ──fail_fast?──▶ Err(UserAborted)
//!      │                                   └─────────────▶ Ok(Failed)
//!      ▼ first handle
//! perform ──Ok──────────────▶ report Success ─────────────▶ Ok(Passed)
//!    │ Transient: retry until the budget runs out, then report Failure
//!    │ Verification: report VerificationFailure at once
//!    ▼
//! release_all()  (every exit path)
//! ```
//!
//! Exactly one report is written per invocation, and it is written before
//! an abort is returned. A locator without constraints (failed lookup or
//! malformed name) is never handed to the finder; it is reported as not found.

use crate::constraint::render_constraints;
use crate::driver::{DriverError, ElementHandle, UiDriver};
use crate::finder::{ElementFinder, RetryPolicy, Sleeper, ThreadSleeper};
use crate::locator::Locator;
use crate::reporter::{ReportLevel, ReportSink, StepReport};
use crate::result::{LocusError, UserAborted};
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Why a single action attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFailure {
    /// Element was not ready; the attempt is retried
    Transient(String),
    /// Element answered but the check did not hold; reported at once
    Verification(String),
}

impl ActionFailure {
    /// Create a transient failure
    #[must_use]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Create a verification failure
    #[must_use]
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification(message.into())
    }
}

impl From<DriverError> for ActionFailure {
    fn from(err: DriverError) -> Self {
        Self::Transient(err.to_string())
    }
}

/// Non-aborting command result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus<T> {
    /// Command passed with its value
    Passed(T),
    /// Command failed; the message was reported
    Failed(String),
}

impl<T> CommandStatus<T> {
    /// Check if the command passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    /// Check if the command failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Value of a passed command
    #[must_use]
    pub fn passed(self) -> Option<T> {
        match self {
            Self::Passed(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Message of a failed command
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Passed(_) => None,
            Self::Failed(message) => Some(message),
        }
    }

    /// Map the passed value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CommandStatus<U> {
        match self {
            Self::Passed(value) => CommandStatus::Passed(f(value)),
            Self::Failed(message) => CommandStatus::Failed(message),
        }
    }
}

/// Command result: a status, or the fail-fast abort
pub type Outcome<T> = Result<CommandStatus<T>, UserAborted>;

/// Releases every driver handle when dropped
struct ReleaseGuard<'a, D: UiDriver + ?Sized> {
    driver: &'a mut D,
}

impl<'a, D: UiDriver + ?Sized> ReleaseGuard<'a, D> {
    fn new(driver: &'a mut D) -> Self {
        Self { driver }
    }
}

impl<D: UiDriver + ?Sized> Deref for ReleaseGuard<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        &*self.driver
    }
}

impl<D: UiDriver + ?Sized> DerefMut for ReleaseGuard<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut *self.driver
    }
}

impl<D: UiDriver + ?Sized> Drop for ReleaseGuard<'_, D> {
    fn drop(&mut self) {
        self.driver.release_all();
    }
}

fn record_success<T, R: ReportSink>(reporter: &mut R, step: &str, message: &str, value: T) -> Outcome<T> {
    reporter.log(&StepReport::success(step, message));
    Ok(CommandStatus::Passed(value))
}

fn not_found(locator: &Locator) -> LocusError {
    LocusError::NotFound {
        logical_name: locator.logical_name().to_string(),
        constraints: render_constraints(locator.constraints()),
    }
}

fn record_failure<T, R: ReportSink>(
    reporter: &mut R,
    level: ReportLevel,
    step: &str,
    message: String,
    fail_fast: bool,
) -> Outcome<T> {
    reporter.log(&StepReport::new(level, step, message.as_str()));
    if fail_fast {
        tracing::warn!(step, "stopping script on failure");
        return Err(UserAborted::new(step, message));
    }
    Ok(CommandStatus::Failed(message))
}

/// Runs actions against resolved locators with retry, reporting and cleanup
#[derive(Debug)]
pub struct ActionExecutor<D, R, S = ThreadSleeper> {
    driver: D,
    reporter: R,
    finder: ElementFinder<S>,
}

impl<D: UiDriver, R: ReportSink> ActionExecutor<D, R, ThreadSleeper> {
    /// Create an executor that sleeps on the calling thread
    #[must_use]
    pub const fn new(driver: D, reporter: R, policy: RetryPolicy) -> Self {
        Self {
            driver,
            reporter,
            finder: ElementFinder::new(policy),
        }
    }
}

impl<D: UiDriver, R: ReportSink, S: Sleeper> ActionExecutor<D, R, S> {
    /// Create an executor with a custom sleeper
    #[must_use]
    pub const fn with_sleeper(driver: D, reporter: R, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            driver,
            reporter,
            finder: ElementFinder::with_sleeper(policy, sleeper),
        }
    }

    /// Retry policy in use
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        self.finder.policy()
    }

    /// Element finder in use
    #[must_use]
    pub const fn finder(&self) -> &ElementFinder<S> {
        &self.finder
    }

    /// Driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Report sink
    #[must_use]
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Mutable report sink
    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Block for `duration` using the executor's sleeper
    pub fn sleep(&self, duration: Duration) {
        self.finder.sleeper().sleep(duration);
    }

    /// Split into driver and report sink
    pub fn into_parts(self) -> (D, R) {
        (self.driver, self.reporter)
    }

    /// Report a pass and return `value`
    ///
    /// # Errors
    ///
    /// Never; the signature matches the other reporting paths
    pub fn succeed<T>(&mut self, step: &str, message: &str, value: T) -> Outcome<T> {
        record_success(&mut self.reporter, step, message, value)
    }

    /// Report a failure, aborting if `fail_fast`
    ///
    /// # Errors
    ///
    /// Returns [`UserAborted`] after reporting when `fail_fast` is set
    pub fn fail<T>(
        &mut self,
        level: ReportLevel,
        step: &str,
        message: impl Into<String>,
        fail_fast: bool,
    ) -> Outcome<T> {
        record_failure(&mut self.reporter, level, step, message.into(), fail_fast)
    }

    /// Report that `locator` matched nothing, aborting if `fail_fast`
    ///
    /// # Errors
    ///
    /// Returns [`UserAborted`] after reporting when `fail_fast` is set
    pub fn fail_not_found<T>(&mut self, step: &str, locator: &Locator, fail_fast: bool) -> Outcome<T> {
        let message = not_found(locator).to_string();
        record_failure(&mut self.reporter, ReportLevel::Failure, step, message, fail_fast)
    }

    /// Poll for elements without reporting; handles are released afterwards.
    ///
    /// An unresolved locator yields no elements without touching the finder.
    pub fn find_elements(&mut self, locator: &Locator) -> Vec<ElementHandle> {
        let mut guard = ReleaseGuard::new(&mut self.driver);
        if locator.is_unresolved() {
            tracing::debug!(logical_name = locator.logical_name(), "unresolved locator, skipping search");
            return Vec::new();
        }
        self.finder.find(&mut *guard, locator.constraints())
    }

    /// Poll until presence equals `expected`; handles are released afterwards.
    ///
    /// An unresolved locator never satisfies the probe, whatever `expected` is.
    pub fn probe(&mut self, locator: &Locator, expected: bool) -> bool {
        let mut guard = ReleaseGuard::new(&mut self.driver);
        if locator.is_unresolved() {
            tracing::debug!(logical_name = locator.logical_name(), "unresolved locator, skipping probe");
            return false;
        }
        self.finder.probe(&mut *guard, locator.constraints(), expected)
    }

    /// Run the driver directly, releasing handles afterwards
    pub fn with_driver<T>(&mut self, f: impl FnOnce(&mut D) -> T) -> T {
        let mut guard = ReleaseGuard::new(&mut self.driver);
        f(&mut *guard)
    }

    /// Find the element for `locator` and run `perform` against it.
    ///
    /// The success message is `"<step> command passed"`.
    ///
    /// # Errors
    ///
    /// Returns [`UserAborted`] after reporting when the step fails and
    /// `fail_fast` is set
    pub fn execute<T, F>(&mut self, step: &str, locator: &Locator, fail_fast: bool, perform: F) -> Outcome<T>
    where
        F: FnMut(&mut D, &ElementHandle) -> Result<T, ActionFailure>,
    {
        let message = format!("{step} command passed");
        self.execute_with_message(step, &message, locator, fail_fast, perform)
    }

    /// [`execute`](Self::execute) with a custom success message
    ///
    /// # Errors
    ///
    /// Returns [`UserAborted`] after reporting when the step fails and
    /// `fail_fast` is set
    pub fn execute_with_message<T, F>(
        &mut self,
        step: &str,
        success_message: &str,
        locator: &Locator,
        fail_fast: bool,
        mut perform: F,
    ) -> Outcome<T>
    where
        F: FnMut(&mut D, &ElementHandle) -> Result<T, ActionFailure>,
    {
        let Self {
            driver,
            reporter,
            finder,
        } = self;
        let mut guard = ReleaseGuard::new(driver);

        let found = if locator.is_unresolved() {
            tracing::debug!(step, logical_name = locator.logical_name(), "unresolved locator, skipping search");
            None
        } else {
            finder.find(&mut *guard, locator.constraints()).into_iter().next()
        };
        let Some(element) = found else {
            let message = not_found(locator).to_string();
            return record_failure(reporter, ReportLevel::Failure, step, message, fail_fast);
        };

        let attempts = finder.policy().retry_count;
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match perform(&mut *guard, &element) {
                Ok(value) => return record_success(reporter, step, success_message, value),
                Err(ActionFailure::Verification(message)) => {
                    return record_failure(
                        reporter,
                        ReportLevel::VerificationFailure,
                        step,
                        message,
                        fail_fast,
                    );
                }
                Err(ActionFailure::Transient(message)) => {
                    tracing::debug!(step, attempt, error = %message, element = %element, "action attempt failed");
                    last_error = message;
                    if attempt < attempts {
                        finder.pause();
                    }
                }
            }
        }

        let err = LocusError::TransientAction {
            message: format!(
                "Object : {} {} ::: Actual Error : {}",
                locator.logical_name(),
                render_constraints(locator.constraints()),
                last_error
            ),
        };
        record_failure(reporter, ReportLevel::Failure, step, err.to_string(), fail_fast)
    }
}
