use crate::constraint::Constraint;
use crate::driver::{Action, ActionOutput, DriverError, ElementHandle, UiDriver};
use crate::finder::Sleeper;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

type FindAnswer = Result<Vec<ElementHandle>, DriverError>;
type PerformAnswer = Result<ActionOutput, DriverError>;

/// Driver that replays scripted answers.
///
/// Queued answers are consumed in order; once a queue is empty the fallback
/// answer is repeated. The default fallbacks are "no element" for finds and
/// [`ActionOutput::Done`] for actions.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    find_script: VecDeque<FindAnswer>,
    find_fallback: FindAnswer,
    perform_script: VecDeque<PerformAnswer>,
    perform_fallback: PerformAnswer,
    browser_answer: Result<(), DriverError>,
    find_calls: usize,
    last_constraints: Option<Vec<Constraint>>,
    performed: Vec<(ElementHandle, Action)>,
    release_calls: usize,
    browsers: Vec<(String, String)>,
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDriver {
    /// Driver that never finds anything
    #[must_use]
    pub fn new() -> Self {
        Self {
            find_script: VecDeque::new(),
            find_fallback: Ok(Vec::new()),
            perform_script: VecDeque::new(),
            perform_fallback: Ok(ActionOutput::Done),
            browser_answer: Ok(()),
            find_calls: 0,
            last_constraints: None,
            performed: Vec::new(),
            release_calls: 0,
            browsers: Vec::new(),
        }
    }

    /// `n` numbered handles (`el0`, `el1`, ...)
    #[must_use]
    pub fn handles(n: usize) -> Vec<ElementHandle> {
        (0..n).map(|i| ElementHandle::new(format!("el{i}"))).collect()
    }

    /// Queue one find answer
    #[must_use]
    pub fn then_find(mut self, answer: FindAnswer) -> Self {
        self.find_script.push_back(answer);
        self
    }

    /// Queue a find that returns `n` handles
    #[must_use]
    pub fn then_found(self, n: usize) -> Self {
        self.then_find(Ok(Self::handles(n)))
    }

    /// Queue a find that returns nothing
    #[must_use]
    pub fn then_empty(self) -> Self {
        self.then_find(Ok(Vec::new()))
    }

    /// Queue a failing find
    #[must_use]
    pub fn then_find_error(self, error: DriverError) -> Self {
        self.then_find(Err(error))
    }

    /// Every unscripted find returns `n` handles
    #[must_use]
    pub fn always_found(mut self, n: usize) -> Self {
        self.find_fallback = Ok(Self::handles(n));
        self
    }

    /// Every unscripted find fails
    #[must_use]
    pub fn always_fail_find(mut self, error: DriverError) -> Self {
        self.find_fallback = Err(error);
        self
    }

    /// Queue one action answer
    #[must_use]
    pub fn then_perform(mut self, answer: PerformAnswer) -> Self {
        self.perform_script.push_back(answer);
        self
    }

    /// Queue a failing action
    #[must_use]
    pub fn then_perform_error(self, error: DriverError) -> Self {
        self.then_perform(Err(error))
    }

    /// Every unscripted action returns `output`
    #[must_use]
    pub fn always_perform(mut self, output: ActionOutput) -> Self {
        self.perform_fallback = Ok(output);
        self
    }

    /// Every unscripted action fails
    #[must_use]
    pub fn always_fail_perform(mut self, error: DriverError) -> Self {
        self.perform_fallback = Err(error);
        self
    }

    /// Make `start_browser` fail
    #[must_use]
    pub fn fail_browser_start(mut self, error: DriverError) -> Self {
        self.browser_answer = Err(error);
        self
    }

    /// Number of `find_descendants` calls
    #[must_use]
    pub const fn find_calls(&self) -> usize {
        self.find_calls
    }

    /// Constraints passed to the most recent find
    #[must_use]
    pub fn last_constraints(&self) -> Option<&[Constraint]> {
        self.last_constraints.as_deref()
    }

    /// Every action performed, in order
    #[must_use]
    pub fn performed(&self) -> &[(ElementHandle, Action)] {
        &self.performed
    }

    /// Number of `perform` calls
    #[must_use]
    pub fn perform_calls(&self) -> usize {
        self.performed.len()
    }

    /// Number of `release_all` calls
    #[must_use]
    pub const fn release_calls(&self) -> usize {
        self.release_calls
    }

    /// Browsers started, as `(browser, url)`
    #[must_use]
    pub fn browsers(&self) -> &[(String, String)] {
        &self.browsers
    }
}

impl UiDriver for ScriptedDriver {
    fn find_descendants(&mut self, constraints: &[Constraint]) -> Result<Vec<ElementHandle>, DriverError> {
        self.find_calls += 1;
        self.last_constraints = Some(constraints.to_vec());
        self.find_script
            .pop_front()
            .unwrap_or_else(|| self.find_fallback.clone())
    }

    fn perform(&mut self, element: &ElementHandle, action: &Action) -> Result<ActionOutput, DriverError> {
        self.performed.push((element.clone(), action.clone()));
        self.perform_script
            .pop_front()
            .unwrap_or_else(|| self.perform_fallback.clone())
    }

    fn release_all(&mut self) {
        self.release_calls += 1;
    }

    fn start_browser(&mut self, browser: &str, url: &str) -> Result<(), DriverError> {
        self.browsers.push((browser.to_string(), url.to_string()));
        self.browser_answer.clone()
    }
}

/// Sleeper that records requested durations instead of blocking.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to a finder or executor.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    log: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sleeps requested
    #[must_use]
    pub fn count(&self) -> usize {
        self.log.borrow().len()
    }

    /// Requested durations, in order
    #[must_use]
    pub fn durations(&self) -> Vec<Duration> {
        self.log.borrow().clone()
    }

    /// Sum of requested durations
    #[must_use]
    pub fn total(&self) -> Duration {
        self.log.borrow().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.log.borrow_mut().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_then_fallback() {
        let mut d = ScriptedDriver::new().then_found(2).always_found(1);
        assert_eq!(d.find_descendants(&[]).map(|v| v.len()), Ok(2));
        assert_eq!(d.find_descendants(&[]).map(|v| v.len()), Ok(1));
        assert_eq!(d.find_descendants(&[]).map(|v| v.len()), Ok(1));
        assert_eq!(d.find_calls(), 3);
    }

    #[test]
    fn test_perform_log() {
        let mut d = ScriptedDriver::new()
            .then_perform_error(DriverError::other("busy"))
            .always_perform(ActionOutput::Text("ok".into()));
        let el = ElementHandle::new("x");
        assert!(d.perform(&el, &Action::Click).is_err());
        assert_eq!(d.perform(&el, &Action::ReadText), Ok(ActionOutput::Text("ok".into())));
        assert_eq!(d.perform_calls(), 2);
        assert_eq!(d.performed()[1].1, Action::ReadText);
    }

    #[test]
    fn test_release_counted() {
        let mut d = ScriptedDriver::new();
        d.release_all();
        d.release_all();
        assert_eq!(d.release_calls(), 2);
    }

    #[test]
    fn test_browser_start_recorded() {
        let mut d = ScriptedDriver::new();
        assert!(d.start_browser("firefox", "http://a").is_ok());
        assert_eq!(d.browsers(), &[("firefox".to_string(), "http://a".to_string())]);
    }

    #[test]
    fn test_recording_sleeper_shared_log() {
        let s = RecordingSleeper::new();
        let clone = s.clone();
        clone.sleep(Duration::from_millis(5));
        clone.sleep(Duration::from_millis(7));
        assert_eq!(s.count(), 2);
        assert_eq!(s.total(), Duration::from_millis(12));
    }
}
