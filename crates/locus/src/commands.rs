//! Keyword commands
//!
//! [`CommandBase`] maps each script keyword onto the action executor. Every
//! command resolves its logical name, runs one polling find plus action, and
//! writes exactly one report line.
//!
//! ```text
//! click("login.submit", "")
//!    │
//!    ▼
//! LocatorResolver ──▶ Locator ──▶ ActionExecutor::execute ──▶ Reporter
//! ```

use crate::config::ExecutorConfig;
use crate::constraint::{render_constraints, Constraint};
use crate::datastore::{JsonFileStore, MemoryScratchStore, ScratchStore, ValueType};
use crate::driver::{Action, ActionOutput, ElementHandle, UiDriver};
use crate::executor::{ActionExecutor, ActionFailure, Outcome};
use crate::finder::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::locator::{Locator, LocatorResolver};
use crate::pattern::TextPattern;
use crate::reporter::{ReportLevel, ReportSink, Reporter};
use crate::result::LocusResult;
use crate::store::{FileStore, LocatorStore};
use crate::table::TableValidation;
use std::time::Duration;

/// Class of the browser element used by navigation commands
pub const BROWSER_CLASS: &str = "Html.HtmlBrowser";

/// Property checked by `check_object_property`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyCheck {
    /// Element presence against `"true"` or `"false"`
    ElementPresent,
    /// Presence of a named property (not supported)
    PropertyPresent,
    /// Value of a named property
    Value(String),
}

impl PropertyCheck {
    /// Classify a property name; the two keywords match case-insensitively
    #[must_use]
    pub fn parse(property: &str) -> Self {
        if property.eq_ignore_ascii_case("ELEMENTPRESENT") {
            Self::ElementPresent
        } else if property.eq_ignore_ascii_case("PROPERTYPRESENT") {
            Self::PropertyPresent
        } else {
            Self::Value(property.to_string())
        }
    }
}

/// Parse `"x,y"` into coordinates
fn parse_coordinates(coordinates: &str) -> Option<(i32, i32)> {
    let mut parts = coordinates.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    Some((x, y))
}

/// Parse a wait time given in milliseconds
fn parse_wait(wait_ms: &str) -> Option<Duration> {
    let ms: f64 = wait_ms.trim().parse().ok()?;
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    Some(Duration::from_nanos((ms * 1_000_000.0).round() as u64))
}

fn browser_locator() -> Locator {
    Locator::from_constraints("browser", vec![Constraint::new(".class", BROWSER_CLASS)])
}

fn read_output<T>(
    driver: &mut impl UiDriver,
    element: &ElementHandle,
    action: &Action,
    extract: impl FnOnce(ActionOutput) -> Option<T>,
) -> Result<T, ActionFailure> {
    let output = driver.perform(element, action)?;
    extract(output).ok_or_else(|| {
        ActionFailure::transient(format!("{element} returned no value for {}", action.name()))
    })
}

fn choose_option(options: &[String], wanted: &str) -> Result<String, ActionFailure> {
    let index = wanted
        .get(..6)
        .filter(|p| p.eq_ignore_ascii_case("index="))
        .map(|_| &wanted[6..]);

    if let Some(index) = index {
        return match index.trim().parse::<usize>() {
            Ok(i) if i > 0 && i < options.len() => Ok(options[i].clone()),
            _ => Err(ActionFailure::verification(format!(
                "Cannot find index {index} in the actual select element. Actual options : {options:?}"
            ))),
        };
    }

    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(wanted))
        .cloned()
        .ok_or_else(|| {
            ActionFailure::verification(format!(
                "Cannot find the option : {wanted} in the actual select element. Actual options : {options:?}"
            ))
        })
}

/// Keyword command layer over one driver, locator store and scratch store
#[derive(Debug)]
pub struct CommandBase<D, S, K = MemoryScratchStore, R = Reporter, Z = ThreadSleeper> {
    executor: ActionExecutor<D, R, Z>,
    resolver: LocatorResolver<S>,
    scratch: K,
    browser: String,
}

impl<D: UiDriver, S: LocatorStore> CommandBase<D, S> {
    /// Commands with an in-memory scratch store and a fresh [`Reporter`]
    #[must_use]
    pub fn new(driver: D, store: S, policy: RetryPolicy) -> Self {
        Self::from_parts(
            ActionExecutor::new(driver, Reporter::new(), policy),
            LocatorResolver::new(store),
            MemoryScratchStore::new(),
        )
    }
}

impl<D: UiDriver> CommandBase<D, FileStore, JsonFileStore> {
    /// Commands wired from configuration: page files, JSON scratch store
    #[must_use]
    pub fn from_config(driver: D, config: &ExecutorConfig) -> Self {
        Self::from_parts(
            ActionExecutor::new(driver, Reporter::new(), config.retry_policy()),
            LocatorResolver::new(FileStore::new(&config.pages_dir, config.page_format)),
            JsonFileStore::new(&config.data_store_path),
        )
        .with_browser(config.browser.clone())
    }
}

impl<D, S, K, R, Z> CommandBase<D, S, K, R, Z>
where
    D: UiDriver,
    S: LocatorStore,
    K: ScratchStore,
    R: ReportSink,
    Z: Sleeper,
{
    /// Assemble from an executor, resolver and scratch store
    #[must_use]
    pub fn from_parts(executor: ActionExecutor<D, R, Z>, resolver: LocatorResolver<S>, scratch: K) -> Self {
        Self {
            executor,
            resolver,
            scratch,
            browser: ExecutorConfig::default().browser,
        }
    }

    /// Browser launched by [`open`](Self::open)
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Browser launched by [`open`](Self::open)
    #[must_use]
    pub fn browser(&self) -> &str {
        &self.browser
    }

    /// Executor
    #[must_use]
    pub const fn executor(&self) -> &ActionExecutor<D, R, Z> {
        &self.executor
    }

    /// Mutable executor
    pub fn executor_mut(&mut self) -> &mut ActionExecutor<D, R, Z> {
        &mut self.executor
    }

    /// Resolver
    #[must_use]
    pub const fn resolver(&self) -> &LocatorResolver<S> {
        &self.resolver
    }

    /// Scratch store
    #[must_use]
    pub const fn scratch(&self) -> &K {
        &self.scratch
    }

    /// Driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        self.executor.driver()
    }

    /// Report sink
    #[must_use]
    pub const fn reporter(&self) -> &R {
        self.executor.reporter()
    }

    /// Resolve a logical name (see [`LocatorResolver::resolve`])
    #[must_use]
    pub fn resolve(&self, logical_name: &str, identifier: &str) -> Locator {
        self.resolver.resolve(logical_name, identifier)
    }

    fn perform_simple(&mut self, step: &str, logical_name: &str, identifier: &str, action: Action) -> Outcome<()> {
        let locator = self.resolve(logical_name, identifier);
        self.executor.execute(step, &locator, true, |driver, element| {
            driver.perform(element, &action)?;
            Ok(())
        })
    }

    /// Click an element
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the click fails
    pub fn click(&mut self, logical_name: &str, identifier: &str) -> Outcome<()> {
        self.perform_simple("Click", logical_name, identifier, Action::Click)
    }

    /// Double click an element
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the double click fails
    pub fn double_click(&mut self, logical_name: &str, identifier: &str) -> Outcome<()> {
        self.perform_simple("Double Click", logical_name, identifier, Action::DoubleClick)
    }

    /// Move the pointer over an element
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the hover fails
    pub fn mouse_over(&mut self, logical_name: &str, identifier: &str) -> Outcome<()> {
        self.perform_simple("Mouse Over", logical_name, identifier, Action::Hover)
    }

    /// Click at `"x,y"` relative to an element
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the coordinates are invalid or the click fails
    pub fn click_at(&mut self, logical_name: &str, identifier: &str, coordinates: &str) -> Outcome<()> {
        self.click_at_with("Click At", logical_name, identifier, coordinates, false)
    }

    /// Double click at `"x,y"` relative to an element
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the coordinates are invalid or the click fails
    pub fn double_click_at(&mut self, logical_name: &str, identifier: &str, coordinates: &str) -> Outcome<()> {
        self.click_at_with("Double Click At", logical_name, identifier, coordinates, true)
    }

    fn click_at_with(
        &mut self,
        step: &str,
        logical_name: &str,
        identifier: &str,
        coordinates: &str,
        double: bool,
    ) -> Outcome<()> {
        let locator = self.resolve(logical_name, identifier);
        let Some((x, y)) = parse_coordinates(coordinates) else {
            let message = format!(
                "Cannot parse the coordinates {coordinates} for the command. ::: Object : {locator}"
            );
            return self.executor.fail(ReportLevel::Failure, step, message, true);
        };
        let action = if double {
            Action::DoubleClickAt { x, y }
        } else {
            Action::ClickAt { x, y }
        };
        self.executor.execute(step, &locator, true, |driver, element| {
            driver.perform(element, &action)?;
            Ok(())
        })
    }

    /// Replace an element's text with `value`
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if typing fails
    pub fn type_text(&mut self, logical_name: &str, identifier: &str, value: &str) -> Outcome<()> {
        let locator = self.resolve(logical_name, identifier);
        let message = format!("Type command passed. Input value : {value}");
        let action = Action::SetText(value.to_string());
        self.executor
            .execute_with_message("Type", &message, &locator, true, |driver, element| {
                driver.perform(element, &action)?;
                Ok(())
            })
    }

    /// Send `|`-separated key tokens to an element
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the key press fails
    pub fn key_press(&mut self, logical_name: &str, identifier: &str, keys: &str) -> Outcome<()> {
        let tokens = keys
            .split('|')
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        self.perform_simple("Key Press", logical_name, identifier, Action::KeyPress(tokens))
    }

    /// Select an option by text (case-insensitive) or by `index=N`.
    ///
    /// Returns the text of the option that was selected.
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the option is missing or selection fails
    pub fn select(&mut self, logical_name: &str, identifier: &str, option: &str) -> Outcome<String> {
        let locator = self.resolve(logical_name, identifier);
        let message = format!("Select command passed. Input value : {option}");
        self.executor
            .execute_with_message("Select", &message, &locator, true, |driver, element| {
                let options: Vec<String> = read_output(driver, element, &Action::ReadOptions, ActionOutput::into_options)?
                    .into_iter()
                    .filter(|o| !o.is_empty())
                    .collect();
                let chosen = choose_option(&options, option)?;
                driver.perform(element, &Action::Select(chosen.clone()))?;
                Ok(chosen)
            })
    }

    /// Report whether an element appears within the retry budget
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the element is absent and `fail_fast` is set
    pub fn check_element_present(&mut self, logical_name: &str, identifier: &str, fail_fast: bool) -> Outcome<bool> {
        let step = "Check Element Present";
        let locator = self.resolve(logical_name, identifier);
        if self.executor.find_elements(&locator).is_empty() {
            if locator.is_unresolved() {
                return self.executor.fail_not_found(step, &locator, fail_fast);
            }
            let message = format!(
                "Element not present. ::: Object : {logical_name} {}",
                render_constraints(locator.constraints())
            );
            return self.executor.fail(ReportLevel::Failure, step, message, fail_fast);
        }
        self.executor.succeed(step, "Check Element Present command passed", true)
    }

    /// Query presence without reporting
    pub fn is_element_present(&mut self, logical_name: &str, identifier: &str) -> bool {
        let locator = self.resolve(logical_name, identifier);
        !self.executor.find_elements(&locator).is_empty()
    }

    /// Check a property of an element against `expected`
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the check fails and `fail_fast` is set
    pub fn check_object_property(
        &mut self,
        logical_name: &str,
        identifier: &str,
        property: &str,
        expected: &str,
        fail_fast: bool,
    ) -> Outcome<()> {
        let step = "Check Object Property";
        let locator = self.resolve(logical_name, identifier);

        match PropertyCheck::parse(property) {
            PropertyCheck::ElementPresent => {
                let wanted = match expected.trim() {
                    e if e.eq_ignore_ascii_case("true") => true,
                    e if e.eq_ignore_ascii_case("false") => false,
                    _ => {
                        let message = format!(
                            "Invalid expected value {expected} for ELEMENTPRESENT, use true or false. ::: Object : {locator}"
                        );
                        return self.executor.fail(ReportLevel::Failure, step, message, fail_fast);
                    }
                };
                let satisfied = self.executor.probe(&locator, wanted);
                if locator.is_unresolved() {
                    return self.executor.fail_not_found(step, &locator, fail_fast);
                }
                if satisfied {
                    self.executor.succeed(step, "Check Object Property ELEMENTPRESENT command passed", ())
                } else {
                    let message = format!(
                        "Actual property ELEMENTPRESENT condition : {} does not match the expected condition : {expected}. ::: Object : {locator}",
                        !wanted
                    );
                    self.executor.fail(ReportLevel::Failure, step, message, fail_fast)
                }
            }
            PropertyCheck::PropertyPresent => {
                let message = format!("PROPERTYPRESENT check is not implemented. ::: Object : {locator}");
                self.executor.fail(ReportLevel::Failure, step, message, fail_fast)
            }
            PropertyCheck::Value(name) => {
                let action = Action::ReadProperty(name.clone());
                self.executor.execute(step, &locator, fail_fast, |driver, element| {
                    let actual = read_output(driver, element, &action, ActionOutput::into_text)?;
                    if actual == expected {
                        Ok(())
                    } else {
                        Err(ActionFailure::verification(format!(
                            "Actual property {name} value : {actual} does not match the expected value : {expected}"
                        )))
                    }
                })
            }
        }
    }

    /// Full-match an element's trimmed text against a pattern
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the pattern is invalid or does not match
    pub fn check_pattern(&mut self, logical_name: &str, identifier: &str, pattern: &str) -> Outcome<()> {
        let step = "Check Pattern";
        let locator = self.resolve(logical_name, identifier);
        let compiled = match TextPattern::parse(pattern) {
            Ok(compiled) => compiled,
            Err(err) => {
                let message = format!("Invalid pattern {pattern}. ::: Actual Error : {err}");
                return self.executor.fail(ReportLevel::Failure, step, message, true);
            }
        };
        self.executor.execute(step, &locator, true, |driver, element| {
            let text = read_output(driver, element, &Action::ReadText, ActionOutput::into_text)?;
            let text = text.trim();
            if compiled.matches(text) {
                Ok(())
            } else {
                Err(ActionFailure::verification(format!(
                    "The actual value : {text} does not match the regex : {}",
                    compiled.expression()
                )))
            }
        })
    }

    /// Run a table validation against an element's grid data
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the check fails and `fail_fast` is set
    pub fn check_table(
        &mut self,
        logical_name: &str,
        identifier: &str,
        validation: &str,
        expected: &str,
        fail_fast: bool,
    ) -> Outcome<()> {
        let step = "Check Table";
        let locator = self.resolve(logical_name, identifier);
        let kind: TableValidation = match validation.parse() {
            Ok(kind) => kind,
            Err(err) => return self.executor.fail(ReportLevel::Failure, step, err.to_string(), fail_fast),
        };
        let message = format!("Check table {kind} : {expected}");
        let object = locator.to_string();
        self.executor
            .execute_with_message(step, &message, &locator, fail_fast, |driver, element| {
                let table = read_output(driver, element, &Action::ReadTable, ActionOutput::into_table)?;
                kind.check(expected, &table).map_err(|detail| {
                    ActionFailure::verification(format!(
                        "Check Table {kind} command failed. ::: Object : {object} ::: Actual Error : {detail}"
                    ))
                })
            })
    }

    /// Count matching elements after polling
    ///
    /// An unresolved logical name is reported as a failure instead of a count.
    ///
    /// # Errors
    ///
    /// Never aborts
    pub fn get_object_count(&mut self, logical_name: &str, identifier: &str) -> Outcome<usize> {
        let locator = self.resolve(logical_name, identifier);
        let count = self.executor.find_elements(&locator).len();
        if locator.is_unresolved() {
            return self.executor.fail_not_found("Get Object Count", &locator, false);
        }
        self.executor
            .succeed("Get Object Count", &format!("Object count is {count}"), count)
    }

    /// Launch the configured browser on `url`, then wait `wait_ms`
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the wait time is invalid or the browser fails to start
    pub fn open(&mut self, url: &str, identifier: &str, wait_ms: &str) -> Outcome<()> {
        let step = "Open";
        let url = self.resolver.resolve_url(url, identifier);
        let Some(wait) = parse_wait(wait_ms) else {
            let message = format!("Cannot access the URL. ::: URL : {url} ::: Actual Error : invalid wait time {wait_ms}");
            return self.executor.fail(ReportLevel::Failure, step, message, true);
        };
        let browser = self.browser.as_str();
        if let Err(err) = self.executor.with_driver(|driver| driver.start_browser(browser, &url)) {
            let message = format!("Cannot access the URL. ::: URL : {url} ::: Actual Error : {err}");
            return self.executor.fail(ReportLevel::Failure, step, message, true);
        }
        self.executor.sleep(wait);
        self.executor
            .succeed(step, &format!("Open command passed. URL : {url}"), ())
    }

    /// Load `url` in the browser element, then wait `wait_ms`
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the wait time is invalid or loading fails
    pub fn navigate_to_url(&mut self, url: &str, identifier: &str, wait_ms: &str) -> Outcome<()> {
        let step = "NavigateToURL";
        let url = self.resolver.resolve_url(url, identifier);
        let Some(wait) = parse_wait(wait_ms) else {
            let message = format!("Cannot navigate to the URL. ::: URL : {url} ::: Actual Error : invalid wait time {wait_ms}");
            return self.executor.fail(ReportLevel::Failure, step, message, true);
        };
        let message = format!("Navigate To URL command to {url} passed.");
        let action = Action::LoadUrl(url);
        let outcome = self
            .executor
            .execute_with_message(step, &message, &browser_locator(), true, |driver, element| {
                driver.perform(element, &action)?;
                Ok(())
            })?;
        if outcome.is_passed() {
            self.executor.sleep(wait);
        }
        Ok(outcome)
    }

    /// Navigate the browser element back, then wait `wait_ms`
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the wait time is invalid or navigation fails
    pub fn go_back(&mut self, wait_ms: &str) -> Outcome<()> {
        let step = "Go Back";
        let Some(wait) = parse_wait(wait_ms) else {
            let message = format!("Browser go back failed. ::: Actual Error : invalid wait time {wait_ms}");
            return self.executor.fail(ReportLevel::Failure, step, message, true);
        };
        let outcome = self.executor.execute_with_message(
            step,
            "Browser go back successful.",
            &browser_locator(),
            true,
            |driver, element| {
                driver.perform(element, &Action::Back)?;
                Ok(())
            },
        )?;
        if outcome.is_passed() {
            self.executor.sleep(wait);
        }
        Ok(outcome)
    }

    /// Block for `wait_ms` milliseconds
    ///
    /// # Errors
    ///
    /// Never aborts; an invalid wait time is reported as a failure
    pub fn pause(&mut self, wait_ms: &str) -> Outcome<()> {
        let step = "Pause";
        let Some(wait) = parse_wait(wait_ms) else {
            let message = format!("Pause command failed. ::: Actual Error : invalid wait time {wait_ms}");
            return self.executor.fail(ReportLevel::Failure, step, message, false);
        };
        self.executor.sleep(wait);
        self.executor
            .succeed(step, &format!("Pause command {wait_ms}ms passed."), ())
    }

    /// Report `message` as a failure and abort
    ///
    /// # Errors
    ///
    /// Always returns [`crate::UserAborted`]
    pub fn fail(&mut self, message: &str) -> Outcome<()> {
        self.executor
            .fail(ReportLevel::Failure, "Fail", format!("Fail message : {message}"), true)
    }

    /// Store a typed scratch value
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the type is unknown, the value does not
    /// parse, or the store cannot be written
    pub fn store(&mut self, key: &str, value_type: &str, value: &str) -> Outcome<()> {
        let step = "Store";
        let stored = value_type
            .parse::<ValueType>()
            .and_then(|t| self.scratch.store(key, t, value));
        match stored {
            Ok(()) => self
                .executor
                .succeed(step, &format!("Store value passed. Input value : {value}"), ()),
            Err(err) => {
                let message = format!("Cannot store the value {value} under {key}. ::: Actual Error : {err}");
                self.executor.fail(ReportLevel::Failure, step, message, true)
            }
        }
    }

    fn report_retrieved<T: std::fmt::Display>(&mut self, key: &str, retrieved: LocusResult<T>) -> Outcome<T> {
        let step = "Retrieve";
        match retrieved {
            Ok(value) => {
                let message = format!("Retrieve value passed. Retrieve value : {value}");
                self.executor.succeed(step, &message, value)
            }
            Err(err) => {
                let message = format!("Cannot retrieve the value for {key}. ::: Actual Error : {err}");
                self.executor.fail(ReportLevel::Failure, step, message, true)
            }
        }
    }

    /// Retrieve a string scratch value
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the key is missing or has another type
    pub fn retrieve_string(&mut self, key: &str) -> Outcome<String> {
        let value = self.scratch.retrieve_string(key);
        self.report_retrieved(key, value)
    }

    /// Retrieve an integer scratch value
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the key is missing or has another type
    pub fn retrieve_int(&mut self, key: &str) -> Outcome<i32> {
        let value = self.scratch.retrieve_int(key);
        self.report_retrieved(key, value)
    }

    /// Retrieve a float scratch value
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the key is missing or has another type
    pub fn retrieve_float(&mut self, key: &str) -> Outcome<f64> {
        let value = self.scratch.retrieve_float(key);
        self.report_retrieved(key, value)
    }

    /// Retrieve a boolean scratch value
    ///
    /// # Errors
    ///
    /// Returns [`crate::UserAborted`] if the key is missing or has another type
    pub fn retrieve_boolean(&mut self, key: &str) -> Outcome<bool> {
        let value = self.scratch.retrieve_boolean(key);
        self.report_retrieved(key, value)
    }
}
