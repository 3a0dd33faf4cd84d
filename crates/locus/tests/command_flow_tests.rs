//! End-to-end command flows through [`CommandBase`].
//!
//! A scripted driver stands in for the UI; pages and scratch data live in a
//! temporary directory configured through [`ExecutorConfig`].

#![allow(clippy::expect_used, clippy::unwrap_used)]

use locus::mock::{RecordingSleeper, ScriptedDriver};
use locus::{
    Action, ActionExecutor, ActionOutput, CommandBase, Constraint, DriverError, ExecutorConfig, FileStore,
    JsonFileStore, LocatorResolver, MemoryScratchStore, MemoryStore, ReportLevel, Reporter, RetryPolicy,
    ScratchStore, StepResult, UiDriver, UserAborted,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn workspace() -> (TempDir, ExecutorConfig) {
    let dir = TempDir::new().expect("temp dir");
    let pages = dir.path().join("Pages");
    fs::create_dir(&pages).unwrap();
    fs::write(
        pages.join("login.properties"),
        "user=.id:=user\npassword=.id:=pass\nsubmit=.text:=<label>|.class:=Html.BUTTON\n",
    )
    .unwrap();
    let config = ExecutorConfig::new()
        .with_retry_count(2)
        .with_retry_interval_ms(0)
        .with_pages_dir(pages)
        .with_data_store_path(dir.path().join("project_data.json"));
    (dir, config)
}

fn script(driver: ScriptedDriver) -> CommandBase<ScriptedDriver, MemoryStore, MemoryScratchStore, Reporter, RecordingSleeper> {
    let executor = ActionExecutor::with_sleeper(
        driver,
        Reporter::new().with_name("checkout"),
        RetryPolicy::new(3, Duration::from_millis(20)),
        RecordingSleeper::new(),
    );
    let store = MemoryStore::new()
        .with("cart", "row", ".class:=Html.TR|.text:=<item>")
        .with("cart", "checkout", ".id:=checkout");
    CommandBase::from_parts(executor, LocatorResolver::new(store), MemoryScratchStore::new())
}

// ============================================================================
// Configured from files
// ============================================================================

#[test]
fn login_script_from_config() -> Result<(), UserAborted> {
    init_tracing();
    let (dir, config) = workspace();
    let mut cmds = CommandBase::from_config(ScriptedDriver::new().always_found(1), &config);

    cmds.open("http://<host>/login", "host_PARAM:shop.test", "0")?;
    cmds.type_text("login.user", "", "ada")?;
    cmds.type_text("login.password", "", "secret")?;
    cmds.click("login.submit", "label_PARAM:Sign in")?;
    cmds.store("user", "String", "ada")?;

    let reporter = cmds.reporter();
    assert_eq!(reporter.total_count(), 5);
    assert!(reporter.all_passed());
    assert_eq!(
        cmds.driver().last_constraints().unwrap(),
        &[
            Constraint::new(".text", "Sign in"),
            Constraint::new(".class", "Html.BUTTON")
        ]
    );
    assert_eq!(
        cmds.driver().browsers(),
        &[("iexplore".to_string(), "http://shop.test/login".to_string())]
    );

    let reopened = JsonFileStore::new(dir.path().join("project_data.json"));
    assert_eq!(reopened.retrieve_string("user").unwrap(), "ada");
    Ok(())
}

#[test]
fn unknown_locator_aborts_script_with_one_report() {
    let (_dir, config) = workspace();
    let mut cmds = CommandBase::from_config(ScriptedDriver::new().always_found(1), &config);

    let err = cmds.click("login.forgot", "").unwrap_err();
    assert_eq!(err.step, "Click");
    assert_eq!(err.message, "Cannot find the element login.forgot with properties : []");
    assert_eq!(cmds.reporter().total_count(), 1);
    assert_eq!(cmds.driver().find_calls(), 0);
    assert!(cmds.driver().performed().is_empty());
    assert_eq!(cmds.driver().release_calls(), 1);
}

#[test]
fn unresolvable_names_never_reach_the_driver() {
    init_tracing();
    let (_dir, config) = workspace();
    let mut cmds = CommandBase::from_config(ScriptedDriver::new().always_found(1), &config);

    let missing_page = cmds.check_element_present("signup.email", "", false).unwrap();
    let malformed = cmds.check_element_present("loginsubmit", "", false).unwrap();
    assert!(missing_page.is_failed());
    assert!(malformed.is_failed());
    assert!(cmds.type_text("login.remember", "", "yes").is_err());

    let reporter = cmds.reporter();
    assert_eq!(reporter.total_count(), 3);
    assert_eq!(reporter.failed_count(), 3);
    for (report, name) in reporter.reports().iter().zip(["signup.email", "loginsubmit", "login.remember"]) {
        assert_eq!(report.level, ReportLevel::Failure);
        assert!(report.message.contains(name));
    }
    assert_eq!(cmds.driver().find_calls(), 0);
    assert_eq!(cmds.driver().release_calls(), 3);
}

#[test]
fn file_store_is_usable_directly() {
    let (_dir, config) = workspace();
    let store = FileStore::new(&config.pages_dir, config.page_format);
    let cmds = CommandBase::new(ScriptedDriver::new(), store, config.retry_policy());
    assert_eq!(cmds.resolve("login.user", "").constraints(), &[Constraint::new(".id", "user")]);
}

// ============================================================================
// Retry and reporting behaviour
// ============================================================================

#[test]
fn element_appearing_late_is_found() {
    let driver = ScriptedDriver::new().then_empty().then_empty().then_found(1);
    let mut cmds = script(driver);
    assert!(cmds.click("cart.checkout", "").unwrap().is_passed());
    assert_eq!(cmds.driver().find_calls(), 3);
}

#[test]
fn stale_element_retried_then_passes() {
    let driver = ScriptedDriver::new()
        .always_found(1)
        .then_perform_error(DriverError::Stale("el0".into()))
        .then_perform(Ok(ActionOutput::Done));
    let mut cmds = script(driver);
    assert!(cmds.double_click("cart.checkout", "").unwrap().is_passed());
    assert_eq!(cmds.driver().perform_calls(), 2);
    assert_eq!(cmds.reporter().total_count(), 1);
}

#[test]
fn exhausted_action_reports_last_error() {
    let driver = ScriptedDriver::new()
        .always_found(1)
        .always_fail_perform(DriverError::other("window is busy"));
    let mut cmds = script(driver);
    let err = cmds.mouse_over("cart.checkout", "").unwrap_err();
    assert!(err.message.contains("Actual Error : window is busy"));
    assert_eq!(cmds.driver().perform_calls(), 3);
}

#[test]
fn non_fatal_checks_continue_the_script() {
    let driver = ScriptedDriver::new()
        .always_found(1)
        .always_perform(ActionOutput::Text("Total: 12".into()));
    let mut cmds = script(driver);

    let status = cmds
        .check_object_property("cart.row", "item_PARAM:Pen", ".text", "Total: 10", false)
        .unwrap();
    assert!(status.is_failed());
    let status = cmds
        .check_object_property("cart.row", "item_PARAM:Pen", ".text", "Total: 12", false)
        .unwrap();
    assert!(status.is_passed());

    let reports = cmds.reporter().reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].level, ReportLevel::VerificationFailure);
    assert_eq!(reports[0].result, StepResult::Error);
    assert_eq!(reports[1].result, StepResult::Success);
    assert_eq!(cmds.reporter().summary(), "checkout: 1/2 steps passed, 1 failed");
}

#[test]
fn report_serializes_to_json() {
    let mut cmds = script(ScriptedDriver::new().always_found(3));
    cmds.get_object_count("cart.row", "item_PARAM:Pen").unwrap();
    let json = cmds.reporter().to_json().unwrap();
    assert!(json.contains("\"Object count is 3\""));
    assert!(json.contains("\"SUCCESS\""));
}

#[test]
fn actions_go_to_the_first_match() {
    let mut cmds = script(ScriptedDriver::new().always_found(3));
    cmds.type_text("cart.row", "item_PARAM:Pen", "2").unwrap();
    let (element, action) = &cmds.driver().performed()[0];
    assert_eq!(element.id, "el0");
    assert_eq!(action, &Action::SetText("2".into()));
}

// ============================================================================
// Custom drivers
// ============================================================================

/// Driver exposing a fixed set of elements keyed by `.id`
#[derive(Debug, Default)]
struct StaticDriver {
    ids: Vec<&'static str>,
    clicked: Vec<String>,
    outstanding: usize,
}

impl UiDriver for StaticDriver {
    fn find_descendants(&mut self, constraints: &[Constraint]) -> Result<Vec<locus::ElementHandle>, DriverError> {
        let found: Vec<_> = self
            .ids
            .iter()
            .filter(|id| {
                constraints
                    .iter()
                    .all(|c| c.is_placeholder() || (c.name == ".id" && c.value == **id))
            })
            .map(|id| locus::ElementHandle::new(*id))
            .collect();
        self.outstanding += found.len();
        Ok(found)
    }

    fn perform(&mut self, element: &locus::ElementHandle, action: &Action) -> Result<ActionOutput, DriverError> {
        match action {
            Action::Click => {
                self.clicked.push(element.id.clone());
                Ok(ActionOutput::Done)
            }
            other => Err(DriverError::Unsupported {
                action: other.name().to_string(),
                element: element.to_string(),
            }),
        }
    }

    fn release_all(&mut self) {
        self.outstanding = 0;
    }
}

#[test]
fn custom_driver_handles_are_released() {
    let driver = StaticDriver {
        ids: vec!["checkout", "cancel"],
        ..StaticDriver::default()
    };
    let store = MemoryStore::new().with("cart", "checkout", ".id:=checkout");
    let mut cmds = CommandBase::new(driver, store, RetryPolicy::new(1, Duration::ZERO));

    cmds.click("cart.checkout", "").unwrap();
    assert_eq!(cmds.driver().clicked, vec!["checkout".to_string()]);
    assert_eq!(cmds.driver().outstanding, 0);
}

#[test]
fn unsupported_action_fails_after_retries() {
    let driver = StaticDriver {
        ids: vec!["checkout"],
        ..StaticDriver::default()
    };
    let store = MemoryStore::new().with("cart", "checkout", ".id:=checkout");
    let mut cmds = CommandBase::new(driver, store, RetryPolicy::new(2, Duration::ZERO));

    let err = cmds.type_text("cart.checkout", "", "x").unwrap_err();
    assert!(err.message.contains("action 'set_text' not supported by checkout"));
    assert_eq!(cmds.driver().outstanding, 0);
}
