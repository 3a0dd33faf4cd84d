//! Reporter - Step Outcome Reporting
//!
//! Every command produces exactly one [`StepReport`], delivered to a
//! [`ReportSink`] before any fail-fast abort propagates.
//!
//! ```text
//! ┌──────────────┐  log(&StepReport)  ┌──────────────────────────────┐
//! │ ActionExecutor│ ─────────────────▶ │ ReportSink                   │
//! └──────────────┘                    │  ├─ Reporter    (collect)    │
//!                                     │  ├─ TracingSink (log line)   │
//!                                     │  └─ (A, B)      (fan out)    │
//!                                     └──────────────────────────────┘
//! ```

use crate::result::LocusResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Severity of a step outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportLevel {
    /// Step passed
    Success,
    /// Step could not be carried out
    Failure,
    /// Step ran but the observed value differed from the expected one
    VerificationFailure,
}

impl ReportLevel {
    /// Check if the level is a failure of either kind
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Result column of a report line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepResult {
    /// Step passed
    Success,
    /// Step failed
    Error,
}

impl From<ReportLevel> for StepResult {
    fn from(level: ReportLevel) -> Self {
        if level.is_failure() {
            Self::Error
        } else {
            Self::Success
        }
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("Success"),
            Self::Error => f.write_str("Error"),
        }
    }
}

/// One reported step outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// When the outcome was reported
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: ReportLevel,
    /// Step name (e.g. `Click`)
    pub step: String,
    /// Result column
    pub result: StepResult,
    /// Human-readable detail
    pub message: String,
}

impl StepReport {
    /// Create a report stamped with the current time
    #[must_use]
    pub fn new(level: ReportLevel, step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            step: step.into(),
            result: level.into(),
            message: message.into(),
        }
    }

    /// Successful step
    #[must_use]
    pub fn success(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ReportLevel::Success, step, message)
    }

    /// Failed step
    #[must_use]
    pub fn failure(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ReportLevel::Failure, step, message)
    }

    /// Step whose check did not hold
    #[must_use]
    pub fn verification_failure(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ReportLevel::VerificationFailure, step, message)
    }

    /// Check if this report is a pass
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.result, StepResult::Success)
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step : {}\tResult : {}\tMessage : {}",
            self.step, self.result, self.message
        )
    }
}

/// Destination for step outcomes
pub trait ReportSink {
    /// Record one outcome
    fn log(&mut self, report: &StepReport);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn log(&mut self, report: &StepReport) {
        (**self).log(report);
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn log(&mut self, report: &StepReport) {
        (**self).log(report);
    }
}

impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn log(&mut self, report: &StepReport) {
        self.0.log(report);
        self.1.log(report);
    }
}

/// Emits one structured log event per outcome
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn log(&mut self, report: &StepReport) {
        if report.level.is_failure() {
            tracing::warn!(
                step = %report.step,
                level = ?report.level,
                message = %report.message,
                "step failed"
            );
        } else {
            tracing::info!(step = %report.step, message = %report.message, "step passed");
        }
    }
}

/// Collecting reporter
///
/// Keeps every outcome in order and renders a summary or JSON export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reporter {
    /// Run name
    name: String,
    /// Outcomes in reporting order
    reports: Vec<StepReport>,
}

impl Reporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "Script".to_string(),
            reports: Vec::new(),
        }
    }

    /// Set the run name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All outcomes in order
    #[must_use]
    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    /// Most recent outcome
    #[must_use]
    pub fn last(&self) -> Option<&StepReport> {
        self.reports.last()
    }

    /// Failed outcomes
    #[must_use]
    pub fn failures(&self) -> Vec<&StepReport> {
        self.reports.iter().filter(|r| !r.is_success()).collect()
    }

    /// Number of passed steps
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed steps
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.passed_count()
    }

    /// Total number of steps
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.reports.len()
    }

    /// Check if every step passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Drop collected outcomes
    pub fn clear(&mut self) {
        self.reports.clear();
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} steps passed, {} failed",
            self.name,
            self.passed_count(),
            self.total_count(),
            self.failed_count()
        )
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> LocusResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON export to `path`
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file writing fails
    pub fn write_json(&self, path: &Path) -> LocusResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl ReportSink for Reporter {
    fn log(&mut self, report: &StepReport) {
        self.reports.push(report.clone());
    }
}
