//! Page Linting Module
//!
//! Loads every page of a locator store and checks each raw locator.
//!
//! | Code     | Severity | Check                                          |
//! |----------|----------|------------------------------------------------|
//! | `LOC001` | error    | segment has no `:=`                            |
//! | `LOC002` | error    | segment has an empty attribute name            |
//! | `LOC003` | warning  | locator is empty                               |
//! | `LOC004` | warning  | object defined more than once (last one wins)  |
//! | `LOC005` | info     | placeholders that need identifier bindings     |
//! | `LOC006` | error    | page cannot be read or parsed                  |

use locus::constraint::{ASSIGN, SEGMENT_SEPARATOR};
use locus::substitution::unbound_placeholders;
use locus::LocatorStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;

/// Lint severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Error - must fix
    Error,
    /// Warning - should fix
    Warning,
    /// Info - suggestion
    Info,
}

impl LintSeverity {
    /// Get display string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARN",
            Self::Info => "INFO",
        }
    }

    /// Get symbol for display
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Error => "✗",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintResult {
    /// Page name
    pub page: String,
    /// Object name, absent for page-level findings
    pub object: Option<String>,
    /// Severity level
    pub severity: LintSeverity,
    /// Lint code (e.g. `LOC001`)
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl LintResult {
    fn new(severity: LintSeverity, page: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            page: page.to_string(),
            object: None,
            severity,
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Create a new lint error
    pub fn error(page: &str, code: &str, message: impl Into<String>) -> Self {
        Self::new(LintSeverity::Error, page, code, message)
    }

    /// Create a new lint warning
    pub fn warning(page: &str, code: &str, message: impl Into<String>) -> Self {
        Self::new(LintSeverity::Warning, page, code, message)
    }

    /// Create a new lint info
    pub fn info(page: &str, code: &str, message: impl Into<String>) -> Self {
        Self::new(LintSeverity::Info, page, code, message)
    }

    /// Attach the object name
    #[must_use]
    pub fn for_object(mut self, object: &str) -> Self {
        self.object = Some(object.to_string());
        self
    }
}

/// Lint report over a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintReport {
    /// All lint results
    pub results: Vec<LintResult>,
    /// Number of errors
    pub errors: usize,
    /// Number of warnings
    pub warnings: usize,
    /// Number of infos
    pub infos: usize,
    /// Number of pages checked
    pub pages_checked: usize,
    /// Number of locators checked
    pub locators_checked: usize,
}

impl LintReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lint result
    pub fn add(&mut self, result: LintResult) {
        match result.severity {
            LintSeverity::Error => self.errors += 1,
            LintSeverity::Warning => self.warnings += 1,
            LintSeverity::Info => self.infos += 1,
        }
        self.results.push(result);
    }

    /// Check if there are any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Check if the lint passed (no errors)
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.has_errors()
    }
}

/// Check one raw locator
#[must_use]
pub fn lint_locator(page: &str, object: &str, raw: &str) -> Vec<LintResult> {
    let mut results = Vec::new();
    if raw.trim().is_empty() {
        results.push(LintResult::warning(page, "LOC003", "locator is empty").for_object(object));
        return results;
    }

    let mut segments: Vec<&str> = raw.split(SEGMENT_SEPARATOR).collect();
    while segments.len() > 1 && segments.last().is_some_and(|s| s.is_empty()) {
        let _ = segments.pop();
    }
    for (index, segment) in segments.iter().enumerate() {
        match segment.split_once(ASSIGN) {
            None => results.push(
                LintResult::error(
                    page,
                    "LOC001",
                    format!("segment {} '{segment}' has no '{ASSIGN}'", index + 1),
                )
                .for_object(object),
            ),
            Some((name, _)) if name.trim().is_empty() => results.push(
                LintResult::error(
                    page,
                    "LOC002",
                    format!("segment {} '{segment}' has an empty attribute name", index + 1),
                )
                .for_object(object),
            ),
            Some(_) => {}
        }
    }

    let placeholders = unbound_placeholders(raw);
    if !placeholders.is_empty() {
        let names: Vec<String> = placeholders.iter().map(|p| format!("<{p}>")).collect();
        results.push(
            LintResult::info(
                page,
                "LOC005",
                format!("needs identifier bindings for {}", names.join(", ")),
            )
            .for_object(object),
        );
    }
    results
}

/// Lint every page of `store`
pub fn lint_store(store: &impl LocatorStore) -> locus::LocusResult<LintReport> {
    let mut report = LintReport::new();
    for page in store.pages()? {
        report.pages_checked += 1;
        let entries = match store.entries(&page) {
            Ok(entries) => entries,
            Err(err) => {
                report.add(LintResult::error(&page, "LOC006", err.to_string()));
                continue;
            }
        };

        let mut seen = HashSet::new();
        for (object, raw) in &entries {
            report.locators_checked += 1;
            if !seen.insert(object.as_str()) {
                report.add(
                    LintResult::warning(&page, "LOC004", "object defined more than once; the last definition wins")
                        .for_object(object),
                );
            }
            for result in lint_locator(&page, object, raw) {
                report.add(result);
            }
        }
        tracing::debug!(page, locators = entries.len(), "page linted");
    }
    Ok(report)
}

/// Render lint report as text
#[must_use]
pub fn render_lint_report(report: &LintReport) -> String {
    let mut output = String::new();
    output.push_str("LINT REPORT\n");
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if report.results.is_empty() {
        output.push_str("✓ All locators passed linting\n");
    } else {
        for result in &report.results {
            let target = match &result.object {
                Some(object) => format!("{}.{object}", result.page),
                None => result.page.clone(),
            };
            let _ = writeln!(
                output,
                "  {} {target} [{}] {}",
                result.severity.symbol(),
                result.code,
                result.message
            );
        }
        output.push('\n');
    }

    let _ = writeln!(
        output,
        "Pages: {}  Locators: {}  Errors: {}  Warnings: {}  Info: {}",
        report.pages_checked, report.locators_checked, report.errors, report.warnings, report.infos
    );
    output
}

/// Render lint report as JSON
pub fn render_lint_json(report: &LintReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
