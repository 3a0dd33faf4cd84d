//! Locus CLI Library
//!
//! Command-line interface for inspecting and linting Locus locator maps.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod lint;
pub mod logging;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, FormatArg, LintArgs, ParseArgs, ResolveArgs, SubstituteArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use lint::{lint_locator, lint_store, render_lint_json, render_lint_report, LintReport, LintResult, LintSeverity};
pub use output::Printer;
