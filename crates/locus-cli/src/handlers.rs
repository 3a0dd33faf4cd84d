//! Subcommand handlers
//!
//! Each handler returns the text destined for stdout so it can be tested
//! without spawning the binary.

use crate::commands::{ConfigArgs, LintArgs, ParseArgs, ResolveArgs, SubstituteArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::lint::{lint_store, render_lint_json, render_lint_report, LintReport};
use locus::{parse_constraints, substitute, FileStore, LocatorResolver, PageFormat};

fn file_store(config: &CliConfig, format: Option<PageFormat>) -> FileStore {
    FileStore::new(
        &config.executor.pages_dir,
        format.unwrap_or(config.executor.page_format),
    )
}

/// Constraints of a raw locator, one `name=value` per line or as JSON
pub fn parse(args: &ParseArgs) -> CliResult<String> {
    let constraints = parse_constraints(&args.raw);
    if args.json {
        return Ok(serde_json::to_string_pretty(&constraints)?);
    }
    Ok(constraints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Text with bindings applied
#[must_use]
pub fn substitute_text(args: &SubstituteArgs) -> String {
    substitute(&args.text, &args.bindings)
}

/// Resolved locator for a logical name; lookup errors are returned, not swallowed
pub fn resolve(config: &CliConfig, args: &ResolveArgs) -> CliResult<String> {
    let resolver = LocatorResolver::new(file_store(config, args.format.map(Into::into)));
    let locator = resolver.try_resolve(&args.logical_name, &args.identifier)?;
    if args.json {
        return Ok(serde_json::to_string_pretty(&locator)?);
    }
    Ok(locator.to_string())
}

/// Lint every page under the configured directory
pub fn lint(config: &CliConfig, args: &LintArgs) -> CliResult<(LintReport, String)> {
    let store = file_store(config, args.format.map(Into::into));
    let report = lint_store(&store)?;
    let rendered = if args.json {
        render_lint_json(&report)?
    } else {
        render_lint_report(&report)
    };
    Ok((report, rendered))
}

/// Effective executor configuration as JSON
pub fn show_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<String> {
    let json = if args.compact {
        serde_json::to_string(&config.executor)?
    } else {
        serde_json::to_string_pretty(&config.executor)?
    };
    Ok(json)
}
