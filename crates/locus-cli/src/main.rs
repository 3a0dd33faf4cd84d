//! Locus CLI: inspect, resolve and lint locator maps
//!
//! ## Usage
//!
//! ```bash
//! locus parse ".id:=submit|.tag:=button"          # Show constraints
//! locus substitute "/u/<id>" "id_PARAM:7"          # Apply bindings
//! locus resolve login.submit -i "label_PARAM:Go"   # Resolve from Pages/
//! locus lint --pages-dir Pages                     # Check every page
//! locus config                                     # Effective configuration
//! ```

use clap::Parser;
use locus_cli::{handlers, logging, Cli, CliConfig, CliError, CliResult, Commands, Printer};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli)?;
    logging::init(&config);
    tracing::debug!(?config, "configuration resolved");

    let printer = Printer::new(config.color.should_color(), config.verbosity.is_quiet());

    match &cli.command {
        Commands::Parse(args) => printer.line(&handlers::parse(args)?),
        Commands::Substitute(args) => printer.line(&handlers::substitute_text(args)),
        Commands::Resolve(args) => printer.line(&handlers::resolve(&config, args)?),
        Commands::Lint(args) => {
            let (report, rendered) = handlers::lint(&config, args)?;
            printer.line(&rendered);
            if report.has_errors() {
                return Err(CliError::LintFailed {
                    errors: report.errors,
                });
            }
            printer.success(&format!("{} locator(s) checked", report.locators_checked));
        }
        Commands::Config(args) => printer.line(&handlers::show_config(&config, args)?),
    }
    Ok(())
}
