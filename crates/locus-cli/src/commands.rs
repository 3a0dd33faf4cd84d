//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Locus: inspect, resolve and lint keyword-driven UI locator maps
#[derive(Parser, Debug)]
#[command(name = "locus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Executor configuration file (.json, .yaml, .yml)
    #[arg(long, global = true, env = "LOCUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the retry count
    #[arg(long, global = true)]
    pub retry_count: Option<u32>,

    /// Override the retry interval in milliseconds
    #[arg(long, global = true)]
    pub retry_interval_ms: Option<u64>,

    /// Override the page directory
    #[arg(long, global = true)]
    pub pages_dir: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a raw locator string into constraints
    Parse(ParseArgs),

    /// Substitute identifier bindings into a text
    Substitute(SubstituteArgs),

    /// Resolve a logical name against the page files
    Resolve(ResolveArgs),

    /// Check every page file for malformed locators
    Lint(LintArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Raw locator, e.g. `.id:=submit|.tag:=button`
    pub raw: String,

    /// Print constraints as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the substitute command
#[derive(Parser, Debug)]
pub struct SubstituteArgs {
    /// Text containing `<name>` placeholders
    pub text: String,

    /// Identifier bindings, e.g. `row_PARAM:3_PARAM,col_PARAM:1`
    pub bindings: String,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Logical name as `page.object`
    pub logical_name: String,

    /// Identifier bindings
    #[arg(short, long, default_value = "")]
    pub identifier: String,

    /// Page file format
    #[arg(long)]
    pub format: Option<FormatArg>,

    /// Print the locator as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the lint command
#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Page file format
    #[arg(long)]
    pub format: Option<FormatArg>,

    /// Print findings as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print compact JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

/// Page file format argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// `.properties` files
    Properties,
    /// `.yaml` files
    Yaml,
}

impl From<FormatArg> for locus::PageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Properties => Self::Properties,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
