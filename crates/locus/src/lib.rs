//! Locus: keyword-driven UI command layer
//!
//! Test scripts name UI elements by logical name (`page.object`). Locus
//! resolves those names through a locator store into attribute constraints,
//! polls a [`UiDriver`] until the element appears, runs the action with
//! retries, and reports exactly one outcome per step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      LOCUS Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Locator    │    │ Locator    │    │ Element    │            │
//! │   │ Store      │───►│ Resolver   │───►│ Finder     │            │
//! │   │ (pages)    │    │ (+params)  │    │ (polling)  │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                   │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Reporter   │◄───│ Action     │◄───│ Command    │            │
//! │   │ (1/step)   │    │ Executor   │    │ Base       │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use locus::mock::ScriptedDriver;
//! use locus::{CommandBase, MemoryStore, RetryPolicy};
//! use std::time::Duration;
//!
//! let store = MemoryStore::new().with("login", "submit", ".id:=btn_<label>|.tag:=button");
//! let driver = ScriptedDriver::new().always_found(1);
//! let mut commands = CommandBase::new(driver, store, RetryPolicy::new(2, Duration::ZERO));
//!
//! let status = commands.click("login.submit", "label_PARAM:ok").unwrap();
//! assert!(status.is_passed());
//! assert_eq!(commands.reporter().passed_count(), 1);
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod commands;
pub mod config;
pub mod constraint;
pub mod datastore;
pub mod driver;
pub mod executor;
pub mod finder;
pub mod locator;
pub mod mock;
pub mod pattern;
pub mod reporter;
mod result;
pub mod store;
pub mod substitution;
pub mod table;

pub use commands::{CommandBase, PropertyCheck};
pub use config::ExecutorConfig;
pub use constraint::{parse_constraints, render_constraints, Constraint};
pub use datastore::{JsonFileStore, MemoryScratchStore, ScratchStore, ValueType};
pub use driver::{Action, ActionOutput, DriverError, ElementHandle, TableData, UiDriver};
pub use executor::{ActionExecutor, ActionFailure, CommandStatus, Outcome};
pub use finder::{ElementFinder, RetryPolicy, Sleeper, ThreadSleeper};
pub use locator::{Locator, LocatorResolver};
pub use pattern::TextPattern;
pub use reporter::{ReportLevel, ReportSink, Reporter, StepReport, StepResult, TracingSink};
pub use result::{LocusError, LocusResult, UserAborted};
pub use store::{FileStore, LocatorStore, MemoryStore, PageFormat};
pub use substitution::{substitute, IdentifierBindings};
pub use table::TableValidation;
