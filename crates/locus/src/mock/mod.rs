//! Test doubles for driving Locus without a live UI
//!
//! [`ScriptedDriver`] answers `find_descendants` and `perform` from queued
//! scripts and counts every call, including `release_all`.
//! [`RecordingSleeper`] records requested pauses instead of blocking.
//!
//! ```rust
//! use locus::mock::{RecordingSleeper, ScriptedDriver};
//! use locus::{ElementFinder, RetryPolicy};
//! use std::time::Duration;
//!
//! let sleeper = RecordingSleeper::new();
//! let finder = ElementFinder::with_sleeper(
//!     RetryPolicy::new(5, Duration::from_millis(10)),
//!     sleeper.clone(),
//! );
//! let mut driver = ScriptedDriver::new().then_empty().then_found(1);
//!
//! assert_eq!(finder.find(&mut driver, &[]).len(), 1);
//! assert_eq!(driver.find_calls(), 2);
//! assert_eq!(sleeper.count(), 1);
//! ```

mod scripted;
#[cfg(any(test, feature = "proptest"))]
pub mod strategies;

pub use scripted::{RecordingSleeper, ScriptedDriver};
