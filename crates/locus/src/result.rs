//! Result and error types for Locus.
//!
//! Two result kinds flow through the crate:
//!
//! - [`LocusError`]: classified, recoverable failures. Resolution swallows these
//!   into empty constraint sets; commands turn them into failure reports.
//! - [`UserAborted`]: the fail-fast signal. It is not an error variant, so it
//!   cannot be caught by code that matches on `LocusError`.

use std::fmt;
use thiserror::Error;

/// Result type for Locus operations
pub type LocusResult<T> = Result<T, LocusError>;

/// Errors that can occur in Locus
#[derive(Debug, Error)]
pub enum LocusError {
    /// Logical name could not be resolved in the locator store
    #[error("Cannot resolve {page}.{object}: {reason}")]
    Lookup {
        /// Page name
        page: String,
        /// Object name within the page
        object: String,
        /// Why the lookup failed
        reason: String,
    },

    /// Logical name is not of the form `page.object`
    #[error("Malformed logical name '{name}': expected 'page.object'")]
    MalformedName {
        /// The offending name
        name: String,
    },

    /// Element finder exhausted its retries without a match
    #[error("Cannot find the element {logical_name} with properties : {constraints}")]
    NotFound {
        /// Logical name of the locator
        logical_name: String,
        /// Rendered constraint set
        constraints: String,
    },

    /// Action against a found element kept failing until retries ran out
    #[error("Cannot access the element: {message}")]
    TransientAction {
        /// Last captured error detail
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid pattern for text checks
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Scratch store error
    #[error("Data store error: {message}")]
    DataStore {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl LocusError {
    /// Create a lookup error
    #[must_use]
    pub fn lookup(
        page: impl Into<String>,
        object: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Lookup {
            page: page.into(),
            object: object.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a data store error
    #[must_use]
    pub fn data_store(message: impl Into<String>) -> Self {
        Self::DataStore {
            message: message.into(),
        }
    }
}

/// Fail-fast signal raised when a step marked "stop on failure" fails.
///
/// The failure has already been reported by the time this value exists.
/// Callers must propagate it unchanged (`?`) and never retry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAborted {
    /// Step that pulled the cord
    pub step: String,
    /// Reported failure message
    pub message: String,
}

impl UserAborted {
    /// Create a new abort signal
    #[must_use]
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for UserAborted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script aborted at step '{}': {}", self.step, self.message)
    }
}

impl std::error::Error for UserAborted {}
