//! Locator resolution: logical names to constraint sets.
//!
//! Test scripts refer to elements as `page.object`. Resolution looks the name
//! up in a [`LocatorStore`], substitutes identifier bindings over the whole raw
//! string, and parses the result into constraints.
//!
//! # Design Philosophy
//!
//! - **Never fails**: a lookup or naming problem is logged and degrades to an
//!   empty constraint set, which surfaces later as "element not found".
//! - **Immutable result**: a [`Locator`] is built once with its final
//!   constraints and has no setters.
//! - **No caching**: every call goes back to the store.

use crate::constraint::{parse_constraints, render_constraints, Constraint};
use crate::result::{LocusError, LocusResult};
use crate::store::LocatorStore;
use crate::substitution::substitute;
use serde::Serialize;
use std::fmt;

/// Fully resolved reference to one logical UI element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    logical_name: String,
    identifier: String,
    constraints: Vec<Constraint>,
}

impl Locator {
    fn new(logical_name: &str, identifier: &str, constraints: Vec<Constraint>) -> Self {
        Self {
            logical_name: logical_name.to_string(),
            identifier: identifier.to_string(),
            constraints,
        }
    }

    /// Locator built directly from constraints, bypassing any store
    #[must_use]
    pub fn from_constraints(logical_name: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            logical_name: logical_name.into(),
            identifier: String::new(),
            constraints,
        }
    }

    /// Dotted name as written by the caller
    #[must_use]
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Raw identifier binding string
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Resolved constraints, in locator order
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Check if resolution produced no constraints
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.logical_name, render_constraints(&self.constraints))
    }
}

/// Split `page.object` at the first `.`
///
/// # Errors
///
/// Returns [`LocusError::MalformedName`] when either side is missing
pub fn split_logical_name(logical_name: &str) -> LocusResult<(&str, &str)> {
    match logical_name.split_once('.') {
        Some((page, object)) if !page.is_empty() && !object.is_empty() => Ok((page, object)),
        _ => Err(LocusError::MalformedName {
            name: logical_name.to_string(),
        }),
    }
}

/// Resolves logical names against a locator store
#[derive(Debug, Clone)]
pub struct LocatorResolver<S> {
    store: S,
}

impl<S: LocatorStore> LocatorResolver<S> {
    /// Create a resolver over `store`
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `logical_name` with optional `identifier` bindings.
    ///
    /// Lookup and naming errors are logged at `warn` and yield a locator with
    /// no constraints.
    #[must_use]
    pub fn resolve(&self, logical_name: &str, identifier: &str) -> Locator {
        match self.try_resolve(logical_name, identifier) {
            Ok(locator) => locator,
            Err(err) => {
                tracing::warn!(logical_name, identifier, error = %err, "locator resolution failed");
                Locator::new(logical_name, identifier, Vec::new())
            }
        }
    }

    /// Resolve without swallowing lookup errors
    ///
    /// # Errors
    ///
    /// Returns error if the name is malformed or the store has no entry
    pub fn try_resolve(&self, logical_name: &str, identifier: &str) -> LocusResult<Locator> {
        let (page, object) = split_logical_name(logical_name)?;
        let raw = self.store.lookup(page, object)?;
        let resolved = if identifier.is_empty() {
            raw
        } else {
            substitute(&raw, identifier)
        };
        let constraints = parse_constraints(&resolved);
        tracing::debug!(logical_name, raw = %resolved, count = constraints.len(), "locator resolved");
        Ok(Locator::new(logical_name, identifier, constraints))
    }

    /// Substitute bindings into a URL; no store involved
    #[must_use]
    pub fn resolve_url(&self, raw_url: &str, identifier: &str) -> String {
        substitute(raw_url, identifier)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn resolver() -> LocatorResolver<MemoryStore> {
        LocatorResolver::new(
            MemoryStore::new()
                .with("login", "username", ".id:=user| .tag:=input")
                .with("login", "button", ".text:=<label>")
                .with("grid", "cell", ".class:=Html.TD|.row:=<row>|.col:=<col>"),
        )
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_without_identifier() {
            let loc = resolver().resolve("login.username", "");
            assert_eq!(
                loc.constraints(),
                &[Constraint::new(".id", "user"), Constraint::new(".tag", "input")]
            );
            assert_eq!(loc.logical_name(), "login.username");
            assert_eq!(loc.identifier(), "");
        }

        #[test]
        fn test_resolve_with_identifier() {
            let loc = resolver().resolve("login.button", "label_PARAM:Submit");
            assert_eq!(loc.constraints(), &[Constraint::new(".text", "Submit")]);
            assert_eq!(loc.identifier(), "label_PARAM:Submit");
        }

        #[test]
        fn test_resolve_multiple_bindings() {
            let loc = resolver().resolve("grid.cell", "row_PARAM:2_PARAM,col_PARAM:5");
            assert_eq!(
                loc.constraints(),
                &[
                    Constraint::new(".class", "Html.TD"),
                    Constraint::new(".row", "2"),
                    Constraint::new(".col", "5"),
                ]
            );
        }

        #[test]
        fn test_unbound_placeholder_kept() {
            let loc = resolver().resolve("login.button", "other_PARAM:x");
            assert_eq!(loc.constraints(), &[Constraint::new(".text", "<label>")]);
        }

        #[test]
        fn test_missing_object_degrades_to_empty() {
            let loc = resolver().resolve("login.missing", "");
            assert!(loc.is_unresolved());
            assert_eq!(loc.logical_name(), "login.missing");
        }

        #[test]
        fn test_missing_page_degrades_to_empty() {
            assert!(resolver().resolve("nowhere.button", "").is_unresolved());
        }

        #[test]
        fn test_malformed_name_degrades_to_empty() {
            assert!(resolver().resolve("loginbutton", "").is_unresolved());
            assert!(resolver().resolve(".button", "").is_unresolved());
        }

        #[test]
        fn test_try_resolve_reports_error() {
            let err = resolver().try_resolve("loginbutton", "").unwrap_err();
            assert!(matches!(err, LocusError::MalformedName { .. }));
            let err = resolver().try_resolve("login.missing", "").unwrap_err();
            assert!(matches!(err, LocusError::Lookup { .. }));
        }

        #[test]
        fn test_display() {
            let loc = resolver().resolve("login.button", "label_PARAM:Go");
            assert_eq!(loc.to_string(), "login.button [.text=Go]");
        }
    }

    mod name_tests {
        use super::*;

        #[test]
        fn test_split_first_dot() {
            assert_eq!(split_logical_name("a.b").unwrap(), ("a", "b"));
            assert_eq!(split_logical_name("a.b.c").unwrap(), ("a", "b.c"));
        }

        #[test]
        fn test_split_rejects() {
            assert!(split_logical_name("ab").is_err());
            assert!(split_logical_name("a.").is_err());
        }
    }

    mod url_tests {
        use super::*;

        #[test]
        fn test_resolve_url() {
            let r = resolver();
            assert_eq!(
                r.resolve_url("http://<host>/login", "host_PARAM:example.org"),
                "http://example.org/login"
            );
            assert_eq!(r.resolve_url("http://a/<x>", ""), "http://a/<x>");
        }
    }
}
