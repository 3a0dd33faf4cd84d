//! Property constraints parsed from raw locator strings.
//!
//! A raw locator string is a `|`-separated list of `attribute:=value`
//! segments, for example `.class:=Html.INPUT.text|.id:=username`.
//!
//! Parsing never fails. A segment without `:=` becomes an empty constraint,
//! which the driver treats as an always-true placeholder, so a malformed
//! segment only loosens the match instead of aborting resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between constraint segments
pub const SEGMENT_SEPARATOR: char = '|';

/// Separator between attribute name and value inside a segment
pub const ASSIGN: &str = ":=";

/// One attribute/value matching criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Constraint {
    /// Attribute name (e.g. `.id`)
    pub name: String,
    /// Expected attribute value
    pub value: String,
}

impl Constraint {
    /// Create a new constraint
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The placeholder produced for malformed segments
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// An empty-named constraint matches everything
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Parse a raw locator string into an ordered constraint list.
///
/// Order is preserved and duplicates are kept. Trailing empty segments
/// (`a:=b|`) are dropped; every other segment yields exactly one constraint.
#[must_use]
pub fn parse_constraints(raw: &str) -> Vec<Constraint> {
    if !raw.contains(SEGMENT_SEPARATOR) {
        return vec![parse_segment(raw)];
    }

    let mut segments: Vec<&str> = raw.split(SEGMENT_SEPARATOR).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        let _ = segments.pop();
    }
    segments.into_iter().map(parse_segment).collect()
}

/// Parse a single `attribute:=value` segment.
///
/// The value is everything after the first `:=`, so further `:=` sequences
/// stay in the value. The name is trimmed; the value is kept verbatim.
#[must_use]
pub fn parse_segment(segment: &str) -> Constraint {
    match segment.split_once(ASSIGN) {
        Some((name, value)) => Constraint::new(name.trim(), value),
        None => {
            tracing::debug!(segment, "locator segment without ':=' treated as placeholder");
            Constraint::empty()
        }
    }
}

/// Render a constraint set the way failure messages show it: `[a=b, c=d]`
#[must_use]
pub fn render_constraints(constraints: &[Constraint]) -> String {
    let parts: Vec<String> = constraints.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Serialize constraints back into raw locator syntax
#[must_use]
pub fn to_raw(constraints: &[Constraint]) -> String {
    constraints
        .iter()
        .map(|c| format!("{}{ASSIGN}{}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("|")
}
