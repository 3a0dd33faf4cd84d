//! Text pattern checks
//!
//! Two pattern forms are accepted:
//!
//! - `regex=<expr>` (prefix matched case-insensitively): `<expr>` is used as is.
//! - Shorthand: `S` is an upper-case letter, `s` a lower-case letter, `d` a
//!   digit; every other character matches itself.
//!
//! Matching is anchored at both ends.

use crate::result::LocusResult;
use regex::Regex;

const REGEX_PREFIX: &str = "regex=";

/// Compiled text pattern
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    expression: String,
    regex: Regex,
}

impl TextPattern {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns [`crate::LocusError::Pattern`] if a `regex=` expression is invalid
    pub fn parse(pattern: &str) -> LocusResult<Self> {
        let expression = to_regex(pattern);
        let regex = Regex::new(&format!("^(?:{expression})$"))?;
        Ok(Self {
            source: pattern.to_string(),
            expression,
            regex,
        })
    }

    /// Pattern as written
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Unanchored regular expression
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Check if `text` matches in full
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Translate a pattern into a regular expression (unanchored)
#[must_use]
pub fn to_regex(pattern: &str) -> String {
    let is_regex = pattern
        .get(..REGEX_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(REGEX_PREFIX));
    if is_regex {
        return pattern[REGEX_PREFIX.len()..].to_string();
    }

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            'S' => out.push_str("[A-Z]"),
            's' => out.push_str("[a-z]"),
            'd' => out.push_str("\\d"),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    out
}
