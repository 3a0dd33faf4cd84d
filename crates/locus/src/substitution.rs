//! Placeholder substitution for parameterized locators and URLs.
//!
//! Locators may carry `<name>` placeholders. Callers bind them with an
//! identifier string such as `row_PARAM:3_PARAM,label_PARAM:Save`.
//!
//! Substitution is literal and sequential: each binding is applied to the
//! output of the previous one, with no escaping. A value that itself contains
//! `<other>` will be rewritten by a later `other` binding, and a placeholder
//! name that is a substring of another is not disambiguated. A name bound
//! twice is not last-write-wins: the first binding replaces every `<name>`,
//! so the later one finds nothing left to replace.

use serde::{Deserialize, Serialize};

/// Separator between bindings
pub const BINDING_SEPARATOR: &str = "_PARAM,";

/// Separator between a binding's name and value
pub const NAME_VALUE_SEPARATOR: &str = "_PARAM:";

/// One `name -> value` binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Placeholder name without angle brackets
    pub name: String,
    /// Replacement text
    pub value: String,
}

impl Binding {
    /// Create a new binding
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The literal token this binding replaces
    #[must_use]
    pub fn placeholder(&self) -> String {
        format!("<{}>", self.name)
    }
}

/// Parsed identifier binding string, in the order the bindings appeared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierBindings {
    bindings: Vec<Binding>,
}

impl IdentifierBindings {
    /// Parse an identifier binding string.
    ///
    /// Segments without `_PARAM:` carry no binding and are skipped. When a
    /// value contains another `_PARAM:`, only the text up to it is used.
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        if identifier.is_empty() {
            return Self::default();
        }

        let bindings = identifier
            .split(BINDING_SEPARATOR)
            .filter_map(|segment| {
                let mut parts = segment.split(NAME_VALUE_SEPARATOR);
                let name = parts.next()?;
                match parts.next() {
                    Some(value) => Some(Binding::new(name, value)),
                    None => {
                        tracing::debug!(segment, "identifier segment without '_PARAM:' skipped");
                        None
                    }
                }
            })
            .collect();

        Self { bindings }
    }

    /// Build from explicit bindings
    #[must_use]
    pub fn from_bindings(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Render back into the identifier grammar
    #[must_use]
    pub fn encode(&self) -> String {
        self.bindings
            .iter()
            .map(|b| format!("{}{NAME_VALUE_SEPARATOR}{}", b.name, b.value))
            .collect::<Vec<_>>()
            .join(BINDING_SEPARATOR)
    }

    /// Check if there are no bindings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Iterate over bindings in application order
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    /// Apply every binding in order to `text`
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        self.bindings
            .iter()
            .fold(text.to_string(), |acc, b| acc.replace(&b.placeholder(), &b.value))
    }
}

impl<'a> IntoIterator for &'a IdentifierBindings {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Substitute placeholders in `text` using an identifier binding string.
///
/// An empty identifier returns `text` unchanged. Unbound placeholders are
/// left verbatim.
#[must_use]
pub fn substitute(text: &str, identifier: &str) -> String {
    if identifier.is_empty() {
        return text.to_string();
    }
    IdentifierBindings::parse(identifier).apply(text)
}

/// Placeholder names (`<name>`) still present in `text`
#[must_use]
pub fn unbound_placeholders(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        match after.find(['>', '<']) {
            Some(end) if after[end..].starts_with('>') => {
                if end > 0 {
                    names.push(after[..end].to_string());
                }
                rest = &after[end + 1..];
            }
            Some(end) => rest = &after[end..],
            None => break,
        }
    }
    names
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_empty_identifier() {
            assert!(IdentifierBindings::parse("").is_empty());
        }

        #[test]
        fn test_single_binding() {
            let b = IdentifierBindings::parse("label_PARAM:Submit");
            assert_eq!(b.len(), 1);
            assert_eq!(b.iter().next().unwrap(), &Binding::new("label", "Submit"));
        }

        #[test]
        fn test_multiple_bindings_keep_order() {
            let b = IdentifierBindings::parse("row_PARAM:3_PARAM,col_PARAM:7");
            let names: Vec<&str> = b.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(names, vec!["row", "col"]);
        }

        #[test]
        fn test_segment_without_separator_skipped() {
            let b = IdentifierBindings::parse("orphan_PARAM,label_PARAM:Save");
            assert_eq!(b.len(), 1);
            assert_eq!(b.iter().next().unwrap().name, "label");
        }

        #[test]
        fn test_value_cut_at_second_separator() {
            let b = IdentifierBindings::parse("a_PARAM:x_PARAM:y");
            assert_eq!(b.iter().next().unwrap().value, "x");
        }

        #[test]
        fn test_encode_round_trip() {
            let raw = "row_PARAM:3_PARAM,col_PARAM:7";
            assert_eq!(IdentifierBindings::parse(raw).encode(), raw);
        }
    }

    mod substitute_tests {
        use super::*;

        #[test]
        fn test_empty_identifier_returns_text() {
            assert_eq!(substitute(".text:=<label>", ""), ".text:=<label>");
        }

        #[test]
        fn test_simple_substitution() {
            assert_eq!(
                substitute(".text:=<label>", "label_PARAM:Submit"),
                ".text:=Submit"
            );
        }

        #[test]
        fn test_every_occurrence_replaced() {
            assert_eq!(
                substitute("<x>|<x>|<y>", "x_PARAM:1"),
                "1|1|<y>"
            );
        }

        #[test]
        fn test_unbound_placeholder_left_verbatim() {
            assert_eq!(
                substitute(".id:=<missing>", "other_PARAM:v"),
                ".id:=<missing>"
            );
        }

        #[test]
        fn test_repeated_name_first_binding_consumes_placeholder() {
            assert_eq!(substitute("<a>", "a_PARAM:1_PARAM,a_PARAM:2"), "1");
        }

        #[test]
        fn test_sequential_rematching_is_preserved() {
            assert_eq!(substitute("<a>", "a_PARAM:<b>_PARAM,b_PARAM:z"), "z");
        }

        #[test]
        fn test_url_substitution() {
            assert_eq!(
                substitute("http://<host>/app?id=<id>", "host_PARAM:example.com_PARAM,id_PARAM:42"),
                "http://example.com/app?id=42"
            );
        }
    }

    mod placeholder_tests {
        use super::*;

        #[test]
        fn test_unbound_placeholders() {
            assert_eq!(
                unbound_placeholders(".text:=<label>|.id:=<row>"),
                vec!["label".to_string(), "row".to_string()]
            );
        }

        #[test]
        fn test_no_placeholders() {
            assert!(unbound_placeholders(".id:=a<b").is_empty());
            assert!(unbound_placeholders(".id:=<>").is_empty());
        }

        #[test]
        fn test_nested_open_bracket() {
            assert_eq!(unbound_placeholders("<<name>"), vec!["name".to_string()]);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_substitution_idempotent_without_placeholders_left(
                pieces in prop::collection::vec(
                    prop_oneof!["[a-z:=|.]{0,5}", "<[a-z]{1,4}>"],
                    0..8
                ),
                names in prop::collection::vec("[a-z]{1,4}", 1..4),
                values in prop::collection::vec("[A-Z0-9]{0,6}", 4)
            ) {
                let text = pieces.concat();
                let identifier = names
                    .iter()
                    .zip(values.iter())
                    .map(|(n, v)| format!("{n}_PARAM:{v}"))
                    .collect::<Vec<_>>()
                    .join("_PARAM,");
                let once = substitute(&text, &identifier);
                let twice = substitute(&once, &identifier);
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_empty_identifier_is_identity(text in ".{0,40}") {
                prop_assert_eq!(substitute(&text, ""), text);
            }
        }
    }
}
