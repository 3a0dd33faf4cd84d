//! Proptest strategies for locator and identifier strings
//!
//! ```rust,ignore
//! proptest! {
//!     #[test]
//!     fn prop_parse_preserves_order(raw in well_formed_locator()) {
//!         let parsed = parse_constraints(&raw.0);
//!         prop_assert_eq!(parsed, raw.1);
//!     }
//! }
//! ```

use crate::constraint::Constraint;
use crate::substitution::Binding;
use proptest::prelude::*;

/// Attribute name such as `.id` or `.class`
pub fn attribute_name() -> impl Strategy<Value = String> {
    "\\.[a-zA-Z][a-zA-Z0-9]{0,10}"
}

/// Attribute value free of `|`
pub fn attribute_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ._:=<>-]{0,16}"
}

/// One well-formed constraint
pub fn constraint() -> impl Strategy<Value = Constraint> {
    (attribute_name(), attribute_value()).prop_map(|(n, v)| Constraint::new(n, v))
}

/// A raw locator string together with the constraints it encodes
pub fn well_formed_locator() -> impl Strategy<Value = (String, Vec<Constraint>)> {
    prop::collection::vec(constraint(), 1..6).prop_map(|constraints| {
        let raw = crate::constraint::to_raw(&constraints);
        (raw, constraints)
    })
}

/// Arbitrary text that may or may not follow the locator grammar
pub fn any_raw_locator() -> impl Strategy<Value = String> {
    prop_oneof![
        well_formed_locator().prop_map(|(raw, _)| raw),
        "[a-z.:=| ]{0,40}",
        any::<String>(),
    ]
}

/// Binding whose value carries no `<` or separator text
pub fn plain_binding() -> impl Strategy<Value = Binding> {
    ("[a-z]{1,6}", "[A-Za-z0-9 ]{0,8}").prop_map(|(n, v)| Binding::new(n, v))
}

/// List of plain bindings
pub fn plain_bindings() -> impl Strategy<Value = Vec<Binding>> {
    prop::collection::vec(plain_binding(), 0..5)
}
