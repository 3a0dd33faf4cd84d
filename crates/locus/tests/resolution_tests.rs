//! Integration tests for locator resolution over page files.
//!
//! Page files are written to a temporary directory and read back through
//! [`FileStore`], so edits between lookups must be visible.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use locus::{parse_constraints, Constraint, FileStore, LocatorResolver, LocatorStore, PageFormat};
use std::fs;
use tempfile::TempDir;

fn pages(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("write page");
    }
    dir
}

// ============================================================================
// Properties pages
// ============================================================================

#[test]
fn resolves_from_properties_page() {
    let dir = pages(&[(
        "login.properties",
        "# login page\nusername=.id:=user|.tag:=input\nsubmit = .text:=<label>|.class:=Html.BUTTON\n",
    )]);
    let resolver = LocatorResolver::new(FileStore::properties(dir.path()));

    let loc = resolver.resolve("login.username", "");
    assert_eq!(
        loc.constraints(),
        &[Constraint::new(".id", "user"), Constraint::new(".tag", "input")]
    );

    let loc = resolver.resolve("login.submit", "label_PARAM:Sign in");
    assert_eq!(
        loc.constraints(),
        &[
            Constraint::new(".text", "Sign in"),
            Constraint::new(".class", "Html.BUTTON")
        ]
    );
}

#[test]
fn page_edits_visible_without_restart() {
    let dir = pages(&[("home.properties", "banner=.id:=old\n")]);
    let resolver = LocatorResolver::new(FileStore::properties(dir.path()));
    assert_eq!(resolver.resolve("home.banner", "").constraints()[0].value, "old");

    fs::write(dir.path().join("home.properties"), "banner=.id:=new\n").unwrap();
    assert_eq!(resolver.resolve("home.banner", "").constraints()[0].value, "new");
}

#[test]
fn missing_page_or_object_degrades_to_empty() {
    let dir = pages(&[("home.properties", "banner=.id:=b\n")]);
    let resolver = LocatorResolver::new(FileStore::properties(dir.path()));
    assert!(resolver.resolve("home.footer", "").is_unresolved());
    assert!(resolver.resolve("cart.total", "").is_unresolved());
    assert!(resolver.try_resolve("cart.total", "").is_err());
}

#[test]
fn lists_pages_and_entries() {
    let dir = pages(&[
        ("b.properties", "x=.id:=1\n"),
        ("a.properties", "y=.id:=2\nz=.id:=3\n"),
        ("notes.txt", "ignored"),
    ]);
    let store = FileStore::properties(dir.path());
    assert_eq!(store.pages().unwrap(), vec!["a".to_string(), "b".to_string()]);
    let entries = store.entries("a").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1], ("z".to_string(), ".id:=3".to_string()));
}

// ============================================================================
// YAML pages
// ============================================================================

#[test]
fn resolves_from_yaml_page() {
    let dir = pages(&[(
        "grid.yaml",
        "cell: \".class:=Html.TD|.row:=<row>|.col:=<col>\"\nheader: \".class:=Html.TH\"\n",
    )]);
    let resolver = LocatorResolver::new(FileStore::new(dir.path(), PageFormat::Yaml));
    let loc = resolver.resolve("grid.cell", "row_PARAM:3_PARAM,col_PARAM:1");
    assert_eq!(
        loc.constraints(),
        &[
            Constraint::new(".class", "Html.TD"),
            Constraint::new(".row", "3"),
            Constraint::new(".col", "1"),
        ]
    );
}

// ============================================================================
// Parser properties through the public API
// ============================================================================

#[test]
fn separators_and_whitespace_are_kept_as_written() {
    assert_eq!(
        parse_constraints(" .text := Log in |.tag:=a"),
        vec![Constraint::new(".text", " Log in "), Constraint::new(".tag", "a")]
    );
}

#[test]
fn value_keeps_later_assignments() {
    assert_eq!(
        parse_constraints(".href:=a:=b"),
        vec![Constraint::new(".href", "a:=b")]
    );
}
