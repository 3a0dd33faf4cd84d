//! Locator stores: where logical `page.object` names get their raw locators.
//!
//! Pages live in one file each, named after the page. Two file formats are
//! supported:
//!
//! - `Pages/login.properties` (Java properties, `username=.id:=user`)
//! - `Pages/login.yaml` (mapping, `username: ".id:=user"`)
//!
//! Stores are read on every lookup. Nothing is cached, so edits to a page
//! file are picked up by the next command.

use crate::result::{LocusError, LocusResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default directory holding page files
pub const DEFAULT_PAGES_DIR: &str = "Pages";

/// Source of raw locator strings keyed by page and object name
pub trait LocatorStore {
    /// Raw locator string for `object` on `page`
    fn lookup(&self, page: &str, object: &str) -> LocusResult<String>;

    /// Names of all known pages
    fn pages(&self) -> LocusResult<Vec<String>>;

    /// All `(object, raw locator)` entries of a page, in file order
    fn entries(&self, page: &str) -> LocusResult<Vec<(String, String)>>;
}

/// Page file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    /// Java properties files (`.properties`)
    #[default]
    Properties,
    /// YAML mapping files (`.yaml`)
    Yaml,
}

impl PageFormat {
    /// File extension for this format
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Yaml => "yaml",
        }
    }

    /// Parse page file content into ordered entries
    pub fn parse(self, content: &str) -> LocusResult<Vec<(String, String)>> {
        match self {
            Self::Properties => Ok(parse_properties(content)),
            Self::Yaml => parse_yaml_page(content),
        }
    }
}

impl std::str::FromStr for PageFormat {
    type Err = LocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "properties" => Ok(Self::Properties),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(LocusError::config(format!("unknown page format '{other}'"))),
        }
    }
}

/// Directory of page files, one per page
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    format: PageFormat,
}

impl FileStore {
    /// Create a store over `dir` using `format`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: PageFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Store over `.properties` page files
    #[must_use]
    pub fn properties(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, PageFormat::Properties)
    }

    /// Store over `.yaml` page files
    #[must_use]
    pub fn yaml(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, PageFormat::Yaml)
    }

    /// Directory being read
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Page file format
    #[must_use]
    pub const fn format(&self) -> PageFormat {
        self.format
    }

    /// Path of the file backing `page`
    #[must_use]
    pub fn page_path(&self, page: &str) -> PathBuf {
        self.dir.join(format!("{page}.{}", self.format.extension()))
    }

    fn read_page(&self, page: &str) -> Result<Vec<(String, String)>, String> {
        let path = self.page_path(page);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => format!("page file {} not found", path.display()),
            _ => format!("page file {} unreadable: {e}", path.display()),
        })?;
        self.format
            .parse(&content)
            .map_err(|e| format!("page file {} invalid: {e}", path.display()))
    }
}

impl LocatorStore for FileStore {
    fn lookup(&self, page: &str, object: &str) -> LocusResult<String> {
        let entries = self
            .read_page(page)
            .map_err(|reason| LocusError::lookup(page, object, reason))?;
        last_value(&entries, object).ok_or_else(|| {
            LocusError::lookup(page, object, format!("object '{object}' not defined"))
        })
    }

    fn pages(&self) -> LocusResult<Vec<String>> {
        let mut pages = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(self.format.extension()) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    pages.push(stem.to_string());
                }
            }
        }
        pages.sort();
        Ok(pages)
    }

    fn entries(&self, page: &str) -> LocusResult<Vec<(String, String)>> {
        self.read_page(page)
            .map_err(|reason| LocusError::lookup(page, "*", reason))
    }
}

/// In-memory store, mainly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pages: BTreeMap<String, Vec<(String, String)>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) one object's raw locator
    pub fn insert(&mut self, page: impl Into<String>, object: impl Into<String>, raw: impl Into<String>) {
        let object = object.into();
        let entries = self.pages.entry(page.into()).or_default();
        entries.retain(|(name, _)| *name != object);
        entries.push((object, raw.into()));
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, page: impl Into<String>, object: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(page, object, raw);
        self
    }

    /// Remove an object, returning its raw locator
    pub fn remove(&mut self, page: &str, object: &str) -> Option<String> {
        let entries = self.pages.get_mut(page)?;
        let idx = entries.iter().position(|(name, _)| name == object)?;
        Some(entries.remove(idx).1)
    }
}

impl LocatorStore for MemoryStore {
    fn lookup(&self, page: &str, object: &str) -> LocusResult<String> {
        let entries = self
            .pages
            .get(page)
            .ok_or_else(|| LocusError::lookup(page, object, format!("page '{page}' not found")))?;
        last_value(entries, object).ok_or_else(|| {
            LocusError::lookup(page, object, format!("object '{object}' not defined"))
        })
    }

    fn pages(&self) -> LocusResult<Vec<String>> {
        Ok(self.pages.keys().cloned().collect())
    }

    fn entries(&self, page: &str) -> LocusResult<Vec<(String, String)>> {
        self.pages
            .get(page)
            .cloned()
            .ok_or_else(|| LocusError::lookup(page, "*", format!("page '{page}' not found")))
    }
}

fn last_value(entries: &[(String, String)], object: &str) -> Option<String> {
    entries
        .iter()
        .rev()
        .find(|(name, _)| name == object)
        .map(|(_, raw)| raw.clone())
}

// =============================================================================
// PAGE FILE PARSING
// =============================================================================

/// Parse Java properties content into ordered `(key, value)` pairs.
///
/// Handles `#`/`!` comments, `=`/`:`/whitespace separators, backslash line
/// continuations and the standard escapes. Malformed `\u` escapes are kept
/// as literal text.
#[must_use]
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start_matches(is_prop_whitespace);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            let _ = logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start_matches(is_prop_whitespace)),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        entries.push((unescape(key), unescape(value)));
    }

    entries
}

fn parse_yaml_page(content: &str) -> LocusResult<Vec<(String, String)>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mapping: serde_yaml_ng::Mapping = serde_yaml_ng::from_str(content)?;
    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        match (key.as_str(), yaml_scalar(&value)) {
            (Some(k), Some(v)) => entries.push((k.to_string(), v)),
            _ => tracing::warn!(?key, "skipping non-scalar page entry"),
        }
    }
    Ok(entries)
}

fn yaml_scalar(value: &serde_yaml_ng::Value) -> Option<String> {
    match value {
        serde_yaml_ng::Value::String(s) => Some(s.clone()),
        serde_yaml_ng::Value::Number(n) => Some(n.to_string()),
        serde_yaml_ng::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const fn is_prop_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == '=' || c == ':' || is_prop_whitespace(c) {
            let key = &line[..i];
            let mut rest = &line[i..];
            if is_prop_whitespace(c) {
                rest = rest.trim_start_matches(is_prop_whitespace);
                if rest.starts_with('=') || rest.starts_with(':') {
                    rest = &rest[1..];
                }
            } else {
                rest = &rest[1..];
            }
            return (key, rest.trim_start_matches(is_prop_whitespace));
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next_if(char::is_ascii_hexdigit)).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => out.push(decoded),
                    _ => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod properties_parser_tests {
        use super::*;

        #[test]
        fn test_simple_entries() {
            let entries = parse_properties("username=.id:=user|.tag:=input\nbutton=.text:=<label>\n");
            assert_eq!(
                entries,
                vec![
                    ("username".to_string(), ".id:=user|.tag:=input".to_string()),
                    ("button".to_string(), ".text:=<label>".to_string()),
                ]
            );
        }

        #[test]
        fn test_comments_and_blank_lines() {
            let entries = parse_properties("# header\n\n! bang comment\nkey=value\n");
            assert_eq!(entries, vec![("key".to_string(), "value".to_string())]);
        }

        #[test]
        fn test_colon_and_whitespace_separators() {
            let entries = parse_properties("a: 1\nb 2\nc = 3\n");
            assert_eq!(entries[0], ("a".to_string(), "1".to_string()));
            assert_eq!(entries[1], ("b".to_string(), "2".to_string()));
            assert_eq!(entries[2], ("c".to_string(), "3".to_string()));
        }

        #[test]
        fn test_line_continuation() {
            let entries = parse_properties("grid=.class:=Html.TABLE|\\\n    .id:=results\n");
            assert_eq!(entries[0].1, ".class:=Html.TABLE|.id:=results");
        }

        #[test]
        fn test_escaped_separator_in_key() {
            let entries = parse_properties("my\\=key=value");
            assert_eq!(entries[0], ("my=key".to_string(), "value".to_string()));
        }

        #[test]
        fn test_unicode_escape() {
            let entries = parse_properties("label=.text:=Caf\\u00e9");
            assert_eq!(entries[0].1, ".text:=Café");
        }

        #[test]
        fn test_malformed_unicode_escape_kept() {
            let entries = parse_properties("label=\\u00zz");
            assert_eq!(entries[0].1, "\\u00zz");
        }

        #[test]
        fn test_key_without_value() {
            let entries = parse_properties("lonely");
            assert_eq!(entries[0], ("lonely".to_string(), String::new()));
        }
    }

    mod file_store_tests {
        use super::*;

        fn write_page(dir: &TempDir, name: &str, content: &str) {
            fs::write(dir.path().join(name), content).unwrap();
        }

        #[test]
        fn test_properties_lookup() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "login.properties", "username=.id:=user\n");
            let store = FileStore::properties(dir.path());
            assert_eq!(store.lookup("login", "username").unwrap(), ".id:=user");
        }

        #[test]
        fn test_missing_page() {
            let dir = TempDir::new().unwrap();
            let store = FileStore::properties(dir.path());
            let err = store.lookup("nope", "x").unwrap_err();
            assert!(matches!(err, LocusError::Lookup { .. }));
            assert!(err.to_string().contains("not found"));
        }

        #[test]
        fn test_missing_object() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "login.properties", "username=.id:=user\n");
            let store = FileStore::properties(dir.path());
            let err = store.lookup("login", "password").unwrap_err();
            assert!(err.to_string().contains("'password' not defined"));
        }

        #[test]
        fn test_page_name_is_case_sensitive() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "Login.properties", "username=.id:=user\n");
            let store = FileStore::properties(dir.path());
            assert!(store.lookup("Login", "username").is_ok());
            if !dir.path().join("login.properties").exists() {
                assert!(store.lookup("login", "username").is_err());
            }
        }

        #[test]
        fn test_later_duplicate_wins() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "p.properties", "a=.id:=1\na=.id:=2\n");
            let store = FileStore::properties(dir.path());
            assert_eq!(store.lookup("p", "a").unwrap(), ".id:=2");
        }

        #[test]
        fn test_yaml_lookup() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "search.yaml", "query: \".id:=q|.tag:=input\"\ncount: 3\n");
            let store = FileStore::yaml(dir.path());
            assert_eq!(store.lookup("search", "query").unwrap(), ".id:=q|.tag:=input");
            assert_eq!(store.lookup("search", "count").unwrap(), "3");
        }

        #[test]
        fn test_invalid_yaml_is_lookup_error() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "bad.yaml", "- just\n- a list\n");
            let store = FileStore::yaml(dir.path());
            assert!(matches!(
                store.lookup("bad", "x").unwrap_err(),
                LocusError::Lookup { .. }
            ));
        }

        #[test]
        fn test_pages_lists_matching_files() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "b.properties", "");
            write_page(&dir, "a.properties", "");
            write_page(&dir, "notes.txt", "");
            let store = FileStore::properties(dir.path());
            assert_eq!(store.pages().unwrap(), vec!["a".to_string(), "b".to_string()]);
        }

        #[test]
        fn test_store_not_cached() {
            let dir = TempDir::new().unwrap();
            write_page(&dir, "p.properties", "a=.id:=1\n");
            let store = FileStore::properties(dir.path());
            assert_eq!(store.lookup("p", "a").unwrap(), ".id:=1");
            write_page(&dir, "p.properties", "a=.id:=2\n");
            assert_eq!(store.lookup("p", "a").unwrap(), ".id:=2");
        }
    }

    mod memory_store_tests {
        use super::*;

        #[test]
        fn test_insert_and_lookup() {
            let store = MemoryStore::new().with("login", "username", ".id:=user");
            assert_eq!(store.lookup("login", "username").unwrap(), ".id:=user");
        }

        #[test]
        fn test_replace_keeps_single_entry() {
            let mut store = MemoryStore::new();
            store.insert("p", "a", "1");
            store.insert("p", "a", "2");
            assert_eq!(store.entries("p").unwrap().len(), 1);
            assert_eq!(store.lookup("p", "a").unwrap(), "2");
        }

        #[test]
        fn test_remove() {
            let mut store = MemoryStore::new().with("p", "a", "1");
            assert_eq!(store.remove("p", "a"), Some("1".to_string()));
            assert!(store.lookup("p", "a").is_err());
        }

        #[test]
        fn test_page_format_from_str() {
            assert_eq!("YAML".parse::<PageFormat>().unwrap(), PageFormat::Yaml);
            assert_eq!("properties".parse::<PageFormat>().unwrap(), PageFormat::Properties);
            assert!("toml".parse::<PageFormat>().is_err());
        }
    }
}
