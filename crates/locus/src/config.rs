//! Executor configuration
//!
//! Loaded from JSON or YAML; every field has a default so partial files
//! are accepted.
//!
//! ```yaml
//! retry_count: 5
//! retry_interval_ms: 500
//! browser: firefox
//! pages_dir: Pages
//! ```

use crate::finder::{RetryPolicy, DEFAULT_RETRY_COUNT};
use crate::result::{LocusError, LocusResult};
use crate::store::{PageFormat, DEFAULT_PAGES_DIR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default scratch store file
pub const DEFAULT_DATA_STORE: &str = "project_data.json";

/// Configuration fixed for the lifetime of one command executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Attempts per element search and per action
    pub retry_count: u32,
    /// Pause between attempts, in milliseconds
    pub retry_interval_ms: u64,
    /// Browser launched by `open`
    pub browser: String,
    /// Directory holding page files
    pub pages_dir: PathBuf,
    /// Page file format
    pub page_format: PageFormat,
    /// Scratch store file
    pub data_store_path: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_interval_ms: 1000,
            browser: "iexplore".to_string(),
            pages_dir: PathBuf::from(DEFAULT_PAGES_DIR),
            page_format: PageFormat::Properties,
            data_store_path: PathBuf::from(DEFAULT_DATA_STORE),
        }
    }
}

impl ExecutorConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set retry count
    #[must_use]
    pub const fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set retry interval in milliseconds
    #[must_use]
    pub const fn with_retry_interval_ms(mut self, ms: u64) -> Self {
        self.retry_interval_ms = ms;
        self
    }

    /// Set browser
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Set pages directory
    #[must_use]
    pub fn with_pages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pages_dir = dir.into();
        self
    }

    /// Set page file format
    #[must_use]
    pub const fn with_page_format(mut self, format: PageFormat) -> Self {
        self.page_format = format;
        self
    }

    /// Set scratch store path
    #[must_use]
    pub fn with_data_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_store_path = path.into();
        self
    }

    /// Retry policy derived from this configuration
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.retry_interval_ms))
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns error if `retry_count` is zero
    pub fn validate(&self) -> LocusResult<()> {
        if self.retry_count == 0 {
            return Err(LocusError::config("retry_count must be at least 1"));
        }
        Ok(())
    }

    /// Load from a `.json`, `.yaml` or `.yml` file and validate
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, has an unknown extension,
    /// fails to parse, or does not validate
    pub fn from_path(path: &Path) -> LocusResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let config: Self = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("yaml" | "yml") => serde_yaml_ng::from_str(&content)?,
            _ => {
                return Err(LocusError::config(format!(
                    "unsupported config file '{}': expected .json, .yaml or .yml",
                    path.display()
                )))
            }
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let c = ExecutorConfig::default();
        assert_eq!(c.retry_count, 12);
        assert_eq!(c.retry_interval_ms, 1000);
        assert_eq!(c.pages_dir, PathBuf::from("Pages"));
        assert_eq!(c.data_store_path, PathBuf::from("project_data.json"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_retry_policy() {
        let p = ExecutorConfig::new()
            .with_retry_count(3)
            .with_retry_interval_ms(20)
            .retry_policy();
        assert_eq!(p, RetryPolicy::new(3, Duration::from_millis(20)));
    }

    #[test]
    fn test_zero_retry_rejected() {
        let err = ExecutorConfig::new().with_retry_count(0).validate().unwrap_err();
        assert!(matches!(err, LocusError::Config { .. }));
    }

    #[test]
    fn test_partial_yaml() {
        let (_dir, path) = write("locus.yaml", "retry_count: 4\nbrowser: firefox\n");
        let c = ExecutorConfig::from_path(&path).unwrap();
        assert_eq!(c.retry_count, 4);
        assert_eq!(c.browser, "firefox");
        assert_eq!(c.retry_interval_ms, 1000);
    }

    #[test]
    fn test_json() {
        let (_dir, path) = write(
            "locus.json",
            r#"{"retry_interval_ms": 50, "page_format": "yaml"}"#,
        );
        let c = ExecutorConfig::from_path(&path).unwrap();
        assert_eq!(c.retry_interval_ms, 50);
        assert_eq!(c.page_format, PageFormat::Yaml);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let (_dir, path) = write("locus.yml", "retry_count: 0\n");
        assert!(ExecutorConfig::from_path(&path).is_err());
    }

    #[test]
    fn test_unknown_extension() {
        let (_dir, path) = write("locus.toml", "retry_count = 3\n");
        let err = ExecutorConfig::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config file"));
    }
}
