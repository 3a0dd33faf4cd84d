//! Typed key/value scratch storage shared between script steps.
//!
//! Values are stored as text together with their declared [`ValueType`].
//! The type is checked when storing and again when retrieving.

use crate::result::{LocusError, LocusResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Declared type of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Any text
    String,
    /// 32-bit signed integer
    Int,
    /// Floating point number
    Float,
    /// `true` or `false`, any case
    Boolean,
}

impl ValueType {
    /// Check that `value` can be read as this type
    ///
    /// # Errors
    ///
    /// Returns [`LocusError::DataStore`] if the text does not parse
    pub fn validate(self, value: &str) -> LocusResult<()> {
        let ok = match self {
            Self::String => true,
            Self::Int => value.trim().parse::<i32>().is_ok(),
            Self::Float => value.trim().parse::<f64>().is_ok(),
            Self::Boolean => parse_bool(value).is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(LocusError::data_store(format!(
                "Cannot convert '{value}' to {self}"
            )))
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
        };
        f.write_str(name)
    }
}

impl FromStr for ValueType {
    type Err = LocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            _ => Err(LocusError::data_store(format!("unknown value type '{s}'"))),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// One stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// Text as given to `store`
    pub value: String,
    /// Declared type
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

/// Backend for scratch values
pub trait ScratchStore {
    /// Insert or overwrite `key`
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot persist the value
    fn put(&mut self, key: &str, value: StoredValue) -> LocusResult<()>;

    /// Stored value for `key`, if any
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read
    fn get(&self, key: &str) -> LocusResult<Option<StoredValue>>;

    /// Validate and store `value` as `value_type`
    ///
    /// # Errors
    ///
    /// Returns error if the value does not parse as the type or cannot be persisted
    fn store(&mut self, key: &str, value_type: ValueType, value: &str) -> LocusResult<()> {
        value_type.validate(value)?;
        self.put(
            key,
            StoredValue {
                value: value.to_string(),
                value_type,
            },
        )
    }

    /// Stored text for `key`, which must have been stored as `expected`
    ///
    /// # Errors
    ///
    /// Returns error if nothing is stored under `key` or it has another type
    fn retrieve(&self, key: &str, expected: ValueType) -> LocusResult<String> {
        let stored = self
            .get(key)?
            .ok_or_else(|| LocusError::data_store(format!("no value stored for key '{key}'")))?;
        if stored.value_type != expected {
            return Err(LocusError::data_store(format!(
                "Trying to retrieve : {expected}, found : {}",
                stored.value_type
            )));
        }
        Ok(stored.value)
    }

    /// Retrieve a string value
    ///
    /// # Errors
    ///
    /// See [`retrieve`](Self::retrieve)
    fn retrieve_string(&self, key: &str) -> LocusResult<String> {
        self.retrieve(key, ValueType::String)
    }

    /// Retrieve an integer value
    ///
    /// # Errors
    ///
    /// See [`retrieve`](Self::retrieve); also fails if the text does not parse
    fn retrieve_int(&self, key: &str) -> LocusResult<i32> {
        let raw = self.retrieve(key, ValueType::Int)?;
        raw.trim().parse().map_err(|_| {
            LocusError::data_store(format!("Cannot parse the retrieved value to Integer. Value : {raw}"))
        })
    }

    /// Retrieve a float value
    ///
    /// # Errors
    ///
    /// See [`retrieve`](Self::retrieve); also fails if the text does not parse
    fn retrieve_float(&self, key: &str) -> LocusResult<f64> {
        let raw = self.retrieve(key, ValueType::Float)?;
        raw.trim().parse().map_err(|_| {
            LocusError::data_store(format!("Cannot parse the retrieved value to Float. Value : {raw}"))
        })
    }

    /// Retrieve a boolean value
    ///
    /// # Errors
    ///
    /// See [`retrieve`](Self::retrieve); also fails if the text is not a boolean
    fn retrieve_boolean(&self, key: &str) -> LocusResult<bool> {
        let raw = self.retrieve(key, ValueType::Boolean)?;
        parse_bool(&raw).ok_or_else(|| {
            LocusError::data_store(format!("Cannot parse the retrieved value to Boolean. Value : {raw}"))
        })
    }
}

/// In-memory scratch store
#[derive(Debug, Clone, Default)]
pub struct MemoryScratchStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryScratchStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ScratchStore for MemoryScratchStore {
    fn put(&mut self, key: &str, value: StoredValue) -> LocusResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> LocusResult<Option<StoredValue>> {
        Ok(self.values.get(key).cloned())
    }
}

/// Scratch store persisted as a JSON object, re-read on every access
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> LocusResult<BTreeMap<String, StoredValue>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ScratchStore for JsonFileStore {
    fn put(&mut self, key: &str, value: StoredValue) -> LocusResult<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value);
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        tracing::debug!(key, path = %self.path.display(), "scratch value stored");
        Ok(())
    }

    fn get(&self, key: &str) -> LocusResult<Option<StoredValue>> {
        Ok(self.load()?.remove(key))
    }
}
