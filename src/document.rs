//! On-disk configuration document with a schema version field.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::core::{MigrationError, Result, Value};

/// Reserved top-level key holding the document's schema version.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// An ordered, string-keyed configuration document.
///
/// Only the version field is interpreted here. Every other key passes
/// through a load-migrate-save cycle unchanged and in its original order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersionedDocument {
    fields: IndexMap<String, Value>,
}

impl VersionedDocument {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Loads a document from disk. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path).map_err(|e| {
            MigrationError::Io(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Ok(Some(Self::parse(&text)?))
    }

    /// Parses YAML text. The top level must be a mapping; an empty file
    /// parses as an empty document.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text)
            .map_err(|e| MigrationError::Parse(format!("Invalid YAML: {}", e)))?;
        match value {
            Value::Mapping(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::new()),
            other => Err(MigrationError::Parse(format!(
                "Top-level YAML node must be a mapping, got {}",
                other.type_name()
            ))),
        }
    }

    /// Serializes the document back to YAML, preserving key order.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            MigrationError::Serialize(format!("Cannot serialize config document: {}", e))
        })
    }

    /// Returns the document's schema version.
    ///
    /// An absent field means version 0. A present field must be a
    /// non-negative integer; anything else is a type error, never coerced.
    pub fn schema_version(&self) -> Result<u32> {
        match self.fields.get(SCHEMA_VERSION_KEY) {
            None => Ok(0),
            Some(Value::Integer(raw)) => u32::try_from(*raw).map_err(|_| {
                MigrationError::TypeMismatch(format!(
                    "{} must be a non-negative integer, got {}",
                    SCHEMA_VERSION_KEY, raw
                ))
            }),
            Some(other) => Err(MigrationError::TypeMismatch(format!(
                "{} must be an integer, got {}",
                SCHEMA_VERSION_KEY,
                other.type_name()
            ))),
        }
    }

    /// Sets the schema version field. An existing field keeps its position
    /// in the document; a new one is appended.
    pub fn set_schema_version(&mut self, version: u32) {
        self.fields
            .insert(SCHEMA_VERSION_KEY.to_string(), Value::Integer(version as i64));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for VersionedDocument {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(&self.fields)
    }
}
