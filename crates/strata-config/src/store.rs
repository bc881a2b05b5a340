//! In-memory hierarchical configuration store

use crate::{ConfigPath, Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Leaf value stored in the configuration namespace.
pub type ConfigValue = serde_json::Value;

/// Hierarchical key/value store addressed by [`ConfigPath`].
///
/// Values are kept flat, keyed by their full path. A path may hold a value
/// and be the prefix of other paths at the same time: a resolved layer node
/// stores its instance name while the settings of the layers beneath it
/// live under the same prefix.
///
/// Deserializing accepts nested objects (flattened into dotted paths) as
/// well as flat maps keyed by dotted paths. Serializing always produces the
/// flat form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HierarchicalConfig {
    values: BTreeMap<ConfigPath, ConfigValue>,
}

impl HierarchicalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON value, flattening nested objects.
    ///
    /// A non-object value is stored at the root path.
    pub fn from_value(value: ConfigValue) -> Self {
        let mut config = Self::new();
        config.absorb(&ConfigPath::root(), value);
        config
    }

    fn absorb(&mut self, prefix: &ConfigPath, value: ConfigValue) {
        match value {
            ConfigValue::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    self.absorb(&prefix.join(&key), child);
                }
            }
            other => {
                self.values.insert(prefix.clone(), other);
            }
        }
    }

    /// Read the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if no value is stored at `path`.
    pub fn read(&self, path: impl Into<ConfigPath>) -> Result<&ConfigValue> {
        let path = path.into();
        self.values.get(&path).ok_or_else(|| Error::KeyNotFound {
            path: path.to_string(),
        })
    }

    pub fn get(&self, path: impl Into<ConfigPath>) -> Option<&ConfigValue> {
        self.values.get(&path.into())
    }

    pub fn contains(&self, path: impl Into<ConfigPath>) -> bool {
        self.values.contains_key(&path.into())
    }

    /// Write a single value, replacing any previous value at `path`.
    pub fn write(&mut self, path: impl Into<ConfigPath>, value: impl Into<ConfigValue>) {
        let path = path.into();
        tracing::trace!(%path, "config write");
        self.values.insert(path, value.into());
    }

    pub fn remove(&mut self, path: impl Into<ConfigPath>) -> Option<ConfigValue> {
        self.values.remove(&path.into())
    }

    /// Every value strictly below `path`, re-rooted relative to `path`.
    ///
    /// The value stored at `path` itself is not part of its branch.
    pub fn branch(&self, path: impl Into<ConfigPath>) -> HierarchicalConfig {
        let path = path.into();
        let values = self
            .values
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&path)
                    .filter(|rest| !rest.is_root())
                    .map(|rest| (rest, value.clone()))
            })
            .collect();
        Self { values }
    }

    /// Write every value of `branch` beneath `prefix`.
    pub fn splice(&mut self, prefix: impl Into<ConfigPath>, branch: &HierarchicalConfig) {
        let prefix = prefix.into();
        for (key, value) in &branch.values {
            self.values.insert(prefix.join(key), value.clone());
        }
    }

    /// Overlay `other` onto this store; values from `other` win.
    pub fn merge(&mut self, other: &HierarchicalConfig) {
        self.splice(ConfigPath::root(), other);
    }

    pub fn get_str(&self, path: impl Into<ConfigPath>) -> Option<&str> {
        self.get(path).and_then(ConfigValue::as_str)
    }

    pub fn get_u64(&self, path: impl Into<ConfigPath>) -> Option<u64> {
        self.get(path).and_then(ConfigValue::as_u64)
    }

    pub fn get_bool(&self, path: impl Into<ConfigPath>) -> Option<bool> {
        self.get(path).and_then(ConfigValue::as_bool)
    }

    /// Read a string value, failing if it is absent or not a string.
    pub fn read_str(&self, path: impl Into<ConfigPath>) -> Result<&str> {
        let path = path.into();
        self.read(&path)?.as_str().ok_or_else(|| Error::TypeMismatch {
            path: path.to_string(),
            expected: "string",
        })
    }

    /// Read an unsigned integer value, failing if it is absent or not one.
    pub fn read_u64(&self, path: impl Into<ConfigPath>) -> Result<u64> {
        let path = path.into();
        self.read(&path)?.as_u64().ok_or_else(|| Error::TypeMismatch {
            path: path.to_string(),
            expected: "unsigned integer",
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConfigPath, &ConfigValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'de> Deserialize<'de> for HierarchicalConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        ConfigValue::deserialize(deserializer).map(Self::from_value)
    }
}

impl FromIterator<(ConfigPath, ConfigValue)> for HierarchicalConfig {
    fn from_iter<I: IntoIterator<Item = (ConfigPath, ConfigValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
