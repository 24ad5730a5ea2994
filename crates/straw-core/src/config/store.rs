//! Configuration store with local key-value persistence

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ConfigUpdate, Configuration};
use crate::constants::{CONFIG_FORMAT_VERSION, CONFIG_STORAGE_KEY};

/// Local device key-value storage (browser local storage, app data file, ...)
pub trait KeyValueStorage {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory storage, used when the platform offers no persistence
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// On-disk form of the configuration, tagged with a format version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedConfig {
    pub version: u32,
    pub config: Configuration,
}

impl PersistedConfig {
    /// Serialize to RON text
    pub fn to_ron(&self) -> Result<String, StoreError> {
        ron::to_string(self).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    /// Parse RON text, rejecting other format versions
    pub fn from_ron(text: &str) -> Result<Self, StoreError> {
        let persisted: PersistedConfig =
            ron::from_str(text).map_err(|e| StoreError::Deserialize(e.to_string()))?;
        if persisted.version != CONFIG_FORMAT_VERSION {
            return Err(StoreError::VersionMismatch {
                found: persisted.version,
                expected: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(persisted)
    }
}

/// Holds the single mutable configuration and mirrors it to storage
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: Configuration,
}

impl ConfigStore {
    /// Load the persisted configuration, falling back to defaults when the
    /// entry is absent or malformed
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        let Some(text) = storage.get_string(CONFIG_STORAGE_KEY) else {
            tracing::debug!("No persisted configuration, using defaults");
            return Self::default();
        };

        match PersistedConfig::from_ron(&text) {
            Ok(persisted) => {
                tracing::info!("Loaded persisted configuration");
                Self {
                    config: persisted.config.normalized(),
                }
            }
            Err(e) => {
                tracing::warn!("Discarding persisted configuration: {}", e);
                Self::default()
            }
        }
    }

    /// Current configuration
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Apply a single-field update and persist the result
    pub fn update(&mut self, storage: &mut dyn KeyValueStorage, update: ConfigUpdate) {
        let next = self.config.apply(update);
        self.replace_with(storage, next);
    }

    /// Replace the configuration with a value derived from the current one
    pub fn modify(
        &mut self,
        storage: &mut dyn KeyValueStorage,
        f: impl FnOnce(&Configuration) -> Configuration,
    ) {
        let next = f(&self.config).normalized();
        self.replace_with(storage, next);
    }

    /// Restore defaults and clear the persisted entry
    pub fn reset(&mut self, storage: &mut dyn KeyValueStorage) {
        self.config = Configuration::default();
        storage.remove(CONFIG_STORAGE_KEY);
        tracing::info!("Configuration reset to defaults");
    }

    fn replace_with(&mut self, storage: &mut dyn KeyValueStorage, next: Configuration) {
        if next == self.config {
            return;
        }
        self.config = next;
        self.persist(storage);
    }

    fn persist(&self, storage: &mut dyn KeyValueStorage) {
        let persisted = PersistedConfig {
            version: CONFIG_FORMAT_VERSION,
            config: self.config.clone(),
        };
        match persisted.to_ron() {
            Ok(text) => storage.set_string(CONFIG_STORAGE_KEY, text),
            Err(e) => tracing::warn!("Failed to persist configuration: {}", e),
        }
    }
}

/// Store-related errors (always recovered inside the store)
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Unsupported format version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}
