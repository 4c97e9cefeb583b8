// SPDX-License-Identifier: Apache-2.0
//! Configuration storage port and the typed service built over it. The
//! concrete backend (filesystem, browser storage, …) is an external
//! collaborator; this crate only defines the contract and the
//! (de)serialization layer above it.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage port for raw config blobs, keyed by logical name.
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No blob stored under this key.
    #[error("not found")]
    NotFound,
    /// Serialization or deserialization failed.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The backend failed for a reason outside this crate's model.
    #[error("config store error: {0}")]
    Backend(String),
}

/// Thin service that (de)serializes typed config values and delegates
/// raw storage to a [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Build a service over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize the value stored under `key`. Returns
    /// `Ok(None)` if nothing is stored there.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Serialize and persist `value` under `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}

/// In-memory [`ConfigStore`], useful for tests and local-only mode.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    blobs: std::sync::Mutex<std::collections::HashMap<String, Vec<u8>>>,
}

impl MemoryConfigStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        #[allow(clippy::unwrap_used)]
        self.blobs.lock().unwrap().get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        #[allow(clippy::unwrap_used)]
        self.blobs.lock().unwrap().insert(key.to_string(), data.to_vec());
        Ok(())
    }
}
