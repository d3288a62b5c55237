//! Key/value persistence
//!
//! The game persists a handful of string entries (LocalStorage on web). All
//! writes are best-effort: callers log failures and keep their in-memory
//! values.

use std::collections::HashMap;

use thiserror::Error;

/// Storage keys
pub mod keys {
    pub const HIGH_SCORE: &str = "llamaRunnerHighScore";
    pub const TOTAL_COINS: &str = "llamaRunnerTotalCoins";
    pub const PURCHASED_COLORS: &str = "llamaRunnerPurchasedColors";
    pub const EQUIPPED_COLOR: &str = "llamaRunnerEquippedColor";
    pub const NO_ADS: &str = "llamaRunnerNoAds";
    pub const SETTINGS: &str = "llamaRunnerSettings";
}

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// No backend could be reached (e.g. LocalStorage disabled)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading a key failed
    #[error("Failed to read '{key}': {details}")]
    Read { key: String, details: String },

    /// Writing a key failed (quota, private mode, ...)
    #[error("Failed to write '{key}': {details}")]
    Write { key: String, details: String },
}

/// String key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate entries
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Write a value, logging (not surfacing) failures. Returns whether it stuck.
pub fn store_best_effort<S: Storage + ?Sized>(storage: &mut S, key: &str, value: &str) -> bool {
    match storage.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Error saving data to storage: {e}");
            false
        }
    }
}
