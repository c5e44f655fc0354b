//! Raw key/value preference store.

use crate::error::{PrefsError, PrefsResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// A process-wide string key/value store.
///
/// Values are overwritten, never deleted. Implementations must be safe to
/// share between tasks; concurrent writers resolve last-writer-wins.
pub trait PreferenceStore: Send + Sync {
    /// Returns the stored value for `key`.
    fn get(&self, key: &str) -> PrefsResult<Option<String>>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> PrefsResult<()>;
}

/// Preference store kept in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> PrefsResult<Option<String>> {
        let values = self.values.read().map_err(|_| PrefsError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PrefsResult<()> {
        let mut values = self.values.write().map_err(|_| PrefsError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
