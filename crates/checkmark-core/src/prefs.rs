use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::tasks::Theme;

/// Fixed key holding the dark-mode flag.
pub const THEME_KEY: &str = "darkMode";

/// Errors produced by local preference stores.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefsError {
    /// Requested key does not exist.
    #[error("entry not found for key: {key}")]
    NotFound { key: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Local key-value store for small client-side preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Persist a value under a key, overwriting any existing entry.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), PrefsError>;

    /// Retrieve the value for a key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, PrefsError>;
}

/// In-memory preference store for tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPreferenceStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), PrefsError> {
        let mut map = self.inner.lock().map_err(|err| PrefsError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, PrefsError> {
        let map = self.inner.lock().map_err(|err| PrefsError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.get(key).cloned().ok_or_else(|| PrefsError::NotFound {
            key: key.to_string(),
        })
    }
}

/// Read the persisted theme, falling back to light when absent or unreadable.
pub async fn load_theme<S: PreferenceStore + ?Sized>(store: &S) -> Theme {
    match store.get(THEME_KEY).await {
        Ok(bytes) => match serde_json::from_slice::<Option<bool>>(&bytes) {
            Ok(flag) => Theme::from_dark_flag(flag.unwrap_or(false)),
            Err(err) => {
                warn!("ignoring malformed theme preference: {err}");
                Theme::Light
            }
        },
        Err(PrefsError::NotFound { .. }) => Theme::Light,
        Err(err) => {
            warn!("could not read theme preference: {err}");
            Theme::Light
        }
    }
}

/// Persist the theme as a JSON boolean (`true` = dark).
pub async fn save_theme<S: PreferenceStore + ?Sized>(
    store: &S,
    theme: Theme,
) -> Result<(), PrefsError> {
    let bytes = serde_json::to_vec(&theme.is_dark()).map_err(|e| PrefsError::Storage {
        reason: e.to_string(),
    })?;
    store.put(THEME_KEY, &bytes).await
}
