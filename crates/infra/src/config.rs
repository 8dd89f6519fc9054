//! Store configuration loaded from the environment.
//!
//! | variable | meaning |
//! |---|---|
//! | `PANTRY_STORE_BACKEND` | `firestore` (default) or `memory` |
//! | `PANTRY_FIRESTORE_PROJECT_ID` | required for `firestore` |
//! | `PANTRY_FIRESTORE_API_KEY` | optional web API key |
//! | `PANTRY_FIRESTORE_BASE_URL` | defaults to `https://firestore.googleapis.com` |
//! | `PANTRY_SEARCH_DEBOUNCE_MS` | search refresh delay, defaults to 300 |
//!
//! Empty values count as unset.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::data_access::StoreHandle;
use crate::store::{FirestoreStore, InMemoryPantryStore};

pub const ENV_BACKEND: &str = "PANTRY_STORE_BACKEND";
pub const ENV_PROJECT_ID: &str = "PANTRY_FIRESTORE_PROJECT_ID";
pub const ENV_API_KEY: &str = "PANTRY_FIRESTORE_API_KEY";
pub const ENV_BASE_URL: &str = "PANTRY_FIRESTORE_BASE_URL";
pub const ENV_DEBOUNCE_MS: &str = "PANTRY_SEARCH_DEBOUNCE_MS";

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which document store backs the data access layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local store; data is lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                name: ENV_BACKEND,
                reason: format!("unknown backend '{other}'"),
            }),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub base_url: String,
    pub search_debounce: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("search_debounce", &self.search_debounce)
            .finish()
    }
}

impl StoreConfig {
    /// Config for a process-local store (tests, demos).
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            project_id: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match get(ENV_BACKEND) {
            Some(raw) => raw.parse()?,
            None => StoreBackend::Firestore,
        };

        let project_id = get(ENV_PROJECT_ID);
        if backend == StoreBackend::Firestore && project_id.is_none() {
            return Err(ConfigError::Missing(ENV_PROJECT_ID));
        }

        let search_debounce = match get(ENV_DEBOUNCE_MS) {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: ENV_DEBOUNCE_MS,
                    reason: e.to_string(),
                })?;
                Duration::from_millis(ms)
            }
            None => DEFAULT_SEARCH_DEBOUNCE,
        };

        Ok(Self {
            backend,
            project_id,
            api_key: get(ENV_API_KEY),
            base_url: get(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            search_debounce,
        })
    }

    /// Construct the store client this config describes.
    pub fn connect(&self) -> Result<StoreHandle, ConfigError> {
        match self.backend {
            StoreBackend::Memory => {
                tracing::info!("using in-memory pantry store");
                Ok(StoreHandle::connected(InMemoryPantryStore::new()))
            }
            StoreBackend::Firestore => {
                let project_id = self
                    .project_id
                    .as_deref()
                    .ok_or(ConfigError::Missing(ENV_PROJECT_ID))?;
                tracing::info!(project_id, base_url = %self.base_url, "using firestore pantry store");
                Ok(StoreHandle::connected(FirestoreStore::new(
                    &self.base_url,
                    project_id,
                    self.api_key.clone(),
                )))
            }
        }
    }
}
