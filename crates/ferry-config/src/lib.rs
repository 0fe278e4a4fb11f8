//! # ferry-config
//!
//! Layered configuration loading for the ferry clients using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FERRY_*` prefix, `__` as separator)
//! 2. Project-level `.ferry/config.toml`
//! 3. User-level `~/.config/ferry/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `FERRY_API__BASE_URL` -> `api.base_url`,
//! `FERRY_RETRY__BASE_DELAY_MS` -> `retry.base_delay_ms`, etc.
//!
//! ```no_run
//! use ferry_config::FerryConfig;
//!
//! let config = FerryConfig::load_with_dotenv().expect("config");
//! println!("{} via {}", config.api.app, config.api.base_url);
//! ```

mod api;
mod error;
mod queue;
mod retry;
mod storage;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use queue::QueueConfig;
pub use retry::RetryConfig;
pub use storage::StorageConfig;

use std::path::PathBuf;
use std::time::Duration;

use ferry_core::AppKind;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FerryConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

impl FerryConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so the CLI can layer flag overrides on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".ferry/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("FERRY_").split("__"))
    }

    /// Reject values that would make the client unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty base URL or a zero
    /// timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn app(&self) -> AppKind {
        self.api.app
    }

    /// Effective request timeout for the configured app.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.api
                .timeout_secs
                .unwrap_or_else(|| self.api.app.default_timeout_secs()),
        )
    }

    /// Whether the generic transient-failure retry layer is active.
    #[must_use]
    pub fn retry_enabled(&self) -> bool {
        self.retry
            .enabled
            .unwrap_or_else(|| self.api.app.retries_by_default())
    }

    /// Keyring service name, defaulting to `ferry-<app>`.
    #[must_use]
    pub fn keyring_service(&self) -> String {
        self.storage
            .keyring_service
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("ferry-{}", self.api.app))
    }

    /// Directory for the plain key-value file, defaulting to `<data_dir>/ferry/<app>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] if no platform data directory
    /// exists and none was configured.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = self.storage.data_dir.as_ref().filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::data_dir()
            .map(|d| d.join("ferry").join(self.api.app.as_str()))
            .ok_or_else(|| ConfigError::NotConfigured {
                section: "storage.data_dir".into(),
            })
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ferry").join("config.toml"))
    }
}
