//! Layered application configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. the TOML file passed on the command line (optional)
//! 3. `GATEHOUSE__*` environment variables, `__` separating nested keys,
//!    e.g. `GATEHOUSE__SESSION__TOKEN_MODE=double`

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config as ConfigLoader, Environment, File};
use gatehouse_domain::SessionConfig;
use gatehouse_infrastructure::FileKeyValueStore;
use serde::Deserialize;

const ENV_PREFIX: &str = "GATEHOUSE";
const FALLBACK_STORAGE_FILE: &str = "gatehouse-session.json";

/// Everything the binary needs to wire a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Session file; the platform data dir when unset.
    pub storage_path: Option<PathBuf>,
    /// Session core settings.
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage_path: None,
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or a value
    /// has the wrong type.
    pub fn load(config_file: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = config_file.as_ref();
        let config = ConfigLoader::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(config)
    }

    /// Session file to use.
    #[must_use]
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .or_else(FileKeyValueStore::default_path)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_STORAGE_FILE))
    }
}
