//! Application configuration
//!
//! Process-level settings for the adapters, split by concern:
//! - `assets`: model cache directory, download limits, connectivity
//! - `session`: duplicate request handling
//! - `credentials`: optional engine client credentials
//!
//! Logging settings live in [`crate::telemetry::TelemetryConfig`].

mod assets;
mod credentials;
mod session;

use std::path::Path;

use application::error::ApplicationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

pub use assets::AssetsConfig;
pub use credentials::CredentialsConfig;
pub use session::SessionAppConfig;

/// Prefix of environment variable overrides (e.g., `SPEECHBRIDGE_ASSETS__CACHE_DIR`)
pub const ENV_PREFIX: &str = "SPEECHBRIDGE";

/// Default config file name, looked up in the working directory
const DEFAULT_FILE: &str = "speechbridge";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model asset configuration
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Speech session configuration
    #[serde(default)]
    pub session: SessionAppConfig,

    /// Log output configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Engine client credentials (optional)
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl AppConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Without an explicit path, `speechbridge.toml` in the working directory is
    /// used if present. Environment variables override file values, with `__`
    /// separating nested keys: `SPEECHBRIDGE_SESSION__DUPLICATE_REQUESTS=overwrite`.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_FILE).required(false),
        };

        let builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(cache_dir = %config.assets.cache_dir.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML document, without environment overrides
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Reject settings the adapters cannot work with
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.assets.download_timeout_secs == 0 {
            return Err(ApplicationError::Configuration(
                "assets.download_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.assets.max_model_bytes == 0 {
            return Err(ApplicationError::Configuration(
                "assets.max_model_bytes must be greater than zero".to_string(),
            ));
        }
        if self.assets.cache_dir.as_os_str().is_empty() {
            return Err(ApplicationError::Configuration(
                "assets.cache_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
