//! Command handlers -- one module per subcommand

pub mod config;
pub mod policy;
pub mod scan;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use licensehub_core::config::LicenseHubConfig;
use licensehub_core::error::{ConfigError, LicenseHubError};
use licensehub_scanner::FileDocumentStore;

use crate::error::CliError;

/// Load the effective configuration for a command.
///
/// A missing config file is not an error: defaults plus environment
/// overrides are used instead. Parse and validation errors are returned.
pub async fn load_config(config_path: &Path) -> Result<LicenseHubConfig, CliError> {
    match LicenseHubConfig::load(config_path).await {
        Ok(config) => Ok(config),
        Err(LicenseHubError::Config(ConfigError::FileNotFound { path })) => {
            debug!(path = %path, "config file not found, using defaults");
            let mut config = LicenseHubConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

/// Open the settings document store configured in `[settings]`.
pub fn open_store(config: &LicenseHubConfig) -> Arc<FileDocumentStore> {
    Arc::new(FileDocumentStore::new(&config.settings.store_dir))
}
