//! Application configuration module
//!
//! Runtime settings load type-safely from environment variables using the
//! `config` and `dotenvy` crates with the `ZANSEI` prefix; nested values
//! use double underscores as separators. Funnel catalogs load separately
//! from JSON via [`FunnelCatalog`] and are shared immutably.
//!
//! # Example
//!
//! ```no_run
//! use zansei_intake::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod funnel;
mod oracle;

pub use error::{CatalogError, ConfigError, ValidationError};
pub use funnel::{FunnelCatalog, FunnelDefinition};
pub use oracle::OracleConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Extraction oracle configuration (API key, model, deadlines)
    #[serde(default)]
    pub oracle: OracleConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ZANSEI` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ZANSEI__ORACLE__API_KEY=sk-...` -> `oracle.api_key = ...`
    /// - `ZANSEI__ORACLE__TIMEOUT_SECS=30` -> `oracle.timeout_secs = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("ZANSEI").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.oracle.validate()?;
        Ok(())
    }
}
