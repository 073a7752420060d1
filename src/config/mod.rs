//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config`
//! and `dotenvy` crates. Values come from an optional YAML file and from
//! environment variables with the `CREDIT_BRIDGE` prefix; nested values use
//! double underscores as separators. Environment variables win.
//!
//! # Example
//!
//! ```no_run
//! use credit_bridge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.bind_address());
//! ```

mod directory;
mod error;
mod idempotency;
mod payment;
mod pricing;
mod server;

pub use directory::DirectoryConfig;
pub use error::{ConfigError, ValidationError};
pub use idempotency::IdempotencyConfig;
pub use payment::PaymentConfig;
pub use pricing::{CreditPack, PricingConfig};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "CREDIT_BRIDGE";

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "CREDIT_BRIDGE_CONFIG";

/// Config file read when `CREDIT_BRIDGE_CONFIG` is unset, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "credit-bridge.yaml";

/// Root application configuration
///
/// Load using [`AppConfig::load()`], then call [`AppConfig::validate()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment configuration (Stripe)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Member directory configuration (Memberstack)
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Price-to-credits table
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Webhook deduplication
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
}

impl AppConfig {
    /// Load configuration from the config file and environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the YAML file named by `CREDIT_BRIDGE_CONFIG` (required), or
    ///    `credit-bridge.yaml` if present
    /// 3. Reads environment variables with `CREDIT_BRIDGE` prefix, using
    ///    `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CREDIT_BRIDGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CREDIT_BRIDGE__PRICING__TABLE=price_a=1,price_b=3` -> `pricing.table`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the named file is missing or values cannot
    /// be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let (path, required) = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        Self::load_from(&path, required)
    }

    /// Load configuration from a specific YAML file plus the environment.
    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(required),
            )
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
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
        self.server.validate()?;
        self.payment.validate()?;
        self.directory.validate()?;
        self.pricing.validate()?;
        self.idempotency.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
