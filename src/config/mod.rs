//! Application configuration module
//!
//! Configuration is read from environment variables using the `config` and
//! `dotenvy` crates. Variables carry the `BAAP` prefix and nested values are
//! separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use baap_guarantee::config::{init_tracing, AppConfig};
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! init_tracing(&config.telemetry).expect("Failed to install subscriber");
//! ```

mod contract;
mod error;
mod pipeline;
mod telemetry;
mod validation;

pub use contract::ContractConfig;
pub use error::{ConfigError, ValidationError};
pub use pipeline::{AllocationConfig, PipelineConfig};
pub use telemetry::{init_tracing, TelemetryConfig};
pub use validation::ValidationConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults except the contract signing key, which
/// [`AppConfig::validate()`] requires.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Guarantee targets, budget limits and default allocation
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Itinerary validation engine limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Contract provider identity and commercial terms
    #[serde(default)]
    pub contract: ContractConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `BAAP` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `BAAP__PIPELINE__GUARANTEE_TARGET=0.9` -> `pipeline.guarantee_target = 0.9`
    /// - `BAAP__PIPELINE__ALLOCATION__FOOD=0.25` -> `pipeline.allocation.food = 0.25`
    /// - `BAAP__CONTRACT__SIGNING_KEY=...` -> `contract.signing_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().prefix("BAAP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pipeline.validate()?;
        self.validation.validate()?;
        self.contract.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BAAP__CONTRACT__SIGNING_KEY",
        "BAAP__CONTRACT__VALIDITY_DAYS",
        "BAAP__PIPELINE__GUARANTEE_TARGET",
        "BAAP__PIPELINE__ALLOCATION__FOOD",
        "BAAP__PIPELINE__ALLOCATION__MISCELLANEOUS",
        "BAAP__VALIDATION__TIMEOUT_MS",
        "BAAP__TELEMETRY__JSON",
    ];

    fn set_minimal_env() {
        env::set_var("BAAP__CONTRACT__SIGNING_KEY", "test-signing-key");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.contract.signing_key.expose_secret(), "test-signing-key");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pipeline_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.guarantee_target, 0.95);
        assert_eq!(config.pipeline.max_budget_increase, 0.2);
        assert_eq!(config.validation.timeout_ms, 5000);
        assert_eq!(config.contract.validity_days, 30);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BAAP__PIPELINE__GUARANTEE_TARGET", "0.9");
        env::set_var("BAAP__PIPELINE__ALLOCATION__FOOD", "0.15");
        env::set_var("BAAP__PIPELINE__ALLOCATION__MISCELLANEOUS", "0.15");
        env::set_var("BAAP__VALIDATION__TIMEOUT_MS", "250");
        env::set_var("BAAP__TELEMETRY__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.guarantee_target, 0.9);
        assert_eq!(config.pipeline.allocation.food, 0.15);
        assert_eq!(config.validation.timeout_ms, 250);
        assert!(config.telemetry.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_signing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("CONTRACT__SIGNING_KEY"))
        ));
    }

    #[test]
    fn test_unparseable_value_is_a_load_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("BAAP__CONTRACT__VALIDITY_DAYS", "a month");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
