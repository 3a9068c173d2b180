//! CLI configuration
//!
//! Read from `BILLING_`-prefixed environment variables:
//!
//! * `BILLING_DATA_FILE` - Snapshot document (default: billing.json)
//! * `BILLING_TIMEZONE` - IANA business timezone (default: UTC)
//! * `BILLING_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `BILLING_LOG_FORMAT` - pretty or json (default: pretty)

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use core_kernel::{CoreError, Timezone};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Snapshot document path
    pub data_file: PathBuf,
    /// Business timezone name
    pub timezone: String,
    /// Log level
    pub log_level: String,
    /// Log format
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("billing.json"),
            timezone: "UTC".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl CliConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("BILLING"))
    }

    /// Loads configuration from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("BILLING").source(Some(vars)))
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("data_file", defaults.data_file.to_string_lossy().into_owned())?
            .set_default("timezone", defaults.timezone)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Resolves the configured timezone
    pub fn timezone(&self) -> Result<Timezone, CoreError> {
        self.timezone
            .parse::<Timezone>()
            .map_err(|e| CoreError::configuration(format!("BILLING_TIMEZONE: {e}")))
    }
}
