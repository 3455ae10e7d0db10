//! Configuration management for the CloudWatch metrics adapter.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Section-wise validation

mod controller;
mod log;
mod monitoring;
mod retry;
mod server;
mod store;
pub use controller::*;
pub use log::*;
pub use monitoring::*;
pub use retry::*;
pub use server::*;
pub use store::*;

#[cfg(test)]
mod config_test;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Prefix of environment variables overriding configuration values,
/// e.g. `ADAPTER__CONTROLLER__WORKERS=4`
pub(crate) const ENV_PREFIX: &str = "ADAPTER";

/// Main configuration container for the adapter components
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AdapterConfig {
    /// Worker pool and retry budget
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Work queue rate limiting and backoff
    #[serde(default)]
    pub retry: RateLimitPolicy,
    /// External metrics read API
    #[serde(default)]
    pub server: ServerConfig,
    /// Metrics and monitoring settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Source of ExternalMetric manifests
    #[serde(default)]
    pub store: StoreConfig,
    /// Log output
    #[serde(default)]
    pub log: LogConfig,
}

impl AdapterConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `ADAPTER__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so that `with_override_config()` can still be
    /// applied. Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/adapter.toml");
    /// std::env::set_var("ADAPTER__CONTROLLER__WORKERS", "4");
    /// let cfg = AdapterConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` from the first section that fails, or
    /// when the API server and the exporter are configured on the same port.
    pub fn validate(self) -> Result<Self> {
        self.controller.validate()?;
        self.retry.validate()?;
        self.server.validate()?;
        self.monitoring.validate()?;
        self.store.validate()?;
        self.log.validate()?;

        if self.server.enabled
            && self.monitoring.prometheus_enabled
            && self.server.listen_address.port() == self.monitoring.prometheus_port
        {
            return Err(Error::InvalidConfig(format!(
                "server and monitoring cannot share port {}",
                self.monitoring.prometheus_port
            )));
        }
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
