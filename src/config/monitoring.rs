use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::Error;
use crate::Result;

/// Prometheus exporter for the adapter's own work queue and reconcile metrics
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub prometheus_enabled: bool,

    /// Port of the `/metrics` endpoint
    #[serde(default = "default_prometheus_port")]
    pub prometheus_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: false,
            prometheus_port: default_prometheus_port(),
        }
    }
}

impl MonitoringConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` when the exporter is enabled on port 0,
    /// on a privileged port, or on a port that cannot be bound.
    pub fn validate(&self) -> Result<()> {
        if !self.prometheus_enabled {
            if self.prometheus_port != default_prometheus_port() {
                warn!(
                    "monitoring.prometheus_port set to {} but the exporter is disabled",
                    self.prometheus_port
                );
            }
            return Ok(());
        }

        match self.prometheus_port {
            0 => Err(Error::InvalidConfig(
                "monitoring.prometheus_port cannot be 0 when enabled".into(),
            )),
            p if p < 1024 => Err(Error::InvalidConfig(format!(
                "monitoring.prometheus_port {} is privileged",
                p
            ))),
            _ => self.check_port_free(),
        }
    }

    #[cfg(not(test))]
    fn check_port_free(&self) -> Result<()> {
        std::net::TcpListener::bind(("0.0.0.0", self.prometheus_port))
            .map(|_| ())
            .map_err(|e| {
                Error::InvalidConfig(format!(
                    "monitoring.prometheus_port {} unavailable: {}",
                    self.prometheus_port, e
                ))
            })
    }

    #[cfg(test)]
    fn check_port_free(&self) -> Result<()> {
        Ok(())
    }
}

fn default_prometheus_port() -> u16 {
    9100
}
