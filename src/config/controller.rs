use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_MAX_RETRIES;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Number of concurrent reconciliation workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Consecutive handler failures tolerated before a key is forgotten
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay before a worker that exited while the queue is open, e.g.
    /// after a handler panic, is replaced (unit: milliseconds)
    #[serde(default = "default_resync_interval_ms")]
    pub resync_interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_retries: default_max_retries(),
            resync_interval_ms: default_resync_interval_ms(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("controller.workers must be at least 1".into()));
        }

        if self.max_retries == 0 {
            return Err(Error::InvalidConfig(
                "controller.max_retries must be at least 1".into(),
            ));
        }

        Ok(())
    }

    pub fn resync_interval(&self) -> Duration {
        Duration::from_millis(self.resync_interval_ms)
    }
}

fn default_workers() -> usize {
    2
}
fn default_max_retries() -> usize {
    DEFAULT_MAX_RETRIES
}
fn default_resync_interval_ms() -> u64 {
    1000
}
