use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Rate limiting template for the reconciliation work queue.
///
/// The effective delay of a requeue is the larger of the per-key exponential
/// backoff and the overall token bucket reservation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct RateLimitPolicy {
    /// Backoff base (unit: milliseconds)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff time (unit: milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Sustained admissions per second across all keys (0 disables the bucket)
    #[serde(default = "default_qps")]
    pub qps: u32,

    /// Token bucket size
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            qps: default_qps(),
            burst: default_burst(),
        }
    }
}

impl RateLimitPolicy {
    /// Policy that never delays; requeued keys are immediately available.
    pub fn no_delay() -> Self {
        Self {
            base_delay_ms: 0,
            max_delay_ms: 0,
            qps: 0,
            burst: 0,
        }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_delay_ms > self.max_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "retry.base_delay_ms {} exceeds retry.max_delay_ms {}",
                self.base_delay_ms, self.max_delay_ms
            )));
        }

        if self.qps > 0 && self.burst == 0 {
            return Err(Error::InvalidConfig(
                "retry.burst must be at least 1 when retry.qps is set".into(),
            ));
        }

        Ok(())
    }
}

fn default_base_delay_ms() -> u64 {
    5
}
fn default_max_delay_ms() -> u64 {
    1_000_000
}
fn default_qps() -> u32 {
    10
}
fn default_burst() -> u32 {
    100
}
