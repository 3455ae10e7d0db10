use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    /// Directory for `adapter.log`; logs go to stdout when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            filter: default_filter(),
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.filter.trim().is_empty() {
            return Err(Error::InvalidConfig("log.filter cannot be empty".into()));
        }
        if let Some(dir) = &self.log_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("log.log_dir cannot be empty".into()));
            }
        }
        Ok(())
    }
}

fn default_filter() -> String {
    "info".to_string()
}
