use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Where ExternalMetric manifests are read from at startup
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Directory of `*.json` ExternalMetric manifests; nothing is loaded when unset
    #[serde(default)]
    pub manifest_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.manifest_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("store.manifest_dir cannot be empty".into()));
            }

            #[cfg(not(test))]
            if !dir.is_dir() {
                return Err(Error::InvalidConfig(format!(
                    "store.manifest_dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
