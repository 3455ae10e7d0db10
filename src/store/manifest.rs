//! Startup loading of ExternalMetric manifests from disk.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::api::ExternalMetric;
use crate::Result;
use crate::StoreError;

const MANIFEST_EXTENSION: &str = "json";

/// Reads every `*.json` file directly under `dir`, in file name order.
///
/// The first manifest that fails to decode or validate aborts the load.
pub fn load_manifests(dir: &Path) -> Result<Vec<ExternalMetric>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION))
        .collect();
    paths.sort();

    let mut manifests = Vec::with_capacity(paths.len());
    for path in paths {
        manifests.push(load_manifest_file(&path)?);
    }
    info!("loaded {} manifest(s) from {}", manifests.len(), dir.display());
    Ok(manifests)
}

/// Decodes and validates a single manifest
pub fn load_manifest_file(path: &Path) -> Result<ExternalMetric> {
    let raw = fs::read_to_string(path)?;
    let metric: ExternalMetric = serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    metric.validate().map_err(|e| StoreError::InvalidManifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    debug!("manifest {} -> {}", path.display(), metric.namespace_key());
    Ok(metric)
}
