//! Adapter Error Hierarchy
//!
//! Defines the error types raised by the reconciliation pipeline, the object
//! store, and the external metrics read path, grouped by the layer that
//! produces them.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source loading or deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reconciliation loop failures
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Object store lookup and manifest failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// External metric read path failures
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// Queue key is not in `namespace/name` form
    #[error("unexpected key format: {0:?}")]
    InvalidKey(String),

    /// Queue carried a payload that is not a reconciliation key
    #[error("expected a queue key in workqueue but got {0}")]
    InvalidQueueItem(String),

    /// Object metadata could not be turned into a queue key
    #[error("object has no name: {0}")]
    MissingName(String),

    /// Initial object store sync did not complete before shutdown
    #[error("error syncing controller cache")]
    CacheSyncFailed,

    /// A worker stopped while the queue was still open
    #[error("controller worker exited: {0}")]
    WorkerExited(String),

    /// Retry budget used up for a key
    #[error("max retries ({attempts}) hit for key {key}: {reason}")]
    RetriesExhausted {
        key: String,
        attempts: usize,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Index lookup failed for a reason other than absence
    #[error("lookup of {namespace}/{name} failed: {reason}")]
    Lookup {
        namespace: String,
        name: String,
        reason: String,
    },

    /// Manifest failed admission checks
    #[error("invalid manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// Manifest is not valid JSON for an ExternalMetric
    #[error("failed to decode manifest {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// No cached query for the requested metric
    #[error("no metric query found for {metric} in namespace {namespace}")]
    NotFound { namespace: String, metric: String },

    /// Metrics backend rejected or failed the request
    #[error("backend query failed: {0}")]
    Backend(String),

    /// No backend client was configured for value queries
    #[error("no metrics backend configured")]
    BackendUnavailable,

    /// Declarative query failed validation
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
