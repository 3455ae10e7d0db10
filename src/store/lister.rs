//! Read side of the object store, as seen by the reconciliation loop.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::watch;

use super::ResourceEventHandler;
use crate::api::ExternalMetric;
use crate::Result;

/// Indexed point lookup of ExternalMetric objects
#[cfg_attr(test, automock)]
pub trait ExternalMetricLister: Send + Sync + 'static {
    /// `Ok(None)` means the object does not exist. Errors are lookup failures
    /// and may be retried.
    fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<ExternalMetric>>>;
}

/// Initial list completion of an object store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheSync: Send + Sync + 'static {
    /// Resolves `true` once the store holds its initial contents, or `false`
    /// if `shutdown` fires first.
    async fn wait_for_cache_sync(
        &self,
        shutdown: watch::Receiver<()>,
    ) -> bool;
}

/// A store that can be listed, watched and waited on
pub trait ObjectStore: ExternalMetricLister + CacheSync {
    /// Registers `handler`; objects already present are replayed as adds
    fn add_event_handler(
        &self,
        handler: Arc<dyn ResourceEventHandler>,
    );
}
