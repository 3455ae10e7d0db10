use std::sync::Arc;

use autometrics::autometrics;
#[cfg(test)]
use mockall::automock;
use tracing::debug;
use tracing::trace;

use super::split_meta_namespace_key;
use super::QueueKey;
use super::ResourceKind;
use crate::cloudwatch::to_cloudwatch_query;
use crate::metriccache::external_metric_key;
use crate::metriccache::MetricCache;
use crate::store::ExternalMetricLister;
use crate::Result;
use crate::API_SLO;

/// Reconciles one queue key
#[cfg_attr(test, automock)]
pub trait ControllerHandler: Send + Sync + 'static {
    /// `Ok` means the key is settled. Errors are retried by the caller.
    fn process(
        &self,
        key: &QueueKey,
    ) -> Result<()>;
}

/// Keeps the metric cache in line with ExternalMetric objects
pub struct MetricHandler<L: ExternalMetricLister + ?Sized> {
    lister: Arc<L>,
    metric_cache: Arc<MetricCache>,
}

impl<L: ExternalMetricLister + ?Sized> MetricHandler<L> {
    pub fn new(
        lister: Arc<L>,
        metric_cache: Arc<MetricCache>,
    ) -> Self {
        Self { lister, metric_cache }
    }

    fn handle_external_metric(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<()> {
        debug!("processing item '{}' in namespace '{}'", name, namespace);
        let cache_key = external_metric_key(namespace, name);

        let Some(external_metric) = self.lister.get(namespace, name)? else {
            debug!("removing item from cache '{}' in namespace '{}'", name, namespace);
            self.metric_cache.remove(&cache_key);
            return Ok(());
        };

        trace!("external metric: {:?}", external_metric);
        let request = to_cloudwatch_query(&external_metric);

        debug!("adding to cache item '{}' in namespace '{}'", name, namespace);
        self.metric_cache.update(&cache_key, name, request);
        Ok(())
    }
}

impl<L: ExternalMetricLister + ?Sized> ControllerHandler for MetricHandler<L> {
    #[autometrics(objective = API_SLO)]
    fn process(
        &self,
        key: &QueueKey,
    ) -> Result<()> {
        let (namespace, name) = split_meta_namespace_key(&key.namespace_key)?;

        match &key.kind {
            ResourceKind::ExternalMetric => self.handle_external_metric(namespace, name),
            ResourceKind::Other(kind) => {
                trace!("ignoring '{}' of unknown kind '{}'", key.namespace_key, kind);
                Ok(())
            }
        }
    }
}
