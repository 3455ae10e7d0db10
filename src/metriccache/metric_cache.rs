//! In-memory cache of translated metric requests.
//!
//! Written only by the reconciliation handler, read synchronously by the
//! external metrics read path. Entries live until the handler removes them;
//! there is no expiry.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::cloudwatch::GetMetricDataInput;
use crate::constants::EXTERNAL_METRIC_KIND;
use crate::METRIC_CACHE_ENTRIES;

#[derive(Debug, Default)]
pub struct MetricCache {
    inner: RwLock<InnerState>,
}

#[derive(Debug, Default)]
struct InnerState {
    /// cache key -> translated request
    metric_requests: HashMap<String, GetMetricDataInput>,
    /// cache key -> object name
    metric_names: HashMap<String, String>,
}

impl MetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a metric request in the cache, replacing any previous entry for `key`
    pub fn update(
        &self,
        key: &str,
        name: &str,
        metric_request: GetMetricDataInput,
    ) {
        let mut state = self.inner.write();
        state.metric_requests.insert(key.to_string(), metric_request);
        state.metric_names.insert(key.to_string(), name.to_string());
        METRIC_CACHE_ENTRIES.set(state.metric_requests.len() as i64);
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<GetMetricDataInput> {
        let state = self.inner.read();
        let request = state.metric_requests.get(key).cloned();
        if request.is_none() {
            debug!("metric not found {}", key);
        }
        request
    }

    /// Retrieves the request cached for the ExternalMetric `namespace/name`
    pub fn get_external_metric(
        &self,
        namespace: &str,
        name: &str,
    ) -> Option<GetMetricDataInput> {
        self.get(&external_metric_key(namespace, name))
    }

    /// Removes a metric request and its name; absent keys are ignored
    pub fn remove(
        &self,
        key: &str,
    ) {
        let mut state = self.inner.write();
        state.metric_requests.remove(key);
        state.metric_names.remove(key);
        METRIC_CACHE_ENTRIES.set(state.metric_requests.len() as i64);
    }

    /// Snapshot of the names of all cached metrics, in no particular order
    pub fn list_metric_names(&self) -> Vec<String> {
        self.inner.read().metric_names.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().metric_requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key of an ExternalMetric: `ExternalMetric/<namespace>/<name>`
pub fn external_metric_key(
    namespace: &str,
    name: &str,
) -> String {
    metric_cache_key(EXTERNAL_METRIC_KIND, namespace, name)
}

/// `<kind>/<namespace>/<name>`. The namespace segment is kept even when
/// empty, so cluster scoped objects read as `<kind>//<name>`.
pub fn metric_cache_key(
    kind: &str,
    namespace: &str,
    name: &str,
) -> String {
    format!("{}/{}/{}", kind, namespace, name)
}
