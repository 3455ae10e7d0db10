use std::collections::BTreeMap;
use std::sync::Arc;

use autometrics::autometrics;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::ExternalMetricInfo;
use super::ExternalMetricValue;
use super::ExternalMetricValueList;
use crate::cloudwatch::latest_value;
use crate::cloudwatch::with_query_window;
use crate::cloudwatch::CloudWatchClient;
use crate::cloudwatch::GetMetricDataInput;
use crate::metriccache::MetricCache;
use crate::utils::time::get_now_as_u64;
use crate::QueryError;
use crate::Result;
use crate::API_SLO;

/// Serves external metric values from the cached requests.
///
/// Never reads the object store; a metric is servable exactly when the
/// controller has cached a request for it.
pub struct ExternalMetricsProvider {
    metric_cache: Arc<MetricCache>,
    client: Option<Arc<dyn CloudWatchClient>>,
}

impl ExternalMetricsProvider {
    pub fn new(
        metric_cache: Arc<MetricCache>,
        client: Option<Arc<dyn CloudWatchClient>>,
    ) -> Self {
        Self { metric_cache, client }
    }

    /// Current value of `metric` in `namespace`
    #[autometrics(objective = API_SLO)]
    pub async fn get_external_metric(
        &self,
        namespace: &str,
        metric: &str,
    ) -> Result<ExternalMetricValueList> {
        info!("received request for namespace: {}, metric name: {}", namespace, metric);

        let request = self.get_metric_request(namespace, metric)?;
        let Some(client) = &self.client else {
            return Err(QueryError::BackendUnavailable.into());
        };

        let now = get_now_as_u64();
        let results = client
            .query_cloudwatch(with_query_window(request, now))
            .await
            .map_err(|e| {
                error!("bad request: {:?}", e);
                QueryError::Backend(e.to_string())
            })?;

        let value = ExternalMetricValue {
            metric_name: metric.to_string(),
            metric_labels: BTreeMap::new(),
            timestamp: now,
            value: latest_value(&results) as i64,
        };
        Ok(ExternalMetricValueList::new(vec![value]))
    }

    /// Cached request for `metric`, without a query window
    pub fn get_metric_request(
        &self,
        namespace: &str,
        metric: &str,
    ) -> Result<GetMetricDataInput> {
        self.metric_cache.get_external_metric(namespace, metric).ok_or_else(|| {
            debug!("no metric query found for {}/{}", namespace, metric);
            QueryError::NotFound {
                namespace: namespace.to_string(),
                metric: metric.to_string(),
            }
            .into()
        })
    }

    /// Every cached metric with a non-empty name
    pub fn list_all_external_metrics(&self) -> Vec<ExternalMetricInfo> {
        self.metric_cache
            .list_metric_names()
            .into_iter()
            .filter(|name| !name.is_empty())
            .map(|metric| ExternalMetricInfo { metric })
            .collect()
    }
}
