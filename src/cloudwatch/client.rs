use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::GetMetricDataInput;
use super::MetricDataResult;
use crate::constants::QUERY_WINDOW_SECS;
use crate::constants::SCAN_BY_TIMESTAMP_DESCENDING;
use crate::utils::time::truncate_to_minute;
use crate::Result;

/// Metrics backend used by the read path.
///
/// Implementations own credentials, request signing and transport.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CloudWatchClient: Send + Sync + 'static {
    /// Sends a prepared request and returns the series in request order
    async fn query_cloudwatch(
        &self,
        input: GetMetricDataInput,
    ) -> Result<Vec<MetricDataResult>>;
}

/// Stamps the query window on a cached request.
///
/// The window ends at the start of the current minute and covers the
/// preceding five minutes, newest datapoint first.
pub fn with_query_window(
    mut input: GetMetricDataInput,
    now_secs: u64,
) -> GetMetricDataInput {
    let end = truncate_to_minute(now_secs);
    input.end_time = Some(end);
    input.start_time = Some(end.saturating_sub(QUERY_WINDOW_SECS));
    input.scan_by = Some(SCAN_BY_TIMESTAMP_DESCENDING.to_string());
    input
}

/// Most recent value of the first returned series, or 0 when nothing came back
pub fn latest_value(results: &[MetricDataResult]) -> f64 {
    results.first().and_then(|r| r.values.first().copied()).unwrap_or(0.0)
}
