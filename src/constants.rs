// -
// Resource kinds

/// Kind tag of the ExternalMetric custom resource
pub const EXTERNAL_METRIC_KIND: &str = "ExternalMetric";

// -
// Work queue

/// Name of the reconciliation queue, used as the metric label
pub(crate) const METRIC_QUEUE_NAME: &str = "metrics";

/// Consecutive handler failures tolerated before a key is dropped
pub const DEFAULT_MAX_RETRIES: usize = 5;

// -
// CloudWatch query window

/// CloudWatch metrics have latency; query a trailing window and keep the latest value
pub(crate) const QUERY_WINDOW_SECS: u64 = 5 * 60;

pub(crate) const SCAN_BY_TIMESTAMP_DESCENDING: &str = "TimestampDescending";

// -
// External metrics API

pub(crate) const EXTERNAL_METRICS_GROUP: &str = "external.metrics.k8s.io";
pub(crate) const EXTERNAL_METRICS_VERSION: &str = "v1beta1";
