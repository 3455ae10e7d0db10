//! Fixtures and helpers shared by the unit tests

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::Dimension;
use crate::api::ExternalMetric;
use crate::api::Metric;
use crate::api::MetricDataQuery;
use crate::api::MetricSeriesSpec;
use crate::api::MetricStat;
use crate::cloudwatch::GetMetricDataInput;
use crate::controller::Controller;
use crate::controller::ControllerHandler;
use crate::store::CacheSync;
use crate::workqueue::RateLimitingQueue;
use crate::RateLimitPolicy;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// ExternalMetric `default/<name>` with an expression over two metric stats
pub fn new_full_external_metric(name: &str) -> ExternalMetric {
    ExternalMetric::new(
        "default",
        name,
        MetricSeriesSpec {
            name: "Name".to_string(),
            role_arn: Some("MyRoleARN".to_string()),
            region: Some("Region".to_string()),
            queries: vec![
                MetricDataQuery {
                    id: "query1".to_string(),
                    expression: "query2/query3".to_string(),
                    ..Default::default()
                },
                MetricDataQuery {
                    id: "query2".to_string(),
                    metric_stat: MetricStat {
                        metric: Metric {
                            dimensions: vec![dimension("DimensionName1", "DimensionValue1")],
                            metric_name: "metricName1".to_string(),
                            namespace: "namespace1".to_string(),
                        },
                        period: 60,
                        stat: "Average".to_string(),
                        unit: "Bytes".to_string(),
                    },
                    return_data: true,
                    ..Default::default()
                },
                MetricDataQuery {
                    id: "query3".to_string(),
                    metric_stat: MetricStat {
                        metric: Metric {
                            dimensions: vec![
                                dimension("DimensionName2", "DimensionValue2"),
                                dimension("DimensionName3", "DimensionValue3"),
                            ],
                            metric_name: "metricName2".to_string(),
                            namespace: "namespace2".to_string(),
                        },
                        period: 60,
                        stat: "Sum".to_string(),
                        unit: "Count".to_string(),
                    },
                    return_data: false,
                    ..Default::default()
                },
            ],
        },
    )
}

/// ExternalMetric `default/test` with a single metric stat query
pub fn new_external_metric() -> ExternalMetric {
    ExternalMetric::new(
        "default",
        "test",
        MetricSeriesSpec {
            name: "test".to_string(),
            queries: vec![MetricDataQuery {
                id: "q1".to_string(),
                metric_stat: MetricStat {
                    metric: Metric {
                        dimensions: vec![dimension("D", "V")],
                        metric_name: "M".to_string(),
                        namespace: "NS".to_string(),
                    },
                    period: 60,
                    stat: "Average".to_string(),
                    unit: "Count".to_string(),
                },
                return_data: true,
                ..Default::default()
            }],
            ..Default::default()
        },
    )
}

fn dimension(
    name: &str,
    value: &str,
) -> Dimension {
    Dimension {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// Asserts `request` is the translation of `metric`, entry by entry
pub fn validate_external_metric_result(
    request: &GetMetricDataInput,
    metric: &ExternalMetric,
) {
    assert_eq!(
        request.metric_data_queries.len(),
        metric.spec.queries.len(),
        "query count mismatch"
    );

    for (q, want) in request.metric_data_queries.iter().zip(&metric.spec.queries) {
        assert_eq!(q.id, want.id);
        assert_eq!(q.label.as_deref().unwrap_or(""), want.label);
        assert_eq!(q.return_data, want.return_data, "return_data of {}", q.id);

        if want.is_expression() {
            assert_eq!(q.expression.as_deref(), Some(want.expression.as_str()));
            assert!(q.metric_stat.is_none(), "{} carries a metric stat", q.id);
            continue;
        }

        assert!(q.expression.is_none(), "{} carries an expression", q.id);
        let stat = q.metric_stat.as_ref().expect("metric stat entry");
        let want_stat = &want.metric_stat;
        assert_eq!(stat.metric.metric_name, want_stat.metric.metric_name);
        assert_eq!(stat.metric.namespace, want_stat.metric.namespace);
        assert_eq!(stat.metric.dimensions.len(), want_stat.metric.dimensions.len());
        for (d, want_d) in stat.metric.dimensions.iter().zip(&want_stat.metric.dimensions) {
            assert_eq!(d.name, want_d.name);
            assert_eq!(d.value, want_d.value);
        }
        assert_eq!(stat.period, want_stat.period);
        assert_eq!(stat.stat, want_stat.stat);
        assert_eq!(stat.unit.as_deref().unwrap_or(""), want_stat.unit);
    }
}

/// Queue with zero backoff so retries are observable without waiting
pub fn new_no_delay_queue() -> Arc<RateLimitingQueue<crate::controller::QueueItem>> {
    Arc::new(RateLimitingQueue::with_policy(
        "test",
        &RateLimitPolicy::no_delay(),
    ))
}

/// Controller wired to `handler` over a zero-backoff queue
pub fn new_test_controller(
    handler: Arc<dyn ControllerHandler>,
    synced: Arc<dyn CacheSync>,
) -> Controller {
    Controller::new(new_no_delay_queue(), handler, synced, 5)
}

/// Shutdown channel as built by `main`
pub fn shutdown_channel() -> (watch::Sender<()>, watch::Receiver<()>) {
    watch::channel(())
}
