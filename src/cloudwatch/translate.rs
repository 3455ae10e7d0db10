use tracing::warn;

use super::Dimension;
use super::GetMetricDataInput;
use super::Metric;
use super::MetricDataQuery;
use super::MetricStat;
use crate::api;
use crate::api::ExternalMetric;

/// Translates the queries of an ExternalMetric into a `GetMetricData` request.
///
/// Output order and length follow `spec.queries`: expressions may refer to the ids
/// of earlier entries. The query window is left unset; it is stamped when the
/// request is sent.
pub fn to_cloudwatch_query(external_metric: &ExternalMetric) -> GetMetricDataInput {
    let metric_data_queries = external_metric
        .spec
        .queries
        .iter()
        .map(|q| {
            if q.is_ambiguous() {
                warn!(
                    "query {:?} of {} sets {} of expression and metricStat",
                    q.id,
                    external_metric.namespace_key(),
                    if q.is_expression() { "both" } else { "neither" }
                );
            }
            to_metric_data_query(q)
        })
        .collect();

    GetMetricDataInput {
        metric_data_queries,
        ..Default::default()
    }
}

/// A non-empty expression wins over the metric stat.
pub fn to_metric_data_query(q: &api::MetricDataQuery) -> MetricDataQuery {
    let mut mdq = MetricDataQuery {
        id: q.id.clone(),
        label: non_empty(&q.label),
        return_data: q.return_data,
        expression: None,
        metric_stat: None,
    };

    if q.is_expression() {
        mdq.expression = Some(q.expression.clone());
    } else {
        let stat = &q.metric_stat;
        mdq.metric_stat = Some(MetricStat {
            metric: Metric {
                namespace: stat.metric.namespace.clone(),
                metric_name: stat.metric.metric_name.clone(),
                dimensions: stat
                    .metric
                    .dimensions
                    .iter()
                    .map(|d| Dimension {
                        name: d.name.clone(),
                        value: d.value.clone(),
                    })
                    .collect(),
            },
            period: stat.period,
            stat: stat.stat.clone(),
            unit: non_empty(&stat.unit),
        });
    }

    mdq
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
