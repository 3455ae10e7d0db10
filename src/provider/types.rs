//! Response shapes of the `external.metrics.k8s.io` API group.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::EXTERNAL_METRICS_GROUP;
use crate::constants::EXTERNAL_METRICS_VERSION;

/// A metric the provider can serve
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetricInfo {
    pub metric: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetricValue {
    pub metric_name: String,

    #[serde(default)]
    pub metric_labels: BTreeMap<String, String>,

    /// Seconds since the unix epoch at which the value was read
    pub timestamp: u64,

    /// Whole-number quantity; fractional datapoints are truncated toward zero
    pub value: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetricValueList {
    pub kind: String,
    pub api_version: String,
    pub items: Vec<ExternalMetricValue>,
}

impl ExternalMetricValueList {
    pub fn new(items: Vec<ExternalMetricValue>) -> Self {
        Self {
            kind: "ExternalMetricValueList".to_string(),
            api_version: group_version(),
            items,
        }
    }
}

/// Discovery document listing the served metric names
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct APIResourceList {
    pub kind: String,
    pub group_version: String,
    pub resources: Vec<APIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct APIResource {
    pub name: String,
    pub namespaced: bool,
    pub kind: String,
    pub verbs: Vec<String>,
}

impl APIResourceList {
    pub fn from_metrics(metrics: &[ExternalMetricInfo]) -> Self {
        Self {
            kind: "APIResourceList".to_string(),
            group_version: group_version(),
            resources: metrics
                .iter()
                .map(|m| APIResource {
                    name: m.metric.clone(),
                    namespaced: true,
                    kind: "ExternalMetricValueList".to_string(),
                    verbs: vec!["get".to_string()],
                })
                .collect(),
        }
    }
}

pub fn group_version() -> String {
    format!("{}/{}", EXTERNAL_METRICS_GROUP, EXTERNAL_METRICS_VERSION)
}
