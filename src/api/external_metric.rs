use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::EXTERNAL_METRIC_KIND;
use crate::QueryError;

pub const API_VERSION: &str = "metrics.aws/v1alpha1";

/// Identity of a stored object
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: String,
}

/// ExternalMetric describes a CloudWatch query exposed through the external
/// metrics API under `spec.name`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExternalMetric {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    pub spec: MetricSeriesSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeriesSpec {
    /// Series name
    #[serde(default)]
    pub name: String,

    /// IAM role to assume when querying this metric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,

    /// Region the metric is read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Queries sent to CloudWatch, in evaluation order
    #[serde(default)]
    pub queries: Vec<MetricDataQuery>,
}

/// One entry of a `GetMetricData` request.
///
/// Exactly one of `expression` and `metric_stat` should be set. `id` names
/// the series inside math expressions of later queries.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricDataQuery {
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub expression: String,

    #[serde(default)]
    pub metric_stat: MetricStat,

    #[serde(default)]
    pub return_data: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricStat {
    #[serde(default)]
    pub metric: Metric,

    /// Sampling period in seconds
    #[serde(default)]
    pub period: i64,

    #[serde(default)]
    pub stat: String,

    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,

    #[serde(default)]
    pub metric_name: String,

    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl MetricStat {
    pub fn is_empty(&self) -> bool {
        self.metric.metric_name.is_empty() && self.metric.namespace.is_empty()
    }
}

impl MetricDataQuery {
    pub fn is_expression(&self) -> bool {
        !self.expression.is_empty()
    }

    /// True when the entry sets both or neither of `expression` and `metric_stat`
    pub fn is_ambiguous(&self) -> bool {
        self.is_expression() == !self.metric_stat.is_empty()
    }
}

impl ExternalMetric {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        spec: MetricSeriesSpec,
    ) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
            },
            spec,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    /// `namespace/name`, or just `name` for cluster scoped objects
    pub fn namespace_key(&self) -> String {
        if self.metadata.namespace.is_empty() {
            self.metadata.name.clone()
        } else {
            format!("{}/{}", self.metadata.namespace, self.metadata.name)
        }
    }

    /// Checks the rules CloudWatch enforces on a `GetMetricData` request.
    ///
    /// The translator tolerates objects that fail these checks; they are
    /// applied when manifests are admitted into the store.
    pub fn validate(&self) -> std::result::Result<(), QueryError> {
        if self.metadata.name.is_empty() {
            return Err(QueryError::InvalidQuery("metadata.name is required".into()));
        }
        if self.spec.queries.is_empty() {
            return Err(QueryError::InvalidQuery(format!(
                "{}: spec.queries must not be empty",
                self.namespace_key()
            )));
        }

        let mut ids = HashSet::new();
        for q in &self.spec.queries {
            validate_query_id(&q.id)?;
            if !ids.insert(q.id.as_str()) {
                return Err(QueryError::InvalidQuery(format!("duplicate query id {:?}", q.id)));
            }
            if q.is_ambiguous() {
                return Err(QueryError::InvalidQuery(format!(
                    "query {:?} must set exactly one of expression or metricStat",
                    q.id
                )));
            }
        }
        Ok(())
    }
}

/// Ids may contain letters, digits and underscores and must start with a
/// lowercase letter
fn validate_query_id(id: &str) -> std::result::Result<(), QueryError> {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => {
            return Err(QueryError::InvalidQuery(format!(
                "query id {id:?} must start with a lowercase letter"
            )))
        }
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(QueryError::InvalidQuery(format!(
            "query id {id:?} may only contain letters, numbers and underscores"
        )));
    }
    Ok(())
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    EXTERNAL_METRIC_KIND.to_string()
}
