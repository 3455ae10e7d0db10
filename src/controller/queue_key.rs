use std::fmt;

use crate::constants::EXTERNAL_METRIC_KIND;
use crate::ControllerError;

/// Kind of object a queue key refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ExternalMetric,
    /// Kinds this adapter does not reconcile; processed as a no-op
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::ExternalMetric => EXTERNAL_METRIC_KIND,
            ResourceKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for ResourceKind {
    fn from(kind: &str) -> Self {
        if kind == EXTERNAL_METRIC_KIND {
            ResourceKind::ExternalMetric
        } else {
            ResourceKind::Other(kind.to_string())
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of reconciliation: an object's `namespace/name` plus its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueKey {
    pub namespace_key: String,
    pub kind: ResourceKind,
}

impl QueueKey {
    pub fn new(
        namespace_key: impl Into<String>,
        kind: ResourceKind,
    ) -> Self {
        Self {
            namespace_key: namespace_key.into(),
            kind,
        }
    }

}

impl fmt::Display for QueueKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.namespace_key)
    }
}

/// Payload carried by the controller's work queue.
///
/// Anything that is not a [`QueueKey`] is dropped by the workers without
/// reaching the handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueueItem {
    Metric(QueueKey),
    Unrecognized(String),
}

impl From<QueueKey> for QueueItem {
    fn from(key: QueueKey) -> Self {
        QueueItem::Metric(key)
    }
}

/// Splits `namespace/name` into its parts; a bare `name` has an empty
/// namespace
pub fn split_meta_namespace_key(key: &str) -> Result<(&str, &str), ControllerError> {
    let parts: Vec<&str> = key.split('/').collect();
    match parts.as_slice() {
        [name] => Ok(("", *name)),
        [namespace, name] => Ok((*namespace, *name)),
        _ => Err(ControllerError::InvalidKey(key.to_string())),
    }
}
