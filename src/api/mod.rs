//! Declarative resource types consumed by the adapter.
//!
//! `ExternalMetric` objects describe a CloudWatch `GetMetricData` query and
//! are owned by the object store; the adapter only reads them.

mod external_metric;
pub use external_metric::*;
