//! Reconciliation core of a CloudWatch external-metrics adapter.
//!
//! ExternalMetric objects in an object store are translated into CloudWatch
//! `GetMetricData` requests and kept in a [`metriccache::MetricCache`] that
//! the external metrics read path serves from.

pub mod api;
pub mod cloudwatch;
mod config;
pub mod constants;
pub mod controller;
mod errors;
pub mod metriccache;
mod metrics;
pub mod provider;
pub mod server;
pub mod store;
pub mod utils;
pub mod workqueue;

pub use config::*;
pub use errors::*;
pub use metrics::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;

//-----------------------------------------------------------
// Autometrics
/// autometrics: https://docs.autometrics.dev/rust/adding-alerts-and-slos
use autometrics::objectives::Objective;
use autometrics::objectives::ObjectiveLatency;
use autometrics::objectives::ObjectivePercentile;
const API_SLO: Objective = Objective::new("api")
    .success_rate(ObjectivePercentile::P99_9)
    .latency(ObjectiveLatency::Ms10, ObjectivePercentile::P99);
