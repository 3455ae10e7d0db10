//! CloudWatch `GetMetricData` vocabulary.
//!
//! The adapter never talks to CloudWatch from the reconciliation path: the
//! handler only translates ExternalMetric specs into [`GetMetricDataInput`]
//! values, and the read path hands them to a [`CloudWatchClient`].

mod client;
mod translate;
mod types;
pub use client::*;
pub use translate::*;
pub use types::*;
