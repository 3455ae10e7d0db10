//! Process-wide sink for errors that have no caller left to return to:
//! dropped queue items, unparsable events, retries that gave up.

use std::fmt::Display;

use tracing::error;

use crate::REPORTED_ERRORS;

/// Logs `err` and counts it under `source`. Never fails and never panics.
pub fn report_error<E: Display + ?Sized>(
    source: &str,
    err: &E,
) {
    REPORTED_ERRORS.with_label_values(&[source]).inc();
    error!(source, "{}", err);
}
