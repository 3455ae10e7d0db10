#[cfg(test)]
use mockall::automock;

use crate::api::ExternalMetric;

/// Receives change notifications from an object store.
///
/// Called synchronously on the store's write path, so implementations must
/// not block.
#[cfg_attr(test, automock)]
pub trait ResourceEventHandler: Send + Sync + 'static {
    fn on_add(
        &self,
        obj: &ExternalMetric,
    );

    fn on_update(
        &self,
        old: &ExternalMetric,
        new: &ExternalMetric,
    );

    fn on_delete(
        &self,
        obj: &ExternalMetric,
    );
}
