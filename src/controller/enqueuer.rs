use std::sync::Arc;

use tracing::debug;

use super::QueueItem;
use super::QueueKey;
use super::ResourceKind;
use crate::api::ExternalMetric;
use crate::store::ResourceEventHandler;
use crate::utils::error_sink::report_error;
use crate::workqueue::RateLimitingQueue;
use crate::ControllerError;

/// Converts store notifications into queue keys.
///
/// Add, update and delete all enqueue the same key; the handler decides
/// what happened by looking the object up again.
#[derive(Clone)]
pub struct Enqueuer {
    queue: Arc<RateLimitingQueue<QueueItem>>,
}

impl Enqueuer {
    pub fn new(queue: Arc<RateLimitingQueue<QueueItem>>) -> Self {
        Self { queue }
    }

    pub fn enqueue(
        &self,
        obj: &ExternalMetric,
    ) {
        if obj.name().is_empty() {
            report_error(
                "enqueuer",
                &ControllerError::MissingName(format!("{}/{}", obj.kind, obj.namespace())),
            );
            return;
        }

        // Typed store: every object it hands us is an ExternalMetric,
        // whatever its `kind` field says
        let key = QueueKey::new(obj.namespace_key(), ResourceKind::ExternalMetric);
        debug!("adding item to queue for '{}' with kind '{}'", key.namespace_key, key.kind);
        // Every notification counts against the key's retry budget, so a
        // burst of events before the first attempt leaves fewer retries
        // for failures. The budget is reset once the key succeeds.
        self.queue.add_rate_limited(QueueItem::Metric(key));
    }
}

impl ResourceEventHandler for Enqueuer {
    fn on_add(
        &self,
        obj: &ExternalMetric,
    ) {
        self.enqueue(obj);
    }

    /// Periodic resyncs also land here, so unchanged objects are requeued
    fn on_update(
        &self,
        _old: &ExternalMetric,
        new: &ExternalMetric,
    ) {
        self.enqueue(new);
    }

    fn on_delete(
        &self,
        obj: &ExternalMetric,
    ) {
        self.enqueue(obj);
    }
}
