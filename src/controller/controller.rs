use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::ControllerHandler;
use super::Enqueuer;
use super::QueueItem;
use super::QueueKey;
use crate::constants::METRIC_QUEUE_NAME;
use crate::store::CacheSync;
use crate::utils::error_sink::report_error;
use crate::workqueue::RateLimitingQueue;
use crate::ControllerConfig;
use crate::ControllerError;
use crate::Error;
use crate::RateLimitPolicy;
use crate::Result;
use crate::RECONCILE_TOTAL;

/// Drives the handler from the work queue.
///
/// Owns the queue and the retry policy: a failed key is requeued with
/// backoff until it has been requeued `max_retries` times, then dropped.
pub struct Controller {
    queue: Arc<RateLimitingQueue<QueueItem>>,
    handler: Arc<dyn ControllerHandler>,
    synced: Arc<dyn CacheSync>,
    max_retries: usize,
    resync_interval: Duration,
}

impl Controller {
    pub fn new(
        queue: Arc<RateLimitingQueue<QueueItem>>,
        handler: Arc<dyn ControllerHandler>,
        synced: Arc<dyn CacheSync>,
        max_retries: usize,
    ) -> Self {
        Self {
            queue,
            handler,
            synced,
            max_retries,
            resync_interval: Duration::from_secs(1),
        }
    }

    /// Controller with its own rate-limited queue built from `policy`
    pub fn from_config(
        config: &ControllerConfig,
        policy: &RateLimitPolicy,
        handler: Arc<dyn ControllerHandler>,
        synced: Arc<dyn CacheSync>,
    ) -> Self {
        let queue = Arc::new(RateLimitingQueue::with_policy(METRIC_QUEUE_NAME, policy));
        Self::new(queue, handler, synced, config.max_retries)
            .with_resync_interval(config.resync_interval())
    }

    /// Delay before a worker that died is replaced
    pub fn with_resync_interval(
        mut self,
        resync_interval: Duration,
    ) -> Self {
        self.resync_interval = resync_interval;
        self
    }

    /// Event handler feeding this controller's queue; register it with the
    /// object store
    pub fn enqueuer(&self) -> Enqueuer {
        Enqueuer::new(self.queue.clone())
    }

    pub fn queue(&self) -> &Arc<RateLimitingQueue<QueueItem>> {
        &self.queue
    }

    pub fn resync_interval(&self) -> Duration {
        self.resync_interval
    }

    /// Waits for the store's initial sync, then runs `workers` workers until
    /// `shutdown` fires. Returns once every worker has drained and exited.
    ///
    /// A worker that exits while the queue is still open is reported and
    /// replaced after `resync_interval`, so the pool keeps its size.
    pub async fn run(
        self: Arc<Self>,
        workers: usize,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<()> {
        debug!("initializing controller");

        if !self.synced.wait_for_cache_sync(shutdown.clone()).await {
            self.queue.shut_down();
            report_error("controller", &ControllerError::CacheSyncFailed);
            return Err(Error::Fatal(ControllerError::CacheSyncFailed.to_string()));
        }

        info!("starting {} workers with {:?} resync interval", workers, self.resync_interval);
        let mut pool = JoinSet::new();
        for id in 0..workers {
            self.spawn_worker(&mut pool, id, Duration::ZERO);
        }
        let mut next_id = workers;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                Some(exited) = pool.join_next() => {
                    if self.queue.is_shutting_down() {
                        continue;
                    }
                    let reason = match exited {
                        Ok(id) => format!("worker {} returned", id),
                        Err(e) => e.to_string(),
                    };
                    report_error("controller", &ControllerError::WorkerExited(reason));
                    self.spawn_worker(&mut pool, next_id, self.resync_interval);
                    next_id += 1;
                }
            }
        }

        info!("shutting down workers");
        self.queue.shut_down();

        while let Some(exited) = pool.join_next().await {
            if let Err(e) = exited {
                error!("worker task failed: {:?}", e);
            }
        }
        Ok(())
    }

    fn spawn_worker(
        self: &Arc<Self>,
        pool: &mut JoinSet<usize>,
        id: usize,
        delay: Duration,
    ) {
        let controller = self.clone();
        pool.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            controller.worker_loop(id).await;
            id
        });
    }

    async fn worker_loop(
        &self,
        id: usize,
    ) {
        debug!("worker {} starting", id);
        while self.process_next_item().await {
            debug!("processing next item");
        }
        debug!("worker {} completed", id);
    }

    /// Handles one item. Returns `false` only once the queue has shut down.
    pub async fn process_next_item(&self) -> bool {
        let Some(item) = self.queue.get().await else {
            debug!("received quit signal");
            return false;
        };

        let _in_flight = InFlight {
            controller: self,
            item: &item,
        };
        self.process_item(&item);
        true
    }

    fn process_item(
        &self,
        item: &QueueItem,
    ) {
        let key = match item {
            QueueItem::Metric(key) => key,
            QueueItem::Unrecognized(raw) => {
                self.queue.forget(item);
                report_error("controller", &ControllerError::InvalidQueueItem(raw.clone()));
                return;
            }
        };

        match self.handler.process(key) {
            Ok(()) => {
                debug!("successfully processed item '{}'", key);
                RECONCILE_TOTAL.with_label_values(&[key.kind.as_str(), "success"]).inc();
                self.queue.forget(item);
            }
            Err(e) => self.retry_or_drop(item, key, &e.to_string()),
        }
    }

    fn retry_or_drop(
        &self,
        item: &QueueItem,
        key: &QueueKey,
        reason: &str,
    ) {
        let retries = self.queue.num_requeues(item);
        if retries < self.max_retries {
            warn!("transient error with {} retries for key {}: {}", retries, key, reason);
            RECONCILE_TOTAL.with_label_values(&[key.kind.as_str(), "retry"]).inc();
            self.queue.add_rate_limited(item.clone());
            return;
        }

        RECONCILE_TOTAL.with_label_values(&[key.kind.as_str(), "dropped"]).inc();
        self.queue.forget(item);
        report_error(
            "controller",
            &ControllerError::RetriesExhausted {
                key: key.to_string(),
                attempts: retries,
                reason: reason.to_string(),
            },
        );
    }
}

/// Marks an item done when processing ends, including by a handler panic.
/// A panic counts as one failure of the key.
struct InFlight<'a> {
    controller: &'a Controller,
    item: &'a QueueItem,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let QueueItem::Metric(key) = self.item {
                self.controller.retry_or_drop(self.item, key, "handler panicked");
            }
        }
        self.controller.queue.done(self.item);
    }
}
