use std::time::Duration;

use super::default_controller_rate_limiter;
use super::DelayingQueue;
use super::QueueItemBound;
use super::RateLimiter;
use crate::RateLimitPolicy;
use crate::WORKQUEUE_RETRIES;

/// Delaying queue whose re-admissions are paced by a [`RateLimiter`]
pub struct RateLimitingQueue<T> {
    queue: DelayingQueue<T>,
    rate_limiter: Box<dyn RateLimiter<T>>,
}

impl<T: QueueItemBound> RateLimitingQueue<T> {
    pub fn new(
        name: impl Into<String>,
        rate_limiter: Box<dyn RateLimiter<T>>,
    ) -> Self {
        Self {
            queue: DelayingQueue::new(name),
            rate_limiter,
        }
    }

    /// Queue backed by the default controller limiter built from `policy`
    pub fn with_policy(
        name: impl Into<String>,
        policy: &RateLimitPolicy,
    ) -> Self {
        Self::new(name, Box::new(default_controller_rate_limiter(policy)))
    }

    /// Adds `item` once the rate limiter says it is ok
    pub fn add_rate_limited(
        &self,
        item: T,
    ) {
        let delay = self.rate_limiter.when(&item);
        WORKQUEUE_RETRIES.with_label_values(&[self.queue.name()]).inc();
        self.queue.add_after(item, delay);
    }

    /// Resets the backoff of `item`
    pub fn forget(
        &self,
        item: &T,
    ) {
        self.rate_limiter.forget(item);
    }

    pub fn num_requeues(
        &self,
        item: &T,
    ) -> usize {
        self.rate_limiter.num_requeues(item)
    }

    pub fn add(
        &self,
        item: T,
    ) {
        self.queue.add(item);
    }

    pub fn add_after(
        &self,
        item: T,
        delay: Duration,
    ) {
        self.queue.add_after(item, delay);
    }

    pub async fn get(&self) -> Option<T> {
        self.queue.get().await
    }

    pub fn done(
        &self,
        item: &T,
    ) {
        self.queue.done(item);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn shut_down(&self) {
        self.queue.shut_down();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.queue.is_shutting_down()
    }
}
