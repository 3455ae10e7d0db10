use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::QueueItemBound;
use crate::RateLimitPolicy;

/// Decides how long an item waits before it is re-admitted to the queue
pub trait RateLimiter<T>: Send + Sync {
    /// Delay for the next admission of `item`; counts as one requeue
    fn when(
        &self,
        item: &T,
    ) -> Duration;

    /// Stops tracking `item`, resetting its backoff
    fn forget(
        &self,
        item: &T,
    );

    /// Number of times `item` has been requeued since it was last forgotten
    fn num_requeues(
        &self,
        item: &T,
    ) -> usize;
}

/// Per-item exponential backoff: `base * 2^failures`, capped at `max`
pub struct ItemExponentialFailureRateLimiter<T> {
    failures: Mutex<HashMap<T, usize>>,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T: QueueItemBound> ItemExponentialFailureRateLimiter<T> {
    pub fn new(
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            failures: Mutex::new(HashMap::new()),
            base_delay,
            max_delay,
        }
    }
}

impl<T: QueueItemBound> RateLimiter<T> for ItemExponentialFailureRateLimiter<T> {
    fn when(
        &self,
        item: &T,
    ) -> Duration {
        let exp = {
            let mut failures = self.failures.lock();
            let count = failures.entry(item.clone()).or_insert(0);
            let exp = *count;
            *count += 1;
            exp
        };

        // 2^exp overflows long before any sane max_delay is reached
        let backoff = u32::try_from(exp)
            .ok()
            .and_then(|exp| 2u32.checked_pow(exp))
            .and_then(|factor| self.base_delay.checked_mul(factor));

        match backoff {
            Some(delay) if delay <= self.max_delay => delay,
            _ => self.max_delay,
        }
    }

    fn forget(
        &self,
        item: &T,
    ) {
        self.failures.lock().remove(item);
    }

    fn num_requeues(
        &self,
        item: &T,
    ) -> usize {
        self.failures.lock().get(item).copied().unwrap_or(0)
    }
}

/// Overall token bucket shared by all items.
///
/// Every `when` reserves one token; once the bucket is empty the returned
/// delay is the time until the reserved token is refilled.
pub struct BucketRateLimiter<T> {
    bucket: Mutex<Bucket>,
    qps: f64,
    burst: f64,
    _item: PhantomData<fn(&T)>,
}

struct Bucket {
    tokens: f64,
    last: Instant,
}

impl<T> BucketRateLimiter<T> {
    pub fn new(
        qps: u32,
        burst: u32,
    ) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last: Instant::now(),
            }),
            qps: qps as f64,
            burst: burst as f64,
            _item: PhantomData,
        }
    }
}

impl<T> RateLimiter<T> for BucketRateLimiter<T> {
    fn when(
        &self,
        _item: &T,
    ) -> Duration {
        if self.qps <= 0.0 {
            return Duration::ZERO;
        }

        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.qps).min(self.burst);
        bucket.last = now;

        bucket.tokens -= 1.0;
        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-bucket.tokens / self.qps)
        }
    }

    fn forget(
        &self,
        _item: &T,
    ) {
    }

    fn num_requeues(
        &self,
        _item: &T,
    ) -> usize {
        0
    }
}

/// Combines limiters by taking the longest delay and the highest requeue count
pub struct MaxOfRateLimiter<T> {
    limiters: Vec<Box<dyn RateLimiter<T>>>,
}

impl<T> MaxOfRateLimiter<T> {
    pub fn new(limiters: Vec<Box<dyn RateLimiter<T>>>) -> Self {
        Self { limiters }
    }
}

impl<T> RateLimiter<T> for MaxOfRateLimiter<T> {
    fn when(
        &self,
        item: &T,
    ) -> Duration {
        self.limiters.iter().map(|l| l.when(item)).max().unwrap_or(Duration::ZERO)
    }

    fn forget(
        &self,
        item: &T,
    ) {
        for l in &self.limiters {
            l.forget(item);
        }
    }

    fn num_requeues(
        &self,
        item: &T,
    ) -> usize {
        self.limiters.iter().map(|l| l.num_requeues(item)).max().unwrap_or(0)
    }
}

/// Per-item exponential backoff combined with an overall token bucket
pub fn default_controller_rate_limiter<T: QueueItemBound>(
    policy: &RateLimitPolicy
) -> MaxOfRateLimiter<T> {
    MaxOfRateLimiter::new(vec![
        Box::new(ItemExponentialFailureRateLimiter::new(
            policy.base_delay(),
            policy.max_delay(),
        )),
        Box::new(BucketRateLimiter::new(policy.qps, policy.burst)),
    ])
}
