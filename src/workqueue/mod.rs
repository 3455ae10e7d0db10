//! Rate-limited, deduplicating work queue.
//!
//! Layers, innermost first:
//! - [`Queue`]: FIFO with pending-set deduplication and per-item
//!   serialization (an item being processed is never handed out twice; adds
//!   that arrive meanwhile are replayed on `done`).
//! - [`DelayingQueue`]: `add_after` on top of a background timer task.
//! - [`RateLimitingQueue`]: `add_rate_limited` driven by a [`RateLimiter`].

mod delaying_queue;
mod queue;
mod rate_limiter;
mod rate_limiting_queue;
pub use delaying_queue::*;
pub use queue::*;
pub use rate_limiter::*;
pub use rate_limiting_queue::*;


use std::fmt::Debug;
use std::hash::Hash;

/// Bound shared by everything that can travel through the queue
pub trait QueueItemBound: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> QueueItemBound for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
