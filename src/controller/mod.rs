//! Reconciliation loop keeping the metric cache in line with the object store.
//!
//! The [`Enqueuer`] turns store notifications into [`QueueKey`]s, workers
//! owned by the [`Controller`] pull them off the rate-limited queue, and the
//! [`ControllerHandler`] re-reads the object and writes or removes its cache
//! entry.

mod controller;
mod enqueuer;
mod handler;
mod queue_key;


pub use controller::*;
pub use enqueuer::*;
pub use handler::*;
pub use queue_key::*;
