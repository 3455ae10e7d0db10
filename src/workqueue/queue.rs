use std::collections::HashSet;
use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::trace;

use super::QueueItemBound;
use crate::WORKQUEUE_ADDS;
use crate::WORKQUEUE_DEPTH;

/// FIFO work queue with deduplication.
///
/// - An item is pending at most once: re-adding a pending item is a no-op.
/// - An item handed out by [`Queue::get`] is "processing" until [`Queue::done`]
///   is called. Adds during that window are remembered and the item is put back
///   on `done`, so no two workers ever hold the same item.
pub struct Queue<T> {
    name: String,
    state: Mutex<State<T>>,
    notify: Notify,
}

struct State<T> {
    queue: VecDeque<T>,
    /// Items that need processing
    dirty: HashSet<T>,
    /// Items currently held by a worker
    processing: HashSet<T>,
    shutting_down: bool,
}

impl<T: QueueItemBound> Queue<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State {
                queue: VecDeque::new(),
                dirty: HashSet::new(),
                processing: HashSet::new(),
                shutting_down: false,
            }),
            notify: Notify::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Marks `item` as needing processing
    pub fn add(
        &self,
        item: T,
    ) {
        {
            let mut state = self.state.lock();
            if state.shutting_down {
                trace!(queue = %self.name, ?item, "dropping add after shutdown");
                return;
            }
            if state.dirty.contains(&item) {
                return;
            }

            WORKQUEUE_ADDS.with_label_values(&[&self.name]).inc();
            state.dirty.insert(item.clone());
            if state.processing.contains(&item) {
                return;
            }

            state.queue.push_back(item);
            WORKQUEUE_DEPTH.with_label_values(&[&self.name]).set(state.queue.len() as i64);
        }
        self.notify.notify_one();
    }

    /// Number of items waiting to be handed out
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits for the next item.
    ///
    /// Returns `None` once the queue is shut down and drained. Callers must
    /// call [`Queue::done`] with the returned item when finished with it.
    pub async fn get(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(item) = state.queue.pop_front() {
                    WORKQUEUE_DEPTH.with_label_values(&[&self.name]).set(state.queue.len() as i64);
                    state.processing.insert(item.clone());
                    state.dirty.remove(&item);
                    return Some(item);
                }
                if state.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks `item` as done processing. If it was re-added meanwhile it goes
    /// back on the queue.
    pub fn done(
        &self,
        item: &T,
    ) {
        let requeued = {
            let mut state = self.state.lock();
            state.processing.remove(item);
            if state.dirty.contains(item) {
                state.queue.push_back(item.clone());
                WORKQUEUE_DEPTH.with_label_values(&[&self.name]).set(state.queue.len() as i64);
                true
            } else {
                false
            }
        };
        if requeued {
            self.notify.notify_one();
        }
    }

    /// Stops accepting new items. Pending items are still handed out; once
    /// they are gone every waiting `get` returns `None`.
    pub fn shut_down(&self) {
        self.state.lock().shutting_down = true;
        self.notify.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state.lock().shutting_down
    }
}
