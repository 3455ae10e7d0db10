use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tracing::debug;

use super::Queue;
use super::QueueItemBound;

/// Upper bound on how long the timer task sleeps without re-checking
const MAX_WAIT: Duration = Duration::from_secs(10);

/// [`Queue`] with the ability to add an item after a delay.
///
/// Delayed items are held by a background task until ready. Adding an item
/// that is already waiting keeps the earlier of the two ready times.
pub struct DelayingQueue<T> {
    queue: Arc<Queue<T>>,
    waiting_tx: mpsc::UnboundedSender<WaitFor<T>>,
    stop_tx: watch::Sender<()>,
}

struct WaitFor<T> {
    item: T,
    ready_at: Instant,
}

impl<T: QueueItemBound> DelayingQueue<T> {
    /// Creates the queue and spawns its timer task on the current runtime
    pub fn new(name: impl Into<String>) -> Self {
        let queue = Arc::new(Queue::new(name));
        let (waiting_tx, waiting_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(());

        tokio::spawn(waiting_loop(queue.clone(), waiting_rx, stop_rx));

        Self {
            queue,
            waiting_tx,
            stop_tx,
        }
    }

    /// Adds `item` once `delay` has passed. A zero delay adds immediately.
    pub fn add_after(
        &self,
        item: T,
        delay: Duration,
    ) {
        if self.queue.is_shutting_down() {
            return;
        }
        if delay.is_zero() {
            self.queue.add(item);
            return;
        }

        let wait = WaitFor {
            item,
            ready_at: Instant::now() + delay,
        };
        if let Err(e) = self.waiting_tx.send(wait) {
            debug!(queue = %self.queue.name(), item = ?e.0.item, "timer task gone, dropping delayed add");
        }
    }

    pub fn add(
        &self,
        item: T,
    ) {
        self.queue.add(item);
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

    pub fn name(&self) -> &str {
        self.queue.name()
    }

    /// Shuts down the inner queue and stops the timer task; items still
    /// waiting for their delay are discarded.
    pub fn shut_down(&self) {
        self.queue.shut_down();
        let _ = self.stop_tx.send(());
    }

    pub fn is_shutting_down(&self) -> bool {
        self.queue.is_shutting_down()
    }
}

impl<T> Drop for DelayingQueue<T> {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}

async fn waiting_loop<T: QueueItemBound>(
    queue: Arc<Queue<T>>,
    mut waiting_rx: mpsc::UnboundedReceiver<WaitFor<T>>,
    mut stop_rx: watch::Receiver<()>,
) {
    // (ready_at, seq) orders entries; seq breaks ties between equal instants
    let mut by_ready: BTreeMap<(Instant, u64), T> = BTreeMap::new();
    let mut entries: HashMap<T, (Instant, u64)> = HashMap::new();
    let mut seq: u64 = 0;

    loop {
        let now = Instant::now();
        while let Some(entry) = by_ready.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let item = entry.remove();
            entries.remove(&item);
            queue.add(item);
        }

        let deadline = by_ready
            .keys()
            .next()
            .map(|(ready_at, _)| *ready_at)
            .unwrap_or_else(|| now + MAX_WAIT)
            .min(now + MAX_WAIT);

        tokio::select! {
            _ = stop_rx.changed() => return,
            _ = sleep_until(deadline) => {}
            wait = waiting_rx.recv() => {
                let Some(WaitFor { item, ready_at }) = wait else {
                    return;
                };
                if ready_at <= Instant::now() {
                    queue.add(item);
                    continue;
                }

                match entries.get(&item).copied() {
                    Some(existing) if existing.0 <= ready_at => {}
                    Some(existing) => {
                        by_ready.remove(&existing);
                        seq += 1;
                        by_ready.insert((ready_at, seq), item.clone());
                        entries.insert(item, (ready_at, seq));
                    }
                    None => {
                        seq += 1;
                        by_ready.insert((ready_at, seq), item.clone());
                        entries.insert(item, (ready_at, seq));
                    }
                }
            }
        }
    }
}
