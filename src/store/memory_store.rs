use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use super::CacheSync;
use super::ExternalMetricLister;
use super::ObjectStore;
use super::ResourceEventHandler;
use crate::api::ExternalMetric;
use crate::Result;

/// Process-local object store.
///
/// Objects are indexed by `namespace/name`. Every write is fanned out to the
/// registered event handlers after the index has been updated, so a handler
/// that looks the object up again observes the new state.
pub struct MemoryStore {
    objects: DashMap<String, Arc<ExternalMetric>>,
    handlers: RwLock<Vec<Arc<dyn ResourceEventHandler>>>,
    synced: watch::Sender<bool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (synced, _) = watch::channel(false);
        Self {
            objects: DashMap::new(),
            handlers: RwLock::new(Vec::new()),
            synced,
        }
    }

    /// Creates or replaces an object and notifies handlers
    pub fn apply(
        &self,
        obj: ExternalMetric,
    ) {
        // Held across the insert so a concurrent registration sees this
        // object either in its replay or as a live notification
        let handlers = self.handlers.read();
        let new = Arc::new(obj);
        let old = self.objects.insert(new.namespace_key(), new.clone());

        match old {
            Some(old) => {
                debug!("store: update {}", new.namespace_key());
                for h in handlers.iter() {
                    h.on_update(&old, &new);
                }
            }
            None => {
                debug!("store: add {}", new.namespace_key());
                for h in handlers.iter() {
                    h.on_add(&new);
                }
            }
        }
    }

    /// Removes an object and notifies handlers. Returns the removed object.
    pub fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> Option<Arc<ExternalMetric>> {
        let handlers = self.handlers.read();
        let (key, removed) = self.objects.remove(&index_key(namespace, name))?;
        debug!("store: delete {}", key);
        for h in handlers.iter() {
            h.on_delete(&removed);
        }
        Some(removed)
    }

    /// Declares the initial contents loaded
    pub fn mark_synced(&self) {
        self.synced.send_replace(true);
    }

    pub fn has_synced(&self) -> bool {
        *self.synced.borrow()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ExternalMetricLister for MemoryStore {
    fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<ExternalMetric>>> {
        Ok(self.objects.get(&index_key(namespace, name)).map(|e| e.value().clone()))
    }
}

#[async_trait]
impl CacheSync for MemoryStore {
    async fn wait_for_cache_sync(
        &self,
        mut shutdown: watch::Receiver<()>,
    ) -> bool {
        let mut synced = self.synced.subscribe();
        tokio::select! {
            biased;
            synced_ok = async { synced.wait_for(|s| *s).await.is_ok() } => synced_ok,
            _ = shutdown.changed() => false,
        }
    }
}

impl ObjectStore for MemoryStore {
    fn add_event_handler(
        &self,
        handler: Arc<dyn ResourceEventHandler>,
    ) {
        let mut handlers = self.handlers.write();
        let existing: Vec<_> = self.objects.iter().map(|e| e.value().clone()).collect();
        for obj in &existing {
            handler.on_add(obj);
        }
        handlers.push(handler);
    }
}

fn index_key(
    namespace: &str,
    name: &str,
) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}
