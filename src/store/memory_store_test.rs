use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::api::ExternalMetric;
use crate::test_utils::new_external_metric;
use crate::test_utils::new_full_external_metric;
use crate::test_utils::shutdown_channel;

#[test]
fn test_apply_then_get() {
    let store = MemoryStore::new();
    store.apply(new_external_metric());

    let found = store.get("default", "test").unwrap().unwrap();
    assert_eq!(found.name(), "test");
    assert!(store.get("default", "missing").unwrap().is_none());
    assert!(store.get("other", "test").unwrap().is_none());
}

#[test]
fn test_cluster_scoped_object_is_indexed_by_name() {
    let store = MemoryStore::new();
    let mut metric = new_external_metric();
    metric.metadata.namespace = String::new();
    store.apply(metric);

    assert!(store.get("", "test").unwrap().is_some());
}

#[test]
fn test_apply_notifies_add_then_update() {
    let store = MemoryStore::new();
    let mut handler = MockResourceEventHandler::new();
    handler.expect_on_add().times(1).returning(|_| ());
    handler
        .expect_on_update()
        .times(1)
        .withf(|old, new| old.spec.queries.len() == 1 && new.spec.queries.len() == 3)
        .returning(|_, _| ());
    handler.expect_on_delete().never();
    store.add_event_handler(Arc::new(handler));

    store.apply(new_external_metric());
    let mut updated = new_full_external_metric("test");
    updated.metadata.namespace = "default".to_string();
    store.apply(updated);

    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_notifies_and_returns_object() {
    let store = MemoryStore::new();
    store.apply(new_external_metric());

    let mut handler = MockResourceEventHandler::new();
    // Replay of the existing object
    handler.expect_on_add().times(1).returning(|_| ());
    handler
        .expect_on_delete()
        .times(1)
        .withf(|obj| obj.name() == "test")
        .returning(|_| ());
    store.add_event_handler(Arc::new(handler));

    let removed = store.delete("default", "test");
    assert!(removed.is_some());
    assert!(store.is_empty());

    // Deleting again is a no-op without notification
    assert!(store.delete("default", "test").is_none());
}

#[test]
fn test_handler_sees_new_state_on_lookup() {
    struct LookupHandler {
        store: Arc<MemoryStore>,
        seen: parking_lot::Mutex<Vec<bool>>,
    }
    impl ResourceEventHandler for LookupHandler {
        fn on_add(
            &self,
            obj: &crate::api::ExternalMetric,
        ) {
            let found = self.store.get(obj.namespace(), obj.name()).unwrap().is_some();
            self.seen.lock().push(found);
        }
        fn on_update(
            &self,
            _old: &crate::api::ExternalMetric,
            _new: &crate::api::ExternalMetric,
        ) {
        }
        fn on_delete(
            &self,
            obj: &crate::api::ExternalMetric,
        ) {
            let found = self.store.get(obj.namespace(), obj.name()).unwrap().is_some();
            self.seen.lock().push(found);
        }
    }

    let store = Arc::new(MemoryStore::new());
    let handler = Arc::new(LookupHandler {
        store: store.clone(),
        seen: parking_lot::Mutex::new(Vec::new()),
    });
    store.add_event_handler(handler.clone());

    store.apply(new_external_metric());
    store.delete("default", "test");

    assert_eq!(*handler.seen.lock(), vec![true, false]);
}

#[tokio::test]
async fn test_wait_for_cache_sync_after_mark_synced() {
    let store = Arc::new(MemoryStore::new());
    let (_tx, rx) = shutdown_channel();
    assert!(!store.has_synced());

    let waiter = {
        let store = store.clone();
        tokio::spawn(async move { store.wait_for_cache_sync(rx).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    store.mark_synced();

    assert!(waiter.await.unwrap());
    assert!(store.has_synced());
}

#[tokio::test]
async fn test_wait_for_cache_sync_already_synced() {
    let store = MemoryStore::new();
    store.mark_synced();
    let (_tx, rx) = shutdown_channel();

    assert!(store.wait_for_cache_sync(rx).await);
}

#[tokio::test]
async fn test_wait_for_cache_sync_loses_to_shutdown() {
    let store = MemoryStore::new();
    let (tx, rx) = shutdown_channel();
    tx.send(()).unwrap();

    assert!(!store.wait_for_cache_sync(rx).await);
}

/// Remembers the key of every object it is told about
#[derive(Default)]
struct RecordingHandler {
    seen: parking_lot::Mutex<std::collections::HashSet<String>>,
}

impl ResourceEventHandler for RecordingHandler {
    fn on_add(
        &self,
        obj: &ExternalMetric,
    ) {
        self.seen.lock().insert(obj.namespace_key());
    }

    fn on_update(
        &self,
        _old: &ExternalMetric,
        new: &ExternalMetric,
    ) {
        self.seen.lock().insert(new.namespace_key());
    }

    fn on_delete(
        &self,
        _obj: &ExternalMetric,
    ) {
    }
}

#[test]
fn test_registration_racing_applies_misses_no_object() {
    for _ in 0..20 {
        let store = Arc::new(MemoryStore::new());
        let handler = Arc::new(RecordingHandler::default());

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let mut metric = new_external_metric();
                        metric.metadata.name = format!("m{}-{}", t, i);
                        store.apply(metric);
                    }
                })
            })
            .collect();

        let registrar = {
            let store = store.clone();
            let handler = handler.clone();
            std::thread::spawn(move || store.add_event_handler(handler))
        };

        for w in writers {
            w.join().unwrap();
        }
        registrar.join().unwrap();

        assert_eq!(store.len(), 200);
        assert_eq!(handler.seen.lock().len(), 200);
    }
}
