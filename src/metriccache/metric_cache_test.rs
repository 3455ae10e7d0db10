use std::sync::Arc;
use std::thread;

use super::*;
use crate::cloudwatch::GetMetricDataInput;
use crate::cloudwatch::MetricDataQuery;

fn request_with_id(id: &str) -> GetMetricDataInput {
    GetMetricDataInput {
        metric_data_queries: vec![MetricDataQuery {
            id: id.to_string(),
            expression: Some("SUM(METRICS())".to_string()),
            return_data: true,
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn update_then_get_returns_the_request() {
    let cache = MetricCache::new();
    cache.update("ExternalMetric/default/test", "test", request_with_id("q1"));

    let request = cache.get("ExternalMetric/default/test").unwrap();
    assert_eq!(request.metric_data_queries[0].id, "q1");
    assert_eq!(cache.get_external_metric("default", "test"), Some(request));
}

#[test]
fn update_overwrites_existing_entry() {
    let cache = MetricCache::new();
    cache.update("ExternalMetric/default/test", "test", request_with_id("q1"));
    cache.update("ExternalMetric/default/test", "renamed", request_with_id("q2"));

    assert_eq!(cache.len(), 1);
    let request = cache.get_external_metric("default", "test").unwrap();
    assert_eq!(request.metric_data_queries[0].id, "q2");
    assert_eq!(cache.list_metric_names(), vec!["renamed".to_string()]);
}

#[test]
fn get_miss_returns_none() {
    let cache = MetricCache::new();
    assert!(cache.get("ExternalMetric/default/missing").is_none());
    assert!(cache.get_external_metric("default", "missing").is_none());
}

#[test]
fn remove_deletes_entry_and_name() {
    let cache = MetricCache::new();
    cache.update("ExternalMetric/default/test", "test", request_with_id("q1"));

    cache.remove("ExternalMetric/default/test");

    assert!(cache.is_empty());
    assert!(cache.list_metric_names().is_empty());
    assert!(cache.get_external_metric("default", "test").is_none());
}

#[test]
fn remove_is_idempotent() {
    let cache = MetricCache::new();
    cache.remove("ExternalMetric/default/never-added");
    cache.update("ExternalMetric/default/test", "test", request_with_id("q1"));
    cache.remove("ExternalMetric/default/test");
    cache.remove("ExternalMetric/default/test");

    assert!(cache.is_empty());
}

#[test]
fn list_metric_names_has_one_name_per_entry() {
    let cache = MetricCache::new();
    cache.update("ExternalMetric/default/a", "a", request_with_id("q1"));
    cache.update("ExternalMetric/other/b", "b", request_with_id("q1"));

    let mut names = cache.list_metric_names();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn same_name_in_different_namespaces_are_distinct_entries() {
    let cache = MetricCache::new();
    cache.update(&external_metric_key("ns1", "test"), "test", request_with_id("q1"));
    cache.update(&external_metric_key("ns2", "test"), "test", request_with_id("q2"));

    assert_eq!(cache.len(), 2);
    assert_eq!(
        cache.get_external_metric("ns2", "test").unwrap().metric_data_queries[0].id,
        "q2"
    );
}

#[test]
fn external_metric_key_format() {
    assert_eq!(external_metric_key("default", "test"), "ExternalMetric/default/test");
    assert_eq!(external_metric_key("", "test"), "ExternalMetric//test");
    assert_eq!(metric_cache_key("Other", "ns", "m"), "Other/ns/m");
}

#[test]
fn concurrent_readers_and_writer() {
    let cache = Arc::new(MetricCache::new());
    let writer = {
        let cache = cache.clone();
        thread::spawn(move || {
            for i in 0..200 {
                let key = external_metric_key("default", &format!("m{}", i % 10));
                if i % 3 == 0 {
                    cache.remove(&key);
                } else {
                    cache.update(&key, "m", request_with_id("q1"));
                }
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    if let Some(r) = cache.get_external_metric("default", &format!("m{}", i % 10)) {
                        assert_eq!(r.metric_data_queries.len(), 1);
                    }
                    assert!(cache.list_metric_names().len() <= 10);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert!(cache.len() <= 10);
}
