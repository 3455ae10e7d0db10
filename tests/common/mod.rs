use std::sync::Arc;
use std::time::Duration;

use cloudwatch_adapter::api::Dimension;
use cloudwatch_adapter::api::ExternalMetric;
use cloudwatch_adapter::api::Metric;
use cloudwatch_adapter::api::MetricDataQuery;
use cloudwatch_adapter::api::MetricSeriesSpec;
use cloudwatch_adapter::api::MetricStat;
use cloudwatch_adapter::controller::Controller;
use cloudwatch_adapter::controller::MetricHandler;
use cloudwatch_adapter::metriccache::MetricCache;
use cloudwatch_adapter::store::MemoryStore;
use cloudwatch_adapter::store::ObjectStore;
use cloudwatch_adapter::ControllerConfig;
use cloudwatch_adapter::RateLimitPolicy;
use cloudwatch_adapter::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// A running reconciliation pipeline over an in-memory store
pub struct Pipeline {
    pub store: Arc<MemoryStore>,
    pub metric_cache: Arc<MetricCache>,
    pub controller: Arc<Controller>,
    shutdown_tx: watch::Sender<()>,
    run: JoinHandle<Result<()>>,
}

impl Pipeline {
    /// Wires and starts the pipeline; `seed` is loaded before the store is
    /// marked synced
    pub fn start(seed: Vec<ExternalMetric>) -> Self {
        enable_logger();
        let store = Arc::new(MemoryStore::new());
        let metric_cache = Arc::new(MetricCache::new());
        let handler = Arc::new(MetricHandler::new(store.clone(), metric_cache.clone()));
        let controller = Arc::new(Controller::from_config(
            &ControllerConfig::default(),
            &RateLimitPolicy::no_delay(),
            handler,
            store.clone(),
        ));
        store.add_event_handler(Arc::new(controller.enqueuer()));

        for obj in seed {
            store.apply(obj);
        }
        store.mark_synced();

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let run = tokio::spawn(controller.clone().run(2, shutdown_rx));

        Self {
            store,
            metric_cache,
            controller,
            shutdown_tx,
            run,
        }
    }

    /// Sends the shutdown signal and waits for the workers to exit
    pub async fn stop(self) -> Result<()> {
        self.shutdown_tx.send(()).expect("controller is listening");
        tokio::time::timeout(Duration::from_secs(5), self.run)
            .await
            .expect("controller should stop")
            .expect("controller task should not panic")
    }
}

/// Polls `check` until it holds or five seconds pass
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}

/// `default/test` with one metric stat query `q1` on `NS`/`M` `{D: V}`
pub fn simple_metric() -> ExternalMetric {
    ExternalMetric::new(
        "default",
        "test",
        MetricSeriesSpec {
            name: "test".to_string(),
            queries: vec![MetricDataQuery {
                id: "q1".to_string(),
                metric_stat: MetricStat {
                    metric: Metric {
                        namespace: "NS".to_string(),
                        metric_name: "M".to_string(),
                        dimensions: vec![Dimension {
                            name: "D".to_string(),
                            value: "V".to_string(),
                        }],
                    },
                    period: 60,
                    stat: "Average".to_string(),
                    unit: "Count".to_string(),
                },
                return_data: true,
                ..Default::default()
            }],
            ..Default::default()
        },
    )
}
