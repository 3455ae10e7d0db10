use autometrics::prometheus_exporter;
use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;


lazy_static! {
    pub static ref WORKQUEUE_ADDS: IntCounterVec = IntCounterVec::new(
        Opts::new("workqueue_adds_total", "Total number of adds handled by the work queue"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref WORKQUEUE_DEPTH: IntGaugeVec = IntGaugeVec::new(
        Opts::new("workqueue_depth", "Current number of items waiting in the work queue"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref WORKQUEUE_RETRIES: IntCounterVec = IntCounterVec::new(
        Opts::new("workqueue_retries_total", "Total number of rate limited adds"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref RECONCILE_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reconcile_total", "Reconciliations by resource kind and outcome"),
        &["kind", "outcome"]
    )
    .expect("metric can not be created");

    pub static ref REPORTED_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("reported_errors_total", "Errors sent to the error sink"),
        &["source"]
    )
    .expect("metric can not be created");

    pub static ref METRIC_CACHE_ENTRIES: IntGauge = IntGauge::new(
        "metric_cache_entries",
        "Number of metric requests held in the metric cache"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

/// Registers the adapter collectors on `registry`. Collectors that are
/// already present are left alone.
pub fn register_custom_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(WORKQUEUE_ADDS.clone()),
        Box::new(WORKQUEUE_DEPTH.clone()),
        Box::new(WORKQUEUE_RETRIES.clone()),
        Box::new(RECONCILE_TOTAL.clone()),
        Box::new(REPORTED_ERRORS.clone()),
        Box::new(METRIC_CACHE_ENTRIES.clone()),
    ];
    for c in collectors {
        if let Err(e) = registry.register(c) {
            if !matches!(e, prometheus::Error::AlreadyReg) {
                error!("collector can not be registered: {}", e);
            }
        }
    }
}

pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics(&REGISTRY);
    if let Err(e) = prometheus_exporter::try_init() {
        // Already initialised by an earlier call
        info!("autometrics exporter: {}", e);
    }

    let registry = REGISTRY.clone();
    let metrics_route = warp::path!("metrics")
        .map(move || registry.clone())
        .and_then(metrics_handler);

    info!("metrics server listening on port {}", port);
    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler(registry: Registry) -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    let mut res = String::from_utf8(buffer).unwrap_or_else(|e| {
        error!("custom metrics could not be from_utf8'd: {}", e);
        String::default()
    });

    res.push_str(&get_metrics_body());
    Ok(res)
}

/// Export autometrics output for Prometheus to scrape
pub fn get_metrics_body() -> String {
    prometheus_exporter::encode_http_response().into_body()
}
