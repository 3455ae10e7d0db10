use std::fs;
use std::sync::Arc;

use cloudwatch_adapter::controller::Controller;
use cloudwatch_adapter::controller::MetricHandler;
use cloudwatch_adapter::metriccache::MetricCache;
use cloudwatch_adapter::provider::ExternalMetricsProvider;
use cloudwatch_adapter::server;
use cloudwatch_adapter::start_server as start_metrics_server;
use cloudwatch_adapter::store::load_manifests;
use cloudwatch_adapter::store::MemoryStore;
use cloudwatch_adapter::store::ObjectStore;
use cloudwatch_adapter::utils::async_task::spawn_task;
use cloudwatch_adapter::AdapterConfig;
use cloudwatch_adapter::Error;
use cloudwatch_adapter::LogConfig;
use cloudwatch_adapter::Result;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let settings = AdapterConfig::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&settings.log)?;

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    // Wire store -> controller -> cache
    let metric_cache = Arc::new(MetricCache::new());
    let store = Arc::new(MemoryStore::new());
    let handler = Arc::new(MetricHandler::new(store.clone(), metric_cache.clone()));
    let controller = Arc::new(Controller::from_config(
        &settings.controller,
        &settings.retry,
        handler,
        store.clone(),
    ));
    store.add_event_handler(Arc::new(controller.enqueuer()));

    if let Some(dir) = &settings.store.manifest_dir {
        for manifest in load_manifests(dir)? {
            store.apply(manifest);
        }
    }
    store.mark_synced();

    let mut handles = Vec::new();
    if settings.monitoring.prometheus_enabled {
        let port = settings.monitoring.prometheus_port;
        let rx = graceful_rx.clone();
        spawn_task(
            "metrics-server",
            move || async move {
                start_metrics_server(port, rx).await;
                Ok(())
            },
            Some(&mut handles),
        );
    }

    if settings.server.enabled {
        let addr = settings.server.listen_address;
        // No CloudWatch client is linked in; value reads answer 503
        let provider = Arc::new(ExternalMetricsProvider::new(metric_cache.clone(), None));
        let rx = graceful_rx.clone();
        spawn_task(
            "external-metrics-api",
            move || server::start_server(addr, provider, rx),
            Some(&mut handles),
        );
    }

    info!("Application started. Waiting for CTRL+C signal...");
    // Listen on Shutdown Signal
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    // Start Controller
    let result = controller.run(settings.controller.workers, graceful_rx).await;
    if let Err(e) = &result {
        error!("controller stops: {:?}", e);
    }

    for h in handles {
        if let Err(e) = h.await {
            error!("background task failed: {:?}", e);
        }
    }

    info!("Exiting program.");
    result
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::Fatal(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}

/// Logs to `log.log_dir/adapter.log` when set, stdout otherwise.
/// `RUST_LOG` takes precedence over `log.filter`.
pub fn init_observability(log: &LogConfig) -> Result<WorkerGuard> {
    let (non_blocking, guard) = match &log.log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "adapter.log"))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(filter);
    tracing_subscriber::registry()
        .with(base_subscriber)
        .try_init()
        .map_err(|e| Error::Fatal(format!("failed to initialise logging: {}", e)))?;

    Ok(guard)
}
