use clap::{ArgAction, Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use vmanage_exporter::{
    Cancellation, CollectorConfig, VmanageClient,
    collector::{ErrorCounter, MetricsProjector, Scheduler, ScrapeOrchestrator, SnapshotCache},
    server::{self, AppState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "vmanage-exporter",
    about = "Prometheus exporter for Cisco vManage",
    version
)]
struct Args {
    /// Base URL of the vManage controller.
    #[arg(long = "vmanage.endpoint", env = "VMANAGE_ENDPOINT")]
    endpoint: String,

    /// Address on which to expose metrics and web interface.
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9910")]
    listen_address: SocketAddr,

    /// Path under which to expose metrics.
    #[arg(long = "web.metrics-path", default_value = "/metrics", value_parser = parse_metrics_path)]
    metrics_path: String,

    /// Verify the controller's TLS certificate.
    #[arg(long = "tls.verify", default_value_t = true, action = ArgAction::Set)]
    tls_verify: bool,

    /// Polling interval, also the deadline of each scrape cycle.
    #[arg(long = "scrape.interval", default_value = "15s", value_parser = humantime::parse_duration)]
    scrape_interval: Duration,

    /// Max scrape errors before reporting the exporter as unhealthy.
    #[arg(long = "scrape.max-errors", default_value_t = 100)]
    max_errors: u64,

    /// Concurrent per-device workers in a scrape cycle.
    #[arg(long = "scrape.workers", default_value_t = 5)]
    workers: usize,

    /// Skip a tick while the previous scrape cycle is still running.
    #[arg(long = "scrape.skip-overlapping")]
    skip_overlapping: bool,

    /// Log output format.
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn parse_metrics_path(path: &str) -> Result<String, String> {
    if !path.starts_with('/') {
        return Err("must start with '/'".to_string());
    }
    if path == "/" || path == "/health" {
        return Err(format!("{path} is reserved"));
    }
    Ok(path.to_string())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn credential(name: &str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{name} must be set"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = CollectorConfig {
        scrape_interval: args.scrape_interval,
        workers: args.workers,
        skip_overlapping: args.skip_overlapping,
    };
    config.validate()?;

    let client = VmanageClient::builder()
        .endpoint(args.endpoint.clone())?
        .credentials(credential("VMANAGE_USER")?, credential("VMANAGE_PASSWORD")?)?
        .verify_tls(args.tls_verify)
        .request_timeout(args.scrape_interval)
        .build()?;

    if !args.tls_verify {
        warn!("TLS certificate verification is disabled");
    }

    info!(endpoint = %args.endpoint, "Validating credentials");
    if let Err(e) = client.login().await {
        error!(error = %e, "Initial login failed");
        return Err(e.into());
    }

    let cache = SnapshotCache::new(config.cache_ttl());
    let sweeper = cache.spawn_sweeper(config.cache_sweep_interval());
    let errors = ErrorCounter::new();

    let orchestrator = Arc::new(ScrapeOrchestrator::new(
        Arc::new(client.clone()),
        cache.clone(),
        errors.clone(),
        config.workers,
    ));
    let shutdown = Cancellation::never();
    let schedule = Scheduler::new(orchestrator, &config).spawn(shutdown.clone());

    let app = server::router(AppState {
        projector: MetricsProjector::new(cache, errors.clone()),
        errors,
        max_errors: args.max_errors,
        metrics_path: Arc::from(args.metrics_path.as_str()),
    });

    let listener = tokio::net::TcpListener::bind(args.listen_address).await?;
    info!(address = %args.listen_address, "Start listening for connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(e) = schedule.await {
        warn!(error = %e, "Scrape schedule ended abnormally");
    }
    sweeper.abort();

    if let Err(e) = client.logout().await {
        warn!(error = %e, "Logout failed");
    }
    info!("Exporter stopped");
    Ok(())
}
