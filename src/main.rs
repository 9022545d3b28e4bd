use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use prometheus::Registry;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use pair_sentinel::alerts::{AlertDispatcher, LogNotifier, Notifier};
use pair_sentinel::api::PairFetcher;
use pair_sentinel::audit::AuditLog;
use pair_sentinel::cli::Cli;
use pair_sentinel::config::Config;
use pair_sentinel::logging;
use pair_sentinel::metrics::ScanMetrics;
use pair_sentinel::scheduler::Scheduler;
use pair_sentinel::telegram::TelegramNotifier;
use pair_sentinel::web::WebServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from("config/config.toml"));
    let mut config = Config::read(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    if cli.dry_run {
        config.telegram.enabled = false;
    }
    config.validate().context("Invalid configuration")?;

    logging::init(cli.debug, config.logging.file.as_deref())?;
    info!("Starting pair scanner against {}", config.scanner.endpoint);
    let config = Arc::new(config);

    // Initialize components
    let notifier: Arc<dyn Notifier> = if config.telegram.enabled {
        let telegram = TelegramNotifier::new(&config.telegram)?;
        if let Err(e) = telegram.initialize().await {
            warn!("Telegram check failed, alerts may not be delivered: {}", e);
        }
        Arc::new(telegram)
    } else {
        info!("Telegram disabled, alerts will only be logged");
        Arc::new(LogNotifier)
    };

    let audit = Arc::new(AuditLog::new(config.audit.retain_in_memory, config.audit.path.clone()).await?);
    if let Some(path) = audit.path() {
        info!("Audit records appended to {}", path.display());
    }

    let source = Arc::new(PairFetcher::from_config(&config)?);
    let dispatcher = AlertDispatcher::new(notifier, audit, config.telegram.parse_mode);
    let metrics = ScanMetrics::new(Registry::new())?;
    let mut scheduler =
        Scheduler::new(config.clone(), source, dispatcher).with_metrics(metrics.clone());

    if cli.once {
        let report = scheduler.run_once().await;
        info!(
            "Single scan finished: {} fetched, {} skipped, {} dispatched",
            report.fetched,
            report.skipped.len(),
            report.dispatched.len()
        );
        if let Some(e) = report.error {
            return Err(anyhow::anyhow!("Scan failed: {}", e));
        }
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let web_handle = if config.web.enabled {
        let addr: SocketAddr = config
            .web
            .bind
            .parse()
            .with_context(|| format!("Invalid web.bind address '{}'", config.web.bind))?;
        let server = WebServer::new(scheduler.status_handle(), metrics);
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = server.start(addr, rx).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            // keep the sender alive so the scheduler is not stopped
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested, finishing current scan");
        let _ = shutdown_tx.send(true);
    });

    scheduler.run(shutdown_rx).await;

    if let Some(handle) = web_handle {
        if let Err(e) = handle.await {
            error!("Web server task failed: {}", e);
        }
    }
    info!("Shutdown complete");
    Ok(())
}
