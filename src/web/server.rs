use crate::error::{Error, Result};
use crate::metrics::ScanMetrics;
use crate::scheduler::ScanStatus;
use log::{error, info};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

pub struct WebServer {
    status: Arc<RwLock<ScanStatus>>,
    metrics: ScanMetrics,
}

impl WebServer {
    pub fn new(status: Arc<RwLock<ScanStatus>>, metrics: ScanMetrics) -> Self {
        Self { status, metrics }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        routes(self.status.clone(), self.metrics.clone())
    }

    /// Serves until `shutdown` turns true.
    pub async fn start(self, addr: SocketAddr, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, async move {
                while shutdown.changed().await.is_ok() {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            })
            .map_err(|e| Error::InternalError(format!("failed to bind {}: {}", addr, e)))?;

        info!("Web server listening on {}", bound);
        server.await;
        info!("Web server stopped");
        Ok(())
    }
}

pub fn routes(
    status: Arc<RwLock<ScanStatus>>,
    metrics: ScanMetrics,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end().and(warp::get()).map(|| "running");

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_status(status))
        .and_then(health_check);

    let metrics = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::any().map(move || metrics.clone()))
        .and_then(get_metrics);

    index.or(health).or(metrics)
}

fn with_status(
    status: Arc<RwLock<ScanStatus>>,
) -> impl Filter<Extract = (Arc<RwLock<ScanStatus>>,), Error = Infallible> + Clone {
    warp::any().map(move || status.clone())
}

async fn health_check(status: Arc<RwLock<ScanStatus>>) -> std::result::Result<impl Reply, Infallible> {
    let snapshot = status.read().await.clone();
    Ok(warp::reply::json(&json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "scanner": snapshot,
    })))
}

async fn get_metrics(metrics: ScanMetrics) -> std::result::Result<Box<dyn Reply>, Infallible> {
    match metrics.render() {
        Ok(text) => Ok(Box::new(warp::reply::with_header(
            text,
            "content-type",
            "text/plain; version=0.0.4",
        ))),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            Ok(Box::new(warp::reply::with_status(
                "failed to render metrics",
                StatusCode::INTERNAL_SERVER_ERROR,
            )))
        }
    }
}
