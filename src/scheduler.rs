use crate::alerts::{AlertDispatcher, DispatchResult};
use crate::api::{normalize, PairSource};
use crate::config::Config;
use crate::dedup::DedupStore;
use crate::filter::evaluate;
use crate::metrics::ScanMetrics;
use crate::models::CandidatePair;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Fetching,
    Filtering,
    Dispatching,
    Sleeping,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkipRecord {
    pub pair_id: String,
    pub reasons: Vec<String>,
}

/// What one iteration did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub fetched: usize,
    pub normalized: usize,
    pub parse_errors: usize,
    pub skipped: Vec<SkipRecord>,
    pub duplicates: Vec<String>,
    pub dispatched: Vec<DispatchResult>,
    /// Set when the cycle was abandoned at the fetch stage.
    pub error: Option<String>,
}

impl CycleReport {
    pub fn is_abandoned(&self) -> bool {
        self.error.is_some()
    }
}

/// Snapshot shared with the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub state: ScanState,
    pub cycles: u64,
    pub alerts_sent: u64,
    pub dedup_size: usize,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for ScanStatus {
    fn default() -> Self {
        Self {
            state: ScanState::Idle,
            cycles: 0,
            alerts_sent: 0,
            dedup_size: 0,
            last_cycle_at: None,
            last_error: None,
        }
    }
}

pub struct Scheduler {
    config: Arc<Config>,
    source: Arc<dyn PairSource>,
    dispatcher: AlertDispatcher,
    store: DedupStore,
    state: ScanState,
    metrics: Option<ScanMetrics>,
    status: Arc<RwLock<ScanStatus>>,
}

impl Scheduler {
    pub fn new(config: Arc<Config>, source: Arc<dyn PairSource>, dispatcher: AlertDispatcher) -> Self {
        Self {
            config,
            source,
            dispatcher,
            store: DedupStore::new(),
            state: ScanState::Idle,
            metrics: None,
            status: Arc::new(RwLock::new(ScanStatus::default())),
        }
    }

    pub fn with_metrics(mut self, metrics: ScanMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    pub fn status_handle(&self) -> Arc<RwLock<ScanStatus>> {
        self.status.clone()
    }

    async fn set_state(&mut self, state: ScanState) {
        self.state = state;
        self.status.write().await.state = state;
    }

    /// One iteration: fetch, normalize, filter, dedup, dispatch. Failures
    /// are contained here; the caller always gets a report back.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        if let Some(m) = &self.metrics {
            m.cycles.inc();
        }

        self.set_state(ScanState::Fetching).await;
        let started = Instant::now();
        let fetched = self.source.fetch(&self.config.scanner.endpoint).await;
        if let Some(m) = &self.metrics {
            m.fetch_latency.observe(started.elapsed().as_secs_f64());
        }

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                error!("Scan cycle abandoned ({:?}): {}", e.kind(), e);
                if let Some(m) = &self.metrics {
                    m.cycles_abandoned.inc();
                }
                report.error = Some(e.to_string());
                self.finish_cycle(&report).await;
                return report;
            }
        };
        report.fetched = records.len();

        self.set_state(ScanState::Filtering).await;
        let mut passing: Vec<CandidatePair> = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let pair = match normalize(record) {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Skipping malformed record #{}: {}", index, e);
                    report.parse_errors += 1;
                    continue;
                }
            };
            report.normalized += 1;

            let result = evaluate(&pair, &self.config.filters);
            if result.pass {
                passing.push(pair);
            } else {
                info!(
                    "Skipping {} ({}): {}",
                    pair.pair_id,
                    pair.base_token.symbol,
                    result.reasons.join(", ")
                );
                report.skipped.push(SkipRecord {
                    pair_id: pair.pair_id,
                    reasons: result.reasons,
                });
            }
        }

        self.set_state(ScanState::Dispatching).await;
        for pair in &passing {
            if self.store.seen(&pair.pair_id) {
                debug!("Already alerted {}, skipping", pair.pair_id);
                report.duplicates.push(pair.pair_id.clone());
                continue;
            }
            let result = self.dispatcher.dispatch(pair, &mut self.store).await;
            if !result.is_success() {
                warn!("Dispatch for {} incomplete: {}", pair.pair_id, result.errors.join("; "));
            }
            report.dispatched.push(result);
        }

        self.finish_cycle(&report).await;
        report
    }

    async fn finish_cycle(&mut self, report: &CycleReport) {
        let notified = report.dispatched.iter().filter(|d| d.notified).count() as u64;

        if let Some(m) = &self.metrics {
            m.records_fetched.inc_by(report.fetched as u64);
            m.parse_errors.inc_by(report.parse_errors as u64);
            m.candidates_skipped.inc_by(report.skipped.len() as u64);
            m.candidates_duplicate.inc_by(report.duplicates.len() as u64);
            m.candidates_passed
                .inc_by((report.dispatched.len() + report.duplicates.len()) as u64);
            m.alerts_dispatched.inc_by(report.dispatched.len() as u64);
            m.dispatch_failures
                .inc_by(report.dispatched.iter().filter(|d| !d.is_success()).count() as u64);
            m.dedup_size.set(self.store.len() as i64);
        }

        let mut status = self.status.write().await;
        status.cycles += 1;
        status.alerts_sent += notified;
        status.dedup_size = self.store.len();
        status.last_cycle_at = Some(Utc::now());
        status.last_error = report.error.clone();
    }

    /// Loops until `shutdown` turns true. The interval is measured from the
    /// end of one iteration to the start of the next.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        if self.config.telegram.startup_message {
            let interval = self.config.scanner.poll_interval();
            if let Err(e) = self.dispatcher.announce_startup(&self.config.filters, interval).await {
                warn!("Failed to send startup message: {}", e);
            }
        }

        let interval = self.config.scanner.poll_interval();
        loop {
            if *shutdown.borrow() {
                break;
            }

            self.set_state(ScanState::Idle).await;
            let report = self.run_cycle().await;
            if !report.is_abandoned() {
                info!(
                    "Scan complete: {} fetched, {} parse errors, {} skipped, {} duplicates, {} dispatched",
                    report.fetched,
                    report.parse_errors,
                    report.skipped.len(),
                    report.duplicates.len(),
                    report.dispatched.len()
                );
            }

            self.set_state(ScanState::Sleeping).await;
            debug!("Sleeping {}s until next scan", interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.set_state(ScanState::Idle).await;
        let alerts_sent = self.status.read().await.alerts_sent;
        info!(
            "Scheduler stopped: {} alerts sent, {} pairs marked",
            alerts_sent,
            self.store.len()
        );
    }

    /// Runs exactly one iteration, for `--once`.
    pub async fn run_once(&mut self) -> CycleReport {
        self.set_state(ScanState::Idle).await;
        let report = self.run_cycle().await;
        self.set_state(ScanState::Idle).await;
        report
    }
}
