use crate::audit::AuditSink;
use crate::config::MarkupMode;
use crate::dedup::DedupStore;
use crate::error::Result;
use crate::filter::Rules;
use crate::models::{AlertRecord, CandidatePair};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub mod format;

pub use format::{format_alert, format_startup};

/// Outbound channel for human-readable alerts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Notifier for dry runs: the alert goes to the log and nowhere else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        info!("[dry-run] alert:\n{}", text);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub pair_id: String,
    pub notified: bool,
    pub audited: bool,
    pub errors: Vec<String>,
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        self.notified && self.audited
    }
}

pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditSink>,
    markup: MarkupMode,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, audit: Arc<dyn AuditSink>, markup: MarkupMode) -> Self {
        Self { notifier, audit, markup }
    }

    /// Marks the pair as seen, then notifies and audits. The mark happens
    /// first so a failing notifier cannot cause the same alert every cycle.
    /// Failures are logged and reported, never retried here.
    pub async fn dispatch(&self, pair: &CandidatePair, store: &mut DedupStore) -> DispatchResult {
        store.mark(&pair.pair_id);

        let record = AlertRecord::from_pair(pair, Utc::now());
        let text = format_alert(pair, self.markup);
        let mut errors = Vec::new();

        let notified = match self.notifier.send(&text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send alert for {}: {}", pair.pair_id, e);
                errors.push(format!("notifier: {}", e));
                false
            }
        };

        let audited = match self.audit.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to append audit record for {}: {}", pair.pair_id, e);
                errors.push(format!("audit: {}", e));
                false
            }
        };

        if notified {
            info!(
                "Alert sent for {} ({}) liquidity=${:.0} volume=${:.0}",
                pair.pair_id, pair.base_token.symbol, pair.liquidity_usd, pair.volume_usd
            );
        }

        DispatchResult {
            pair_id: pair.pair_id.clone(),
            notified,
            audited,
            errors,
        }
    }

    pub async fn announce_startup(&self, rules: &Rules, interval: Duration) -> Result<()> {
        self.notifier
            .send(&format_startup(rules, interval, self.markup))
            .await
    }
}
