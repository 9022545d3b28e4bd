use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

pub mod market;

pub use market::{BaseToken, CandidatePair, HolderShare, LockState};

/// One line of the audit trail: when a pair was alerted and the values
/// that justified it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub timestamp: DateTime<Utc>,
    pub pair_id: String,
    pub name: String,
    pub symbol: String,
    pub mint: String,
    pub liquidity_usd: f64,
    pub volume_usd: f64,
    pub max_holder_percent: f64,
    pub lock_state: LockState,
    pub volume_window_ratio: Option<f64>,
    pub url: Option<String>,
}

impl AlertRecord {
    pub fn from_pair(pair: &CandidatePair, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            pair_id: pair.pair_id.clone(),
            name: pair.base_token.name.clone(),
            symbol: pair.base_token.symbol.clone(),
            mint: pair.base_token.address.clone(),
            liquidity_usd: pair.liquidity_usd,
            volume_usd: pair.volume_usd,
            max_holder_percent: pair.max_holder_percent(),
            lock_state: pair.lock_state,
            volume_window_ratio: pair.volume_window_ratio,
            url: pair.url.clone(),
        }
    }

    /// Spreadsheet-style row, column order fixed.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339(),
            self.pair_id.clone(),
            self.name.clone(),
            self.symbol.clone(),
            self.mint.clone(),
            format!("{:.2}", self.liquidity_usd),
            format!("{:.2}", self.volume_usd),
            format!("{:.2}", self.max_holder_percent),
            self.lock_state.to_string(),
            self.volume_window_ratio.map(|r| format!("{:.2}", r)).unwrap_or_default(),
            self.url.clone().unwrap_or_default(),
        ]
    }
}
