use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseToken {
    pub name: String,
    pub symbol: String,
    pub address: String,
}

/// Canonical liquidity-pool lock state. Providers report this as booleans
/// or strings; the normalizer folds all of them into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Locked,
    Burned,
    Unlocked,
    Unknown,
}

impl LockState {
    pub fn is_secured(self) -> bool {
        matches!(self, LockState::Locked | LockState::Burned)
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LockState::Locked => "locked",
            LockState::Burned => "burned",
            LockState::Unlocked => "unlocked",
            LockState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderShare {
    pub holder: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub pair_id: String,
    pub base_token: BaseToken,
    pub liquidity_usd: f64,
    pub volume_usd: f64,
    pub lock_state: LockState,
    pub holders: Vec<HolderShare>,
    /// Short-window volume divided by the baseline-window volume, when the
    /// provider reports enough windows to compute it.
    pub volume_window_ratio: Option<f64>,
    pub chain_id: Option<String>,
    pub url: Option<String>,
}

impl CandidatePair {
    /// Share held by the single largest holder. No holder data counts as
    /// fully concentrated so the holder rule can never pass on absence.
    pub fn max_holder_percent(&self) -> f64 {
        self.holders
            .iter()
            .map(|h| h.percent)
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
            .unwrap_or(100.0)
    }
}
