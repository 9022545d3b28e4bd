//! Rule-based screening of candidate pairs.
//!
//! Every rule is independent and can be switched off. A candidate passes
//! when all enabled rules pass; the result lists every failing rule so a
//! skip can be explained in one log line.

use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::models::CandidatePair;

pub const REASON_LIQUIDITY: &str = "liquidity";
pub const REASON_VOLUME: &str = "volume";
pub const REASON_LP_LOCK: &str = "lp_lock";
pub const REASON_HOLDER_CONCENTRATION: &str = "holder_concentration";
pub const REASON_VOLUME_SPIKE: &str = "volume_spike";
pub const REASON_CHAIN: &str = "chain";
pub const REASON_MINT_ALLOWLIST: &str = "mint_allowlist";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdRule {
    pub enabled: bool,
    pub threshold: f64,
}

/// A rule table as written in the config file. Keys left out keep the
/// rule's own default.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleTable {
    enabled: Option<bool>,
    threshold: Option<f64>,
}

impl RuleTable {
    fn over(self, default: ThresholdRule) -> ThresholdRule {
        ThresholdRule {
            enabled: self.enabled.unwrap_or(default.enabled),
            threshold: self.threshold.unwrap_or(default.threshold),
        }
    }
}

impl ThresholdRule {
    pub fn on(threshold: f64) -> Self {
        Self { enabled: true, threshold }
    }

    pub fn off(threshold: f64) -> Self {
        Self { enabled: false, threshold }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RulesTable")]
pub struct Rules {
    /// Minimum pool liquidity in USD.
    pub liquidity: ThresholdRule,
    /// Minimum traded volume in USD.
    pub volume: ThresholdRule,
    /// Require the LP tokens to be locked or burned.
    pub lp_lock_required: bool,
    /// Maximum share, in percent, held by the single largest holder.
    pub holder_concentration: ThresholdRule,
    /// Minimum short/baseline volume ratio.
    pub volume_spike: ThresholdRule,
    pub chain: Option<String>,
    pub mint_allowlist: Vec<String>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            liquidity: ThresholdRule::on(10_000.0),
            volume: ThresholdRule::on(10_000.0),
            lp_lock_required: true,
            holder_concentration: ThresholdRule::on(5.0),
            volume_spike: ThresholdRule::off(2.0),
            chain: None,
            mint_allowlist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RulesTable {
    liquidity: RuleTable,
    volume: RuleTable,
    lp_lock_required: Option<bool>,
    holder_concentration: RuleTable,
    volume_spike: RuleTable,
    chain: Option<String>,
    mint_allowlist: Vec<String>,
}

impl From<RulesTable> for Rules {
    fn from(table: RulesTable) -> Self {
        let defaults = Rules::default();
        Self {
            liquidity: table.liquidity.over(defaults.liquidity),
            volume: table.volume.over(defaults.volume),
            lp_lock_required: table.lp_lock_required.unwrap_or(defaults.lp_lock_required),
            holder_concentration: table.holder_concentration.over(defaults.holder_concentration),
            volume_spike: table.volume_spike.over(defaults.volume_spike),
            chain: table.chain,
            mint_allowlist: table.mint_allowlist,
        }
    }
}

impl Rules {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("liquidity", self.liquidity.threshold),
            ("volume", self.volume.threshold),
            ("holder_concentration", self.holder_concentration.threshold),
            ("volume_spike", self.volume_spike.threshold),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "filters.{} threshold must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.holder_concentration.threshold > 100.0 {
            return Err(Error::ConfigError(
                "filters.holder_concentration threshold is a percentage (0-100)".into(),
            ));
        }
        Ok(())
    }

    /// Human-readable summary of the enabled rules.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.liquidity.enabled {
            lines.push(format!("liquidity >= ${:.0}", self.liquidity.threshold));
        }
        if self.volume.enabled {
            lines.push(format!("volume >= ${:.0}", self.volume.threshold));
        }
        if self.lp_lock_required {
            lines.push("LP locked or burned".to_string());
        }
        if self.holder_concentration.enabled {
            lines.push(format!("largest holder <= {:.1}%", self.holder_concentration.threshold));
        }
        if self.volume_spike.enabled {
            lines.push(format!("volume spike >= {:.2}x", self.volume_spike.threshold));
        }
        if let Some(chain) = &self.chain {
            lines.push(format!("chain = {}", chain));
        }
        if !self.mint_allowlist.is_empty() {
            lines.push(format!("mint in allow-list ({} entries)", self.mint_allowlist.len()));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResult {
    pub pass: bool,
    pub reasons: Vec<String>,
}

// NaN compares false, so a non-finite reading always fails a minimum.
fn at_least(value: f64, min: f64) -> bool {
    value >= min
}

fn at_most(value: f64, max: f64) -> bool {
    value <= max
}

/// Pure evaluation of one candidate; no I/O, no mutation.
pub fn evaluate(pair: &CandidatePair, rules: &Rules) -> FilterResult {
    let mut reasons = Vec::new();

    if rules.liquidity.enabled && !at_least(pair.liquidity_usd, rules.liquidity.threshold) {
        reasons.push(REASON_LIQUIDITY.to_string());
    }
    if rules.volume.enabled && !at_least(pair.volume_usd, rules.volume.threshold) {
        reasons.push(REASON_VOLUME.to_string());
    }
    if rules.lp_lock_required && !pair.lock_state.is_secured() {
        reasons.push(REASON_LP_LOCK.to_string());
    }
    if rules.holder_concentration.enabled
        && !at_most(pair.max_holder_percent(), rules.holder_concentration.threshold)
    {
        reasons.push(REASON_HOLDER_CONCENTRATION.to_string());
    }
    if rules.volume_spike.enabled {
        let spiking = pair
            .volume_window_ratio
            .map_or(false, |ratio| at_least(ratio, rules.volume_spike.threshold));
        if !spiking {
            reasons.push(REASON_VOLUME_SPIKE.to_string());
        }
    }
    if let Some(required) = &rules.chain {
        let matches = pair
            .chain_id
            .as_deref()
            .map_or(false, |chain| chain.eq_ignore_ascii_case(required));
        if !matches {
            reasons.push(REASON_CHAIN.to_string());
        }
    }
    if !rules.mint_allowlist.is_empty()
        && !rules.mint_allowlist.iter().any(|m| m == &pair.base_token.address)
    {
        reasons.push(REASON_MINT_ALLOWLIST.to_string());
    }

    FilterResult {
        pass: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests;
