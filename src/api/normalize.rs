//! Maps provider-specific JSON into [`CandidatePair`].
//!
//! Three record shapes are understood: DexScreener pairs, Birdeye token-list
//! entries and streaming token events. Missing or unparseable values fall
//! back to fail-safe defaults; only a record without any identifier is
//! rejected.

use serde_json::Value;
use crate::error::{Error, Result};
use crate::models::{BaseToken, CandidatePair, HolderShare, LockState};

const PAIR_ID_PATHS: &[&[&str]] = &[
    &["pairAddress"],
    &["pair_address"],
    &["pairId"],
    &["pair_id"],
    &["address"],
    &["mint"],
    &["baseTokenMint"],
    &["id"],
];

const TOKEN_OBJECT_PATHS: &[&[&str]] = &[&["baseToken"], &["base_token"], &["token"]];

const TOKEN_ADDRESS_PATHS: &[&[&str]] = &[&["address"], &["mint"], &["baseTokenMint"]];

const LIQUIDITY_PATHS: &[&[&str]] = &[
    &["liquidity", "usd"],
    &["liquidity_usd"],
    &["liquidityUsd"],
    &["liquidity"],
];

const VOLUME_PATHS: &[&[&str]] = &[
    &["volume", "h24"],
    &["volume_24h"],
    &["volume24h"],
    &["v24hUSD"],
    &["volume_usd"],
    &["volume"],
];

const LOCK_STATUS_PATHS: &[&[&str]] = &[
    &["liquidity", "lockStatus"],
    &["lp_lock_state"],
    &["lp_status"],
    &["lpStatus"],
];

const BURNED_FLAG_PATHS: &[&[&str]] = &[
    &["liquidity", "burned"],
    &["lp_burned"],
    &["lpBurned"],
];

const LOCKED_FLAG_PATHS: &[&[&str]] = &[
    &["liquidity", "lock"],
    &["liquidity", "locked"],
    &["lp_locked"],
    &["lpLocked"],
];

const HOLDER_LIST_PATHS: &[&[&str]] = &[&["holders"], &["top_holders"], &["topHolders"]];

const HOLDER_AGGREGATE_PATHS: &[&[&str]] = &[
    &["holders_share_top"],
    &["top_holder_percent"],
    &["topHolderPercent"],
];

const CHAIN_PATHS: &[&[&str]] = &[&["chainId"], &["chain_id"], &["chain"]];

const BATCH_KEYS: &[&str] = &["pairs", "tokens", "items", "results", "data"];

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn first_of<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(value, path))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Commas are only accepted as thousands separators (`1,234,567.8`).
/// Anything else with a comma, such as a decimal comma, is unreadable.
fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();
    if !text.contains(',') {
        return text.parse::<f64>().ok();
    }

    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    if fraction.map_or(false, |f| f.contains(',')) {
        return None;
    }

    let digits = integer.strip_prefix('-').unwrap_or(integer);
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());
    let mut groups = digits.split(',');
    let leading = groups.next()?;
    if leading.is_empty() || leading.len() > 3 || !all_digits(leading) {
        return None;
    }
    if !groups.all(|group| group.len() == 3 && all_digits(group)) {
        return None;
    }

    text.replace(',', "").parse::<f64>().ok()
}

fn first_number(value: &Value, paths: &[&[&str]]) -> Option<f64> {
    paths.iter().find_map(|path| lookup(value, path).and_then(as_number))
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn first_flag(value: &Value, paths: &[&[&str]]) -> Option<bool> {
    paths.iter().find_map(|path| lookup(value, path).and_then(as_flag))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_text(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| lookup(value, path).and_then(as_text))
}

/// Negative, non-finite or absent amounts become zero.
fn non_negative(amount: Option<f64>) -> f64 {
    match amount {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

fn parse_lock_status(text: &str) -> Option<LockState> {
    match text.trim().to_ascii_lowercase().as_str() {
        "locked" | "lock" => Some(LockState::Locked),
        "burned" | "burnt" | "burn" => Some(LockState::Burned),
        "unlocked" | "none" => Some(LockState::Unlocked),
        _ => None,
    }
}

fn lock_state(record: &Value) -> LockState {
    if let Some(state) = first_text(record, LOCK_STATUS_PATHS).and_then(|s| parse_lock_status(&s)) {
        return state;
    }
    let burned = first_flag(record, BURNED_FLAG_PATHS);
    let locked = first_flag(record, LOCKED_FLAG_PATHS);
    match (burned, locked) {
        (Some(true), _) => LockState::Burned,
        (_, Some(true)) => LockState::Locked,
        (Some(false), _) | (_, Some(false)) => LockState::Unlocked,
        (None, None) => LockState::Unknown,
    }
}

fn holder_shares(record: &Value) -> Vec<HolderShare> {
    if let Some(Value::Array(entries)) = first_of(record, HOLDER_LIST_PATHS) {
        let holders: Vec<HolderShare> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| HolderShare {
                holder: first_text(entry, &[&["address"], &["owner"], &["holder"], &["wallet"]])
                    .unwrap_or_else(|| format!("holder-{}", i + 1)),
                // A share we cannot read is assumed to be everything.
                percent: first_number(entry, &[&["percent"], &["share"], &["percentage"], &["pct"]])
                    .filter(|p| p.is_finite() && *p >= 0.0)
                    .unwrap_or(100.0),
            })
            .collect();
        if !holders.is_empty() {
            return holders;
        }
    }
    match first_number(record, HOLDER_AGGREGATE_PATHS) {
        Some(percent) if percent.is_finite() && percent >= 0.0 => vec![HolderShare {
            holder: "top".to_string(),
            percent,
        }],
        _ => Vec::new(),
    }
}

/// Last hour's volume against the average hour of the last day.
fn volume_window_ratio(record: &Value) -> Option<f64> {
    if let Some(ratio) = first_number(record, &[&["volume_window_ratio"], &["volumeWindowRatio"]]) {
        return Some(ratio).filter(|r| r.is_finite() && *r >= 0.0);
    }
    let short = lookup(record, &["volume", "h1"]).and_then(as_number)?;
    let baseline = lookup(record, &["volume", "h24"]).and_then(as_number)?;
    if !short.is_finite() || !baseline.is_finite() || short < 0.0 || baseline <= 0.0 {
        return None;
    }
    Some(short / (baseline / 24.0))
}

pub fn normalize(record: &Value) -> Result<CandidatePair> {
    if !record.is_object() {
        return Err(Error::ParseError(format!(
            "expected a JSON object, got {}",
            type_name(record)
        )));
    }

    let pair_id = first_text(record, PAIR_ID_PATHS)
        .ok_or_else(|| Error::ParseError("record has no pair identifier".into()))?;

    let token_obj = first_of(record, TOKEN_OBJECT_PATHS)
        .filter(|v| v.is_object())
        .unwrap_or(record);
    let base_token = BaseToken {
        name: first_text(token_obj, &[&["name"]]).unwrap_or_else(|| "Unknown".to_string()),
        symbol: first_text(token_obj, &[&["symbol"]]).unwrap_or_else(|| "?".to_string()),
        address: first_text(token_obj, TOKEN_ADDRESS_PATHS)
            .or_else(|| first_text(record, &[&["baseTokenMint"], &["mint"]]))
            .unwrap_or_default(),
    };

    Ok(CandidatePair {
        pair_id,
        base_token,
        liquidity_usd: non_negative(first_number(record, LIQUIDITY_PATHS)),
        volume_usd: non_negative(first_number(record, VOLUME_PATHS)),
        lock_state: lock_state(record),
        holders: holder_shares(record),
        volume_window_ratio: volume_window_ratio(record),
        chain_id: first_text(record, CHAIN_PATHS),
        url: first_text(record, &[&["url"]]),
    })
}

/// Pulls the list of records out of a response body. The list may be the
/// body itself or sit under one of the usual envelope keys, one level deep.
pub fn extract_records(body: &Value) -> Result<Vec<Value>> {
    fn find(value: &Value, depth: usize) -> Option<Vec<Value>> {
        match value {
            Value::Array(items) => Some(items.clone()),
            Value::Object(map) if depth < 2 => {
                for key in BATCH_KEYS {
                    match map.get(*key) {
                        Some(Value::Array(items)) => return Some(items.clone()),
                        Some(Value::Null) if *key == "pairs" => return Some(Vec::new()),
                        Some(inner @ Value::Object(_)) => {
                            if let Some(items) = find(inner, depth + 1) {
                                return Some(items);
                            }
                        }
                        _ => {}
                    }
                }
                None
            }
            _ => None,
        }
    }

    find(body, 0).ok_or_else(|| {
        Error::ApiInvalidFormat(format!(
            "response has no top-level list of records ({})",
            type_name(body)
        ))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
