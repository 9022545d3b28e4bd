use crate::config::Config;
use crate::models::{BaseToken, CandidatePair, HolderShare, LockState};
use serde_json::{json, Value};

// Helper to create a config that never touches the network or Telegram.
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.scanner.endpoint = "https://example.test/pairs".to_string();
    config.telegram.enabled = false;
    config.telegram.startup_message = false;
    config.audit.path = None;
    config
}

// Helper to create a normalized candidate with a single holder entry
pub fn create_test_pair(
    id: &str,
    liquidity_usd: f64,
    volume_usd: f64,
    lock_state: LockState,
    max_holder_percent: f64,
) -> CandidatePair {
    CandidatePair {
        pair_id: id.to_string(),
        base_token: BaseToken {
            name: format!("{} token", id),
            symbol: id.to_uppercase(),
            address: format!("{}-mint", id),
        },
        liquidity_usd,
        volume_usd,
        lock_state,
        holders: vec![HolderShare {
            holder: "w1".to_string(),
            percent: max_holder_percent,
        }],
        volume_window_ratio: None,
        chain_id: Some("solana".to_string()),
        url: Some(format!("https://dexscreener.com/solana/{}", id)),
    }
}

// Helper to create a raw DexScreener-shaped pair record
pub fn create_dexscreener_record(id: &str, liquidity: f64, volume_h24: f64, locked: bool, top_holder: f64) -> Value {
    json!({
        "chainId": "solana",
        "dexId": "raydium",
        "url": format!("https://dexscreener.com/solana/{}", id),
        "pairAddress": id,
        "baseToken": { "address": format!("{}-mint", id), "name": format!("{} token", id), "symbol": id.to_uppercase() },
        "quoteToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
        "volume": { "m5": 100.0, "h1": volume_h24 / 12.0, "h6": volume_h24 / 3.0, "h24": volume_h24 },
        "liquidity": { "usd": liquidity, "lock": locked },
        "holders": [ { "address": "w1", "percent": top_holder } ]
    })
}
