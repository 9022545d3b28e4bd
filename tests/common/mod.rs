#![allow(dead_code)]

use async_trait::async_trait;
use pair_sentinel::alerts::Notifier;
use pair_sentinel::api::retry::Sleeper;
use pair_sentinel::api::{HttpResponse, HttpTransport, PairSource};
use pair_sentinel::config::Config;
use pair_sentinel::error::{Error, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// Helper to create a config that never touches the network or Telegram
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.scanner.endpoint = "https://example.test/pairs".to_string();
    config.telegram.enabled = false;
    config.telegram.startup_message = false;
    config.audit.path = None;
    config
}

pub fn pair_record(id: &str, liquidity: f64, volume_h24: f64, locked: bool, top_holder: f64) -> Value {
    json!({
        "chainId": "solana",
        "dexId": "raydium",
        "url": format!("https://dexscreener.com/solana/{}", id),
        "pairAddress": id,
        "baseToken": { "address": format!("{}-mint", id), "name": format!("{} token", id), "symbol": id.to_uppercase() },
        "volume": { "h1": volume_h24 / 24.0, "h24": volume_h24 },
        "liquidity": { "usd": liquidity, "lock": locked },
        "holders": [ { "address": "w1", "percent": top_holder } ]
    })
}

pub fn json_response(body: &Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        content_type: Some("application/json".to_string()),
        body: body.to_string(),
    }
}

pub fn rate_limited() -> HttpResponse {
    HttpResponse {
        status: 429,
        content_type: Some("text/plain".to_string()),
        body: "Too Many Requests".to_string(),
    }
}

/// Replays scripted responses in order; the last one repeats once the
/// script runs out.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    last: Mutex<Option<HttpResponse>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                Ok(response)
            }
            None => last
                .clone()
                .ok_or_else(|| Error::NetworkTimeout("no scripted response".to_string())),
        }
    }
}

/// Records requested delays instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn secs(&self) -> Vec<u64> {
        self.delays.lock().unwrap().iter().map(|d| d.as_secs()).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(Error::DispatchError("chat not found".to_string()));
        }
        Ok(())
    }
}

/// Serves the same batch every cycle and signals after each fetch.
pub struct BatchSource {
    pub batch: Vec<Value>,
    pub fetched: Arc<Notify>,
}

#[async_trait]
impl PairSource for BatchSource {
    async fn fetch(&self, _endpoint: &str) -> Result<Vec<Value>> {
        self.fetched.notify_one();
        Ok(self.batch.clone())
    }
}
