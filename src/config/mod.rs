use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use std::time::Duration;
use crate::api::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::filter::Rules;

pub const DEFAULT_ENDPOINT: &str = "https://api.dexscreener.com/latest/dex/pairs?chainId=solana";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub retry: RetryConfig,
    pub filters: Rules,
    pub telegram: TelegramConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    pub endpoint: String,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval_secs: 300,
            request_timeout_secs: 15,
            user_agent: concat!("pair-sentinel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScannerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_secs: Vec<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_secs: vec![30, 60, 120],
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.backoff_secs.iter().map(|s| Duration::from_secs(*s)).collect(),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    Plain,
    #[default]
    Html,
    Markdown,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub bot_token: String,
    pub chat_id: String,
    pub parse_mode: MarkupMode,
    pub startup_message: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
            chat_id: String::new(),
            parse_mode: MarkupMode::Html,
            startup_message: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AuditConfig {
    pub path: Option<PathBuf>,
    pub retain_in_memory: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("logs/alerts.jsonl")),
            retain_in_memory: 100,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub enabled: bool,
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: "0.0.0.0:10000".to_string(),
        }
    }
}

impl Config {
    /// Reads the TOML file, applies environment overrides and validates.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::load`] but leaves validation to the caller, so CLI
    /// flags can adjust the config first.
    pub fn read(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&config_str)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Secrets and the endpoint may come from the environment; these win
    /// over whatever the file says.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_TOKEN").filter(|v| !v.is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(chat) = lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty()) {
            self.telegram.chat_id = chat;
        }
        if let Some(endpoint) = lookup("SCAN_ENDPOINT").filter(|v| !v.is_empty()) {
            self.scanner.endpoint = endpoint;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scanner.endpoint.trim().is_empty() {
            return Err(Error::ConfigError("scanner.endpoint must not be empty".into()));
        }
        if self.scanner.poll_interval_secs == 0 {
            return Err(Error::ConfigError("scanner.poll_interval_secs must be positive".into()));
        }
        if self.scanner.request_timeout_secs == 0 {
            return Err(Error::ConfigError("scanner.request_timeout_secs must be positive".into()));
        }
        if self.retry.max_retries > 0 && self.retry.backoff_secs.is_empty() {
            return Err(Error::ConfigError(
                "retry.backoff_secs must list at least one delay when retries are enabled".into(),
            ));
        }
        self.filters.validate()?;
        if self.telegram.enabled
            && (self.telegram.bot_token.trim().is_empty() || self.telegram.chat_id.trim().is_empty())
        {
            return Err(Error::ConfigError(
                "telegram is enabled but bot_token or chat_id is missing".into(),
            ));
        }
        Ok(())
    }
}
