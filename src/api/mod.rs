use crate::error::{Error, Result};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub mod normalize;
pub mod retry;

pub use normalize::{extract_records, normalize};
use retry::{retry_call, RetryPolicy, Sleeper, TokioSleeper};

/// The parts of an HTTP response the fetcher looks at.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(HttpResponse { status, content_type, body })
    }
}

// Timeouts and dropped connections are transient; anything else reqwest
// reports is not worth retrying within the cycle.
fn classify_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() || err.is_connect() {
        Error::NetworkTimeout(err.to_string())
    } else {
        Error::HttpError(err)
    }
}

/// Source of raw candidate records for one scan cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PairSource: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<Vec<Value>>;
}

pub struct PairFetcher<T: HttpTransport> {
    transport: T,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl PairFetcher<ReqwestTransport> {
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let transport =
            ReqwestTransport::new(config.scanner.request_timeout(), &config.scanner.user_agent)?;
        Ok(Self::new(transport, config.retry.policy()))
    }
}

impl<T: HttpTransport> PairFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(transport, policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(transport: T, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { transport, policy, sleeper }
    }

    async fn fetch_once(&self, endpoint: &str) -> Result<Vec<Value>> {
        let response = self.transport.get(endpoint).await?;

        match StatusCode::from_u16(response.status) {
            Ok(StatusCode::TOO_MANY_REQUESTS) => {
                return Err(Error::RateLimitExceeded(format!("{} returned HTTP 429", endpoint)));
            }
            Ok(status) if status.is_success() => {}
            _ => return Err(Error::UpstreamStatus(response.status)),
        }

        if let Some(content_type) = &response.content_type {
            if !content_type.to_ascii_lowercase().contains("json") {
                return Err(Error::ApiInvalidFormat(format!(
                    "unexpected content-type '{}'",
                    content_type
                )));
            }
        }

        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| Error::ApiInvalidFormat(format!("unparseable body: {}", e)))?;
        let records = extract_records(&body)?;
        debug!("Fetched {} raw records from {}", records.len(), endpoint);
        Ok(records)
    }
}

#[async_trait]
impl<T: HttpTransport> PairSource for PairFetcher<T> {
    /// One GET with retry on 429 and timeouts. Exhausted retries surface as
    /// `RetriesExhausted`; format problems surface immediately.
    async fn fetch(&self, endpoint: &str) -> Result<Vec<Value>> {
        let result = retry_call(
            &self.policy,
            self.sleeper.as_ref(),
            Error::is_retryable,
            || self.fetch_once(endpoint),
        )
        .await;

        match result {
            Err(e) if e.is_retryable() => Err(Error::RetriesExhausted {
                attempts: self.policy.max_attempts(),
                reason: e.to_string(),
            }),
            Ok(records) => {
                info!("Fetched {} records", records.len());
                Ok(records)
            }
            Err(e) => Err(e),
        }
    }
}
