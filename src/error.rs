use std::io;
use std::result::Result as StdResult;
use thiserror::Error;
use teloxide::RequestError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Network timeout: {0}")]
    NetworkTimeout(String),
    #[error("Retries exhausted after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },
    #[error("API invalid format: {0}")]
    ApiInvalidFormat(String),
    #[error("Upstream returned HTTP {0}")]
    UpstreamStatus(u16),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Dispatch error: {0}")]
    DispatchError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Where an error sits in the containment hierarchy (record < batch < cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient upstream condition, worth another attempt.
    Retryable,
    /// The whole response is unusable; abandon the cycle.
    Fatal,
    /// A single record is malformed; skip it.
    Parse,
    /// Notifier or audit sink failed.
    Dispatch,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::RateLimitExceeded(_)
            | Error::NetworkTimeout(_)
            | Error::RetriesExhausted { .. } => ErrorKind::Retryable,
            Error::ApiInvalidFormat(_) | Error::UpstreamStatus(_) | Error::HttpError(_) => {
                ErrorKind::Fatal
            }
            Error::ParseError(_) => ErrorKind::Parse,
            Error::DispatchError(_) => ErrorKind::Dispatch,
            Error::ConfigError(_) | Error::InternalError(_) | Error::IoError(_) => ErrorKind::Other,
        }
    }

    /// True for causes the fetcher retries. `RetriesExhausted` is already
    /// the end of a retry loop and is not retried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimitExceeded(_) | Error::NetworkTimeout(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ApiInvalidFormat(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::DispatchError(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::InternalError(err.to_string())
    }
}

pub type Result<T> = StdResult<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::RateLimitExceeded("429".into()).kind(), ErrorKind::Retryable);
        assert_eq!(Error::NetworkTimeout("slow".into()).kind(), ErrorKind::Retryable);
        assert_eq!(
            Error::RetriesExhausted { attempts: 4, reason: "429".into() }.kind(),
            ErrorKind::Retryable
        );
        assert_eq!(Error::ApiInvalidFormat("html".into()).kind(), ErrorKind::Fatal);
        assert_eq!(Error::UpstreamStatus(500).kind(), ErrorKind::Fatal);
        assert_eq!(Error::ParseError("no id".into()).kind(), ErrorKind::Parse);
        assert_eq!(Error::DispatchError("down".into()).kind(), ErrorKind::Dispatch);
    }

    #[test]
    fn test_only_causes_are_retried() {
        assert!(Error::RateLimitExceeded("429".into()).is_retryable());
        assert!(Error::NetworkTimeout("slow".into()).is_retryable());
        assert!(!Error::RetriesExhausted { attempts: 4, reason: "429".into() }.is_retryable());
        assert!(!Error::ApiInvalidFormat("html".into()).is_retryable());
    }

    #[test]
    fn test_json_error_is_fatal() {
        let err: Error = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Fatal);
    }
}
