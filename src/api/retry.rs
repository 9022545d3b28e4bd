use async_trait::async_trait;
use log::warn;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with an escalating delay schedule. Retry `n` (0-based)
/// waits `backoff[n]`; once the schedule runs out the last delay repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Vec<Duration>) -> Self {
        Self { max_retries, backoff }
    }

    pub fn no_retry() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        let idx = (retry as usize).min(self.backoff.len().saturating_sub(1));
        self.backoff.get(idx).copied().unwrap_or(Duration::ZERO)
    }

    /// The full sequence of delays a maximal retry run would sleep.
    pub fn delays(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|n| self.delay_for(n)).collect()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or the policy's retries are used up. The last error is returned as-is.
pub async fn retry_call<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: Display,
{
    let mut retry = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) && retry < policy.max_retries() => {
                let delay = policy.delay_for(retry);
                warn!(
                    "Attempt {}/{} failed: {}. Backing off for {} seconds...",
                    retry + 1,
                    policy.max_attempts(),
                    e,
                    delay.as_secs()
                );
                sleeper.sleep(delay).await;
                retry += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
