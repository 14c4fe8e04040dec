// src/pipeline/retry.rs

//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::RetryConfig;

/// How often and how patiently a fetch is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubles for each further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, Duration::from_millis(config.base_delay_ms))
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `op` until it succeeds or the attempts run out.
    ///
    /// `op` receives the 1-based attempt number. The final error is wrapped in
    /// `AppError::RetriesExhausted`.
    pub async fn run<T, F, Fut>(&self, context: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        log::info!("{context}: succeeded on attempt {attempt}/{max_attempts}");
                    }
                    return Ok(value);
                }
                Err(error) if attempt < max_attempts => {
                    let delay = self.delay_for(attempt);
                    log::warn!(
                        "{context}: attempt {attempt}/{max_attempts} failed: {error}. Retrying in {delay:?}"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                Err(error) => return Err(AppError::exhausted(context, attempt, &error)),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
