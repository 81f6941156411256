//! Retry loop for page fetches.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! Attempting(i) --success--> Succeeded
//!      |
//!      +--failure, i+1 < max--> BackingOff(i+1, base*(i+1)) --sleep--> Attempting(i+1)
//!      |
//!      +--failure, last attempt--> Exhausted(last error)
//! ```
//!
//! [`RetryPolicy::on_outcome`] is the pure transition function; the
//! [`RetryingFetcher`] drives it with a transport and tokio's clock.

use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::{AppError, FetchError};
use crate::identity::build_headers;
use crate::models::{FetchRequest, RawResponse};
use crate::traits::{Fetcher, HttpTransport, IdentityProvider};

/// State of one fetch's retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    /// About to send attempt `attempt` (zero-based).
    Attempting { attempt: u32 },
    /// Waiting `delay` before `next_attempt`.
    BackingOff {
        next_attempt: u32,
        delay: Duration,
        last_error: FetchError,
    },
    Succeeded(RawResponse),
    Exhausted(FetchError),
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded(_) | RetryState::Exhausted(_))
    }
}

/// Attempt ceiling and linear backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_retries, config.backoff_base)
    }

    /// Delay after failed attempt `attempt` (zero-based): 1x, 2x, 3x the base.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt.saturating_add(1))
    }

    /// Initial state. A zero ceiling fails without sending anything.
    pub fn start(&self) -> RetryState {
        if self.max_retries == 0 {
            RetryState::Exhausted(FetchError::Other("request failed".to_string()))
        } else {
            RetryState::Attempting { attempt: 0 }
        }
    }

    /// Transition after attempt `attempt` produced `outcome`.
    ///
    /// Success statuses short-circuit. Every failure (blocking status, other
    /// status, transport error, timeout) backs off while attempts remain.
    pub fn on_outcome(
        &self,
        attempt: u32,
        outcome: Result<RawResponse, FetchError>,
    ) -> RetryState {
        let error = match outcome {
            Ok(response) if response.is_success() => return RetryState::Succeeded(response),
            Ok(response) => FetchError::from_status(response.status),
            Err(e) => e,
        };

        if attempt + 1 < self.max_retries {
            RetryState::BackingOff {
                next_attempt: attempt + 1,
                delay: self.delay_for_attempt(attempt),
                last_error: error,
            }
        } else {
            RetryState::Exhausted(error)
        }
    }
}

/// [`Fetcher`] that retries a single-shot transport with identity rotation.
#[derive(Clone)]
pub struct RetryingFetcher<T, I> {
    transport: T,
    identities: I,
    policy: RetryPolicy,
}

impl<T, I> RetryingFetcher<T, I>
where
    T: HttpTransport,
    I: IdentityProvider,
{
    pub fn new(transport: T, identities: I, policy: RetryPolicy) -> Self {
        Self {
            transport,
            identities,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `url`, making at most `max_retries` attempts.
    ///
    /// Headers (and so the identity) are rebuilt for every attempt.
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        max_retries: u32,
    ) -> Result<RawResponse, FetchError> {
        let policy = RetryPolicy {
            max_retries,
            ..self.policy
        };
        let mut state = policy.start();

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    let identity = self.identities.next_identity();
                    let request = FetchRequest {
                        url: url.to_string(),
                        attempt,
                        headers: build_headers(url, &identity),
                    };
                    tracing::debug!(%url, attempt, "Sending request");
                    let outcome = self.transport.send(&request).await;
                    policy.on_outcome(attempt, outcome)
                }
                RetryState::BackingOff {
                    next_attempt,
                    delay,
                    last_error,
                } => {
                    tracing::warn!(
                        %url,
                        attempts = next_attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %last_error,
                        blocking = last_error.is_blocking(),
                        "Fetch attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting {
                        attempt: next_attempt,
                    }
                }
                RetryState::Succeeded(response) => {
                    tracing::debug!(%url, status = response.status, "Fetch succeeded");
                    return Ok(response);
                }
                RetryState::Exhausted(error) => {
                    tracing::warn!(%url, %error, "Fetch failed, retries exhausted");
                    return Err(error);
                }
            };
        }
    }
}

impl<T, I> Fetcher for RetryingFetcher<T, I>
where
    T: HttpTransport,
    I: IdentityProvider,
{
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.fetch_with_retry(url, self.policy.max_retries).await?;
        Ok(response.body)
    }
}
