use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use quill_core::config::FetchConfig;
use quill_core::error::{AppError, FetchError};
use quill_core::models::{FetchRequest, RawResponse};
use quill_core::traits::HttpTransport;
use reqwest::Client;

use crate::guard::{GuardError, PublicResolver, redirect_policy};

/// Single-shot HTTP GET over reqwest.
///
/// Follows redirects up to the configured limit and enforces a hard
/// per-request timeout. The body is read only for success statuses.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Transport that connects to any address.
    pub fn new(config: &FetchConfig) -> Result<Self, AppError> {
        Self::build(config, false)
    }

    /// Transport that refuses private and reserved addresses on every DNS
    /// lookup and every redirect hop.
    pub fn guarded(config: &FetchConfig) -> Result<Self, AppError> {
        Self::build(config, true)
    }

    fn build(config: &FetchConfig, guarded: bool) -> Result<Self, AppError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect_policy(config.max_redirects, guarded));
        if guarded {
            builder = builder.dns_resolver(Arc::new(PublicResolver));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Self::new(&FetchConfig::default().with_timeout(timeout))
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &FetchRequest) -> Result<RawResponse, FetchError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            // reqwest negotiates and decodes compression itself.
            if name.eq_ignore_ascii_case("accept-encoding") {
                continue;
            }
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        if !response.status().is_success() {
            return Ok(RawResponse {
                status,
                final_url,
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(RawResponse {
            status,
            final_url,
            body,
        })
    }
}

impl ReqwestTransport {
    fn classify(&self, e: reqwest::Error) -> FetchError {
        if let Some(refusal) = guard_error(&e) {
            FetchError::Other(format!("Request refused: {refusal}"))
        } else if e.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            FetchError::Other(format!("Connection failed: {e}"))
        } else if e.is_redirect() {
            FetchError::Other(format!("Too many redirects: {e}"))
        } else {
            FetchError::Other(e.to_string())
        }
    }
}

/// The guard's refusal somewhere in the error's source chain.
fn guard_error(e: &reqwest::Error) -> Option<&GuardError> {
    let mut source = e.source();
    while let Some(err) = source {
        if let Some(refusal) = err.downcast_ref::<GuardError>() {
            return Some(refusal);
        }
        source = err.source();
    }
    None
}
