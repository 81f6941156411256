use quill_core::config::FetchConfig;
use quill_core::error::AppError;
use quill_core::identity::RandomIdentity;
use quill_core::models::RawResponse;
use quill_core::retry::{RetryPolicy, RetryingFetcher};
use quill_core::traits::{Fetcher, IdentityProvider};

use crate::guard::{check_scheme, check_target, parse};
use crate::transport::ReqwestTransport;

/// Production page fetcher: reqwest transport, rotating browser identity,
/// linear-backoff retries.
///
/// By default, SSRF protection is **enabled**: private/reserved targets are
/// rejected before the first attempt, and the client refuses them again on
/// every DNS lookup and redirect hop. Use
/// [`allow_private_urls`](Self::allow_private_urls) to disable this (e.g., for
/// CLI usage where the user controls the machine).
#[derive(Clone)]
pub struct ReqwestFetcher<I = RandomIdentity> {
    transport: ReqwestTransport,
    identities: I,
    config: FetchConfig,
    ssrf_protection: bool,
}

impl ReqwestFetcher<RandomIdentity> {
    pub fn new() -> Result<Self, AppError> {
        Self::from_config(&FetchConfig::default())
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, AppError> {
        Ok(Self {
            transport: ReqwestTransport::guarded(config)?,
            identities: RandomIdentity,
            config: config.clone(),
            ssrf_protection: true,
        })
    }
}

impl<I: IdentityProvider> ReqwestFetcher<I> {
    /// Replace the identity source, e.g. with a pinned User-Agent.
    pub fn with_identity<J: IdentityProvider>(self, identities: J) -> ReqwestFetcher<J> {
        ReqwestFetcher {
            transport: self.transport,
            identities,
            config: self.config,
            ssrf_protection: self.ssrf_protection,
        }
    }

    /// Disable SSRF protection, allowing requests to private/reserved IPs.
    ///
    /// Only use this for CLI usage where the user controls the machine.
    pub fn allow_private_urls(mut self) -> Result<Self, AppError> {
        self.transport = ReqwestTransport::new(&self.config)?;
        self.ssrf_protection = false;
        Ok(self)
    }

    /// Fetch `url` and return the final response, including status and the
    /// post-redirect URL.
    pub async fn fetch_raw(&self, url: &str) -> Result<RawResponse, AppError> {
        if self.ssrf_protection {
            check_target(url).await?;
        } else {
            check_scheme(&parse(url)?)?;
        }

        let policy = RetryPolicy::from_config(&self.config);
        let retrying = RetryingFetcher::new(self.transport.clone(), self.identities.clone(), policy);
        Ok(retrying.fetch_with_retry(url, policy.max_retries).await?)
    }
}

impl<I: IdentityProvider> Fetcher for ReqwestFetcher<I> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self.fetch_raw(url).await?;
        tracing::debug!(
            status = response.status,
            final_url = %response.final_url,
            "Fetched page"
        );
        Ok(response.body)
    }
}
