use std::future::Future;

use crate::error::{AppError, FetchError};
use crate::models::{FetchRequest, RawResponse, SelectedContent};

/// Issues exactly one HTTP GET. Retrying is the caller's concern.
///
/// Implementations return `Ok` for every HTTP response regardless of status
/// and `Err` only for transport failures (timeouts, resets, DNS).
pub trait HttpTransport: Send + Sync + Clone {
    fn send(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// Source of client identity (User-Agent) strings, consulted once per attempt.
pub trait IdentityProvider: Send + Sync + Clone {
    fn next_identity(&self) -> String;
}

/// Fetches the HTML body of a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Locates the title and main article text in an HTML document.
pub trait ContentSelector: Send + Sync + Clone {
    fn select(&self, html: &str, url: &str) -> Result<SelectedContent, AppError>;
}
