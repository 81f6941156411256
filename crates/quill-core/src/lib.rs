pub mod article;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod retry;
pub mod text;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub mod testutil;

pub use article::{ArticleService, MIN_CONTENT_CHARS};
pub use config::FetchConfig;
pub use error::{AppError, FetchError};
pub use identity::{RandomIdentity, SequenceIdentity, USER_AGENTS, build_headers};
pub use models::{ExtractionResult, FetchRequest, RawResponse, SelectedContent};
pub use retry::{RetryPolicy, RetryState, RetryingFetcher};
pub use text::{count_words, normalize};
pub use traits::{ContentSelector, Fetcher, HttpTransport, IdentityProvider};
pub use validate::is_valid_url;
