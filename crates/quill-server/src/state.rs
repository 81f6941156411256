use quill_client::{HtmlContentSelector, ReqwestFetcher};
use quill_core::ArticleService;
use quill_core::error::AppError;

use crate::config::ServerConfig;

pub type Articles = ArticleService<ReqwestFetcher, HtmlContentSelector>;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub articles: Articles,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, AppError> {
        let mut fetcher = ReqwestFetcher::from_config(&config.fetch)?;
        if config.allow_private_urls {
            tracing::warn!("Private URL guard disabled");
            fetcher = fetcher.allow_private_urls()?;
        }

        Ok(Self {
            articles: ArticleService::new(fetcher, HtmlContentSelector::new()),
        })
    }
}
