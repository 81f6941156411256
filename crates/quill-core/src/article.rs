use crate::error::AppError;
use crate::models::ExtractionResult;
use crate::text::{count_words, normalize};
use crate::traits::{ContentSelector, Fetcher};
use crate::validate::is_valid_url;

/// Normalized content shorter than this (in characters) is rejected.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Orchestrates article extraction: validate → fetch → select → normalize → count.
///
/// Generic over the fetcher and the content selector so tests can run the
/// whole pipeline without network access.
#[derive(Clone)]
pub struct ArticleService<F, S>
where
    F: Fetcher,
    S: ContentSelector,
{
    fetcher: F,
    selector: S,
}

impl<F, S> ArticleService<F, S>
where
    F: Fetcher,
    S: ContentSelector,
{
    pub fn new(fetcher: F, selector: S) -> Self {
        Self { fetcher, selector }
    }

    /// Fetch `url` and extract its article.
    ///
    /// Fails with [`AppError::InvalidUrl`] before any network access, with
    /// [`AppError::Fetch`] when the retry budget is spent, and with
    /// [`AppError::InsufficientContent`] when fewer than
    /// [`MIN_CONTENT_CHARS`] characters survive normalization.
    pub async fn fetch_content(&self, url: &str) -> Result<ExtractionResult, AppError> {
        if !is_valid_url(url) {
            return Err(AppError::InvalidUrl(url.to_string()));
        }

        tracing::info!("Fetching {}", url);
        let html = self.fetcher.fetch(url).await?;
        tracing::info!("Fetched {} bytes of HTML", html.len());

        let selected = self.selector.select(&html, url)?;
        let content = normalize(&selected.content);
        let title = normalize(&selected.title);

        let chars = content.chars().count();
        tracing::info!(chars, title = %title, "Selected article content");
        if chars < MIN_CONTENT_CHARS {
            tracing::warn!(%url, chars, "Extracted content below minimum");
            return Err(AppError::InsufficientContent {
                chars,
                min: MIN_CONTENT_CHARS,
            });
        }

        let word_count = count_words(&content);
        tracing::info!(word_count, "Extraction complete");

        Ok(ExtractionResult {
            url: url.to_string(),
            title,
            content,
            word_count,
        })
    }
}
