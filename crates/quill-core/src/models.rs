use std::collections::BTreeMap;

use serde::Serialize;

/// One outgoing HTTP attempt.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Zero-based attempt index; always below the retry ceiling.
    pub attempt: u32,
    pub headers: BTreeMap<String, String>,
}

/// A single HTTP response as seen by the fetcher.
///
/// `body` is only populated for success statuses; failed attempts are
/// classified on status alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Output of a content selector, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedContent {
    pub title: String,
    pub content: String,
}

/// A cleaned, word-counted article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub url: String,
    pub title: String,
    /// Normalized plain text.
    pub content: String,
    pub word_count: usize,
}
