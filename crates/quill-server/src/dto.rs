use serde::{Deserialize, Serialize};

use quill_core::models::ExtractionResult;

// ---------------------------------------------------------------------------
// Fetch URL
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct FetchUrlRequest {
    /// Article URL (http or https).
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchUrlResponse {
    pub url: String,
    pub title: String,
    /// Normalized plain text of the article.
    pub content: String,
    pub word_count: usize,
    pub message: String,
}

impl From<ExtractionResult> for FetchUrlResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            url: result.url,
            title: result.title,
            content: result.content,
            word_count: result.word_count,
            message: "Content fetched successfully".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message, safe to show to end users.
    pub error: String,
    /// Machine-readable error class, e.g. `blocked` or `insufficient_content`.
    pub kind: String,
    /// Manual workarounds, when there are any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remediation: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: kind.into(),
            remediation: Vec::new(),
        }
    }
}
