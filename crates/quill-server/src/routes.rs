use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use quill_core::error::AppError;
use quill_core::validate::is_valid_url;

use crate::dto::{FetchUrlRequest, FetchUrlResponse, HealthResponse};
use crate::error::{ApiError, panic_response};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/fetch-url", post(fetch_url))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Fetch URL
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/fetch-url",
    request_body = FetchUrlRequest,
    responses(
        (status = 200, description = "Extracted article", body = FetchUrlResponse),
        (status = 400, description = "Bad request, or the page could not be fetched or extracted", body = crate::dto::ErrorResponse),
        (status = 500, description = "Internal error", body = crate::dto::ErrorResponse),
    ),
    tag = "articles"
)]
pub async fn fetch_url(
    State(state): State<Arc<AppState>>,
    payload: Result<axum::Json<FetchUrlRequest>, JsonRejection>,
) -> Result<axum::Json<FetchUrlResponse>, ApiError> {
    let axum::Json(body) = payload?;

    let url = body
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(ApiError::MissingUrl)?;

    if !is_valid_url(url) {
        return Err(AppError::InvalidUrl(url.to_string()).into());
    }

    let result = state.articles.fetch_content(url).await?;
    tracing::info!(%url, word_count = result.word_count, "Article fetched");

    Ok(axum::Json(FetchUrlResponse::from(result)))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse { status: "healthy" })
}
