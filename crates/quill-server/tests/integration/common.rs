use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use quill_core::config::FetchConfig;
use quill_server::config::ServerConfig;
use quill_server::routes;
use quill_server::state::AppState;

fn config(allow_private_urls: bool) -> ServerConfig {
    ServerConfig {
        port: 0,
        allow_private_urls,
        fetch: FetchConfig::default().with_backoff_base(Duration::from_millis(10)),
    }
}

/// Router that may fetch from local mock servers.
pub fn setup_test_app() -> Router {
    let state = AppState::new(&config(true)).expect("Failed to build app state");
    routes::router(Arc::new(state))
}

/// Router with the private-address guard enabled, as in production.
pub fn setup_protected_app() -> Router {
    let state = AppState::new(&config(false)).expect("Failed to build app state");
    routes::router(Arc::new(state))
}

/// POST a raw body to `/v1/fetch-url` and decode the JSON reply.
pub async fn post_fetch_url(router: Router, body: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::post("/v1/fetch-url")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

pub fn url_body(url: &str) -> String {
    serde_json::json!({ "url": url }).to_string()
}
