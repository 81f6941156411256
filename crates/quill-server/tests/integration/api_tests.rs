use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mockito::Server;
use tower::ServiceExt;

use crate::integration::common::{post_fetch_url, setup_protected_app, setup_test_app, url_body};

const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Understanding Ownership</title></head>
<body>
    <nav>Home | Blog | About</nav>
    <article>
        <h1>Understanding Ownership</h1>
        <p>Ownership is a set of rules that govern how a Rust program manages memory.</p>
        <p>All programs have to manage the way they use memory while running.</p>
    </article>
    <footer>Copyright</footer>
</body>
</html>"#;

#[tokio::test]
async fn health_returns_200() {
    let response = setup_test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn openapi_document_lists_fetch_url() {
    let response = setup_test_app()
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["paths"]["/v1/fetch-url"]["post"].is_object());
}

#[tokio::test]
async fn fetches_article() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/posts/ownership")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(ARTICLE_HTML)
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/posts/ownership", server.url());
    let (status, json) = post_fetch_url(setup_test_app(), &url_body(&url)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], url);
    assert_eq!(json["title"], "Understanding Ownership");
    assert_eq!(json["message"], "Content fetched successfully");
    let content = json["content"].as_str().unwrap();
    assert!(content.starts_with("Understanding Ownership\n"));
    assert!(!content.contains("Copyright"));
    assert!(json["wordCount"].as_u64().unwrap() > 20);
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_url_returns_400() {
    for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": "   "}"#, r#"{"url": null}"#] {
        let (status, json) = post_fetch_url(setup_test_app(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["error"], "Please provide a URL", "{body}");
    }
}

#[tokio::test]
async fn invalid_url_returns_400() {
    let (status, json) = post_fetch_url(setup_test_app(), &url_body("ftp://example.com")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid URL format");
    assert_eq!(json["kind"], "invalid_url");
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let (status, json) = post_fetch_url(setup_test_app(), "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "invalid_body");
}

#[tokio::test]
async fn blocked_page_returns_remediation() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/members-only")
        .with_status(403)
        .expect(3)
        .create_async()
        .await;

    let url = format!("{}/members-only", server.url());
    let (status, json) = post_fetch_url(setup_test_app(), &url_body(&url)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "blocked");
    assert!(json["error"].as_str().unwrap().contains("403"));
    assert_eq!(json["remediation"].as_array().unwrap().len(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn thin_page_returns_insufficient_content() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/thin")
        .with_status(200)
        .with_body("<html><head><title>Hello</title></head><body><p>0123456789</p></body></html>")
        .create_async()
        .await;

    let url = format!("{}/thin", server.url());
    let (status, json) = post_fetch_url(setup_test_app(), &url_body(&url)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "insufficient_content");
    assert!(json["error"].as_str().unwrap().contains("login"));
}

#[tokio::test]
async fn private_addresses_are_refused_by_default() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(ARTICLE_HTML)
        .expect(0)
        .create_async()
        .await;

    let (status, json) = post_fetch_url(setup_protected_app(), &url_body(&server.url())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "forbidden_address");
    assert_eq!(json["error"], "This address is not allowed");
    mock.assert_async().await;
}
