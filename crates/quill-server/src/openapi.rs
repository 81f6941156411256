use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill API",
        version = "0.1.0",
        description = "Fetches a web page and extracts its main article as clean plain text."
    ),
    paths(crate::routes::fetch_url, crate::routes::health),
    components(schemas(
        crate::dto::FetchUrlRequest,
        crate::dto::FetchUrlResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "articles", description = "Article extraction"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
