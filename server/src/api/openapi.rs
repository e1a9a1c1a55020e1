//! OpenAPI document and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{health, query};
use crate::api::types::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PQViewer API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Filter compilation for the parquet viewer"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "query", description = "Filtered query compilation")
    ),
    paths(health::health, query::compile_query),
    components(schemas(health::HealthResponse, query::QueryResponse, ErrorBody))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Swagger UI loaded from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>PQViewer API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({ url: "/api/openapi.json", dom_id: "#swagger-ui" });
        };
    </script>
</body>
</html>"##;
