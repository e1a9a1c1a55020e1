//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{health, query};
use crate::core::config::{AppConfig, QueryConfig};
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::shutdown::ShutdownService;

pub struct ApiServer {
    host: String,
    port: u16,
    query: Arc<QueryConfig>,
    allowed_origins: AllowedOrigins,
    shutdown: ShutdownService,
}

impl ApiServer {
    pub fn new(config: &AppConfig, shutdown: ShutdownService) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            query: Arc::new(config.query.clone()),
            allowed_origins: AllowedOrigins::new(&config.server.host, config.server.port),
            shutdown,
        }
    }

    /// Full application router with middleware applied
    pub fn router(&self) -> Router {
        let query_routes = query::routes(Arc::clone(&self.query));

        Router::new()
            .route("/api/v1/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .route("/api/docs/", get(swagger_ui_html))
            .nest("/api/duckdb", query_routes.clone())
            .nest("/api/v1/query", query_routes)
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http())
            .layer(middleware::cors(&self.allowed_origins))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
    }

    /// Serve until the shutdown service is triggered
    pub async fn start(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.host
                .parse()
                .with_context(|| format!("Invalid bind address: {}", self.host))?,
            self.port,
        );
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::debug!(%addr, "API server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(self.shutdown.wait())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::core::config::ServerConfig;

    fn server() -> ApiServer {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5390,
            },
            query: QueryConfig::default(),
            debug: false,
        };
        ApiServer::new(&config, ShutdownService::new())
    }

    async fn get(uri: &str) -> axum::response::Response {
        server()
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        assert_eq!(get("/api/v1/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_query_routes_mounted_twice() {
        assert_eq!(get("/api/duckdb?name=t").await.status(), StatusCode::OK);
        assert_eq!(get("/api/v1/query?name=t").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = get("/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_cors_allows_local_origin() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header(header::ORIGIN, "http://localhost:5390")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5390"
        );
    }
}
