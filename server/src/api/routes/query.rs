//! Filtered query endpoint
//!
//! Compiles the grid's filter model into a paginated DuckDB statement that the
//! browser executes against its own copy of the parquet file.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, default_page};
use crate::core::config::QueryConfig;
use crate::core::constants::{DEFAULT_CSV_EXPORT_PER_PAGE, DEFAULT_PREVIEW_PER_PAGE};
use crate::data::filters::{FilterValue, Page, QuerySpec, TableName, compile, parse_filters};
use crate::data::sql::DuckdbDialect;

#[derive(Clone)]
pub struct QueryApiState {
    pub config: Arc<QueryConfig>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueryParams {
    /// Table (parquet view) name
    pub name: String,
    /// JSON array of filter descriptors
    pub filters: Option<String>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u64,
    /// Rows per page, defaults to `query.default_per_page`
    #[serde(rename = "perPage")]
    #[validate(range(min = 1, message = "perPage must be at least 1"))]
    pub per_page: Option<u64>,
}

/// Compiled statement pair with bind values
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Paginated `SELECT` statement
    pub statement: String,
    /// Unpaginated `COUNT(*)` statement over the same filters
    pub count_statement: String,
    /// Bind values in placeholder order
    #[schema(value_type = Vec<Object>)]
    pub values: Vec<FilterValue>,
}

impl From<QuerySpec> for QueryResponse {
    fn from(spec: QuerySpec) -> Self {
        Self {
            statement: spec.statement,
            count_statement: spec.count_statement,
            values: spec.values,
        }
    }
}

/// Log event name for a request, classified by page size
fn request_event(per_page: u64) -> &'static str {
    match per_page {
        DEFAULT_PREVIEW_PER_PAGE => "duckdb_preview",
        DEFAULT_CSV_EXPORT_PER_PAGE => "duckdb_csv",
        _ => "duckdb_other",
    }
}

/// Compile filters into a paginated query
#[utoipa::path(
    get,
    path = "/api/v1/query",
    tag = "query",
    params(QueryParams),
    responses(
        (status = 200, description = "Compiled query", body = QueryResponse),
        (status = 400, description = "Invalid table, filters or pagination", body = crate::api::types::ErrorBody)
    )
)]
pub async fn compile_query(
    State(state): State<QueryApiState>,
    ValidatedQuery(params): ValidatedQuery<QueryParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let config = &state.config;
    let per_page = params.per_page.unwrap_or(config.default_per_page);

    if params.page > config.max_page {
        return Err(ApiError::bad_request(
            "INVALID_PAGE",
            format!("page must be at most {}", config.max_page),
        ));
    }
    if per_page > config.max_per_page {
        return Err(ApiError::bad_request(
            "INVALID_PAGE",
            format!("perPage must be at most {}", config.max_per_page),
        ));
    }

    let table = TableName::parse(&params.name)?;
    let rules = parse_filters(
        params.filters.as_deref().unwrap_or_default(),
        &config.filter_limits(),
    )?;
    let page = Page::new(params.page, per_page)?;

    tracing::info!(
        event = request_event(per_page),
        table = %table,
        filters = rules.len(),
        page = page.page(),
        per_page = page.per_page(),
        "Query requested"
    );

    let mut spec = compile(&table, &rules);
    spec.paginate(&DuckdbDialect, page);

    Ok(Json(spec.into()))
}

pub fn routes(config: Arc<QueryConfig>) -> Router {
    Router::new()
        .route("/", get(compile_query))
        .with_state(QueryApiState { config })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().nest("/api/duckdb", routes(Arc::new(QueryConfig::default())))
    }

    fn query_uri(params: &[(&str, &str)]) -> String {
        format!(
            "/api/duckdb?{}",
            serde_urlencoded::to_string(params).unwrap()
        )
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_default_pagination() {
        let (status, body) = get_json("/api/duckdb?name=numbers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["statement"],
            r#"SELECT * FROM "numbers" WHERE true LIMIT 10000 OFFSET 0"#
        );
        assert_eq!(
            body["count_statement"],
            r#"SELECT COUNT(*) FROM "numbers" WHERE true"#
        );
        assert_eq!(body["values"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_filters_and_page() {
        let filters = r#"[{"type":"integer","column":"integer_col","operator":">","value":2}]"#;
        let uri = query_uri(&[
            ("name", "numbers"),
            ("filters", filters),
            ("page", "3"),
            ("perPage", "20"),
        ]);
        let (status, body) = get_json(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            body["statement"]
                .as_str()
                .unwrap()
                .ends_with(r#"WHERE true AND "integer_col" > ? LIMIT 20 OFFSET 40"#)
        );
        assert!(!body["count_statement"].as_str().unwrap().contains("LIMIT"));
        assert_eq!(body["values"], serde_json::json!([2]));
    }

    #[tokio::test]
    async fn test_invalid_table_name() {
        let (status, body) = get_json(&query_uri(&[("name", "bad;name")])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_TABLE_NAME");
    }

    #[tokio::test]
    async fn test_unknown_filter_type() {
        let filters = r#"[{"type":"geometry","column":"g","operator":"=","value":1}]"#;
        let uri = query_uri(&[("name", "numbers"), ("filters", filters)]);
        let (status, body) = get_json(&uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_FILTER_KIND");
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_per_page_too_large() {
        let (status, body) = get_json("/api/duckdb?name=numbers&perPage=1000001").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PAGE");
    }

    #[tokio::test]
    async fn test_page_zero_rejected() {
        let (status, body) = get_json("/api/duckdb?name=numbers&page=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_name() {
        let (status, body) = get_json("/api/duckdb").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "QUERY_PARSE_ERROR");
    }

    #[test]
    fn test_request_event() {
        assert_eq!(request_event(10_000), "duckdb_preview");
        assert_eq!(request_event(1_000_000), "duckdb_csv");
        assert_eq!(request_event(25), "duckdb_other");
    }
}
