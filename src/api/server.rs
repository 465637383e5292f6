//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers;
use super::models::{ErrorResponse, QueryParams, UrlParams};
use crate::config::Config;
use crate::error::LinkError;
use crate::pipeline::LinkPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<LinkPipeline>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pipeline: LinkPipeline, config: Config) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search", get(search_handler))
        .route("/api/download-links", get(download_links_handler))
        .route("/api/final-links", get(final_links_handler))
        .route("/api/src", get(search_and_resolve_all_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(config: Config) -> Result<()> {
    let pipeline = LinkPipeline::from_config(&config)?;
    let address = format!("{}:{}", config.server.host, config.server.port);
    let app = router(AppState::new(pipeline, config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("🌐 API server listening on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

fn respond<T: Serialize>(result: crate::Result<T>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Unwrap query parameters, reporting malformed ones as a JSON error
fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> crate::Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| LinkError::InvalidParameter(rejection.body_text()))
}

fn error_response(error: LinkError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        warn!("Request failed: {}", error);
    }

    (status, Json(ErrorResponse { error: error.to_string() })).into_response()
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(handlers::health_check().await))
}

/// Catalog search handler
async fn search_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<QueryParams>, QueryRejection>,
) -> Response {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(e) => return error_response(e),
    };
    respond(handlers::search(&state.pipeline, &params).await)
}

/// Detail page resolution handler
async fn download_links_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<UrlParams>, QueryRejection>,
) -> Response {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(e) => return error_response(e),
    };
    respond(handlers::download_links(&state.pipeline, &params).await)
}

/// Final page links handler
async fn final_links_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<UrlParams>, QueryRejection>,
) -> Response {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(e) => return error_response(e),
    };
    respond(handlers::final_links(&state.pipeline, &params).await)
}

/// Combined search and resolution handler
async fn search_and_resolve_all_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<QueryParams>, QueryRejection>,
) -> Response {
    let params = match query_params(query) {
        Ok(params) => params,
        Err(e) => return error_response(e),
    };
    respond(
        handlers::search_and_resolve_all(&state.pipeline, &state.config.server.developer, &params)
            .await,
    )
}
