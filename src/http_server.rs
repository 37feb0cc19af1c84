//! HTTP server implementation using Axum.
//!
//! Thin shell over the pipeline: request validation, error-to-status
//! mapping, CORS. Request-level throttling is deliberately not done here;
//! any production deployment should put a concurrency bound in front of
//! `/prove`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{validate_timeout, DEFAULT_TIMEOUT_SECS};
use crate::harvest::RenderFormat;
use crate::pipeline::{ProveRequest, ResultRecord};
use crate::state::AppState;

#[derive(Deserialize)]
struct ProveBody {
    sequent: String,
    #[serde(default)]
    formats: Vec<RenderFormat>,
    #[serde(default = "default_timeout")]
    timeout: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Run the HTTP server on the given port with the provided state.
pub async fn run_server(port: u16, state: AppState) {
    let app = Router::new()
        .route("/prove", post(prove))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health() -> &'static str {
    "OK"
}

async fn prove(
    State(state): State<AppState>,
    Json(body): Json<ProveBody>,
) -> Result<Json<ResultRecord>, (StatusCode, String)> {
    let request = validate(body).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let record = state
        .pipeline
        .execute(&request)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(record))
}

fn validate(body: ProveBody) -> Result<ProveRequest, String> {
    if body.sequent.trim().is_empty() {
        return Err("sequent must not be empty".to_string());
    }
    let timeout = validate_timeout(body.timeout)?;
    Ok(ProveRequest {
        sequent: body.sequent,
        formats: body.formats.into_iter().collect(),
        timeout,
    })
}
