//! HTTP API endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use pulsedb_core::storage::Engine;
use pulsedb_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state
pub type AppState = Arc<Engine>;

/// Create the API router
pub fn create_router(engine: Arc<Engine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/write", post(write))
        .route("/read", get(read))
        .route("/tags", get(tags))
        .route("/stats", get(stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReadParams {
    tag: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadPoint {
    ts: Timestamp,
    val: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub memtable_samples: usize,
    pub memtable_bytes: usize,
    pub tags: usize,
    pub next_batch_id: u32,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: pulsedb_core::VERSION.to_string(),
    })
}

/// Ingest one sample from a `tag,timestamp_ms,value` body
async fn write(
    State(engine): State<AppState>,
    body: String,
) -> Result<&'static str, (StatusCode, Json<ErrorResponse>)> {
    let (tag, time_ms, value) = parse_triple(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })))?;

    engine.append(&tag, time_ms, value).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: e.to_string() }),
        )
    })?;

    Ok("OK")
}

/// Serve the hot series for a tag
async fn read(
    State(engine): State<AppState>,
    Query(params): Query<ReadParams>,
) -> Result<Json<Vec<ReadPoint>>, (StatusCode, Json<ErrorResponse>)> {
    let tag = params.tag.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing query parameter 'tag'".into(),
            }),
        )
    })?;

    let points = engine
        .query(&tag)
        .into_iter()
        .map(|s| ReadPoint {
            ts: s.time_ms,
            val: s.value,
        })
        .collect();

    Ok(Json(points))
}

async fn tags(State(engine): State<AppState>) -> Json<Vec<String>> {
    Json(engine.list_tags())
}

async fn stats(State(engine): State<AppState>) -> Json<StatsResponse> {
    let stats = engine.stats();
    Json(StatsResponse {
        memtable_samples: stats.memtable_samples,
        memtable_bytes: stats.memtable_bytes,
        tags: stats.tags,
        next_batch_id: stats.next_batch_id,
    })
}

// ============================================================================
// Ingest payload parser
// ============================================================================

/// Parse a `tag,timestamp_ms,value` triple; anything else is a bad request
fn parse_triple(body: &str) -> Result<(String, Timestamp, f64), String> {
    let parts: Vec<&str> = body.trim().split(',').collect();
    if parts.len() != 3 {
        return Err(format!("Expected tag,timestamp,value, got {} fields", parts.len()));
    }

    let tag = parts[0].to_string();
    if tag.is_empty() {
        return Err("Empty tag".into());
    }

    let time_ms = parts[1]
        .trim()
        .parse::<Timestamp>()
        .map_err(|_| format!("Invalid timestamp: {}", parts[1]))?;

    let value = parts[2]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid value: {}", parts[2]))?;

    Ok((tag, time_ms, value))
}
