// HTTP trigger and read endpoints for the reconciler

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::application::reconciler::{Reconciler, StreamRegistry};
use crate::domain::errors::ReconcileError;
use crate::domain::models::{BlockCheckpoint, DecodedEvent};
use crate::infrastructure::persistence::error::DbError;

const DEFAULT_EVENT_LIMIT: u64 = 50;
const MAX_EVENT_LIMIT: u64 = 500;

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    pub registry: StreamRegistry,
}

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/streams", get(list_streams))
        .route("/api/streams/{stream}/reconcile", get(reconcile_stream))
        .route("/api/streams/{stream}/checkpoint", get(get_checkpoint))
        .route("/api/streams/{stream}/events", get(get_events))
        .with_state(state)
}

/// Root endpoint
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": "LedUp Event Indexer",
        "version": env!("CARGO_PKG_VERSION"),
        "streams": state.registry.names(),
        "endpoints": [
            "/api/health",
            "/api/streams",
            "/api/streams/{stream}/reconcile",
            "/api/streams/{stream}/checkpoint",
            "/api/streams/{stream}/events",
        ]
    }))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamStatus {
    name: String,
    contract: String,
    address: String,
    block_number: Option<u64>,
    chain_head: Option<u64>,
    /// Blocks between the checkpoint and the chain head; grows during quiet
    /// periods since empty runs do not move the checkpoint
    lag: Option<u64>,
}

/// Configured streams with their checkpoint and the current chain head
async fn list_streams(State(state): State<AppState>) -> Result<Json<Vec<StreamStatus>>, ApiError> {
    let mut statuses = Vec::with_capacity(state.registry.len());

    for reconciler in state.registry.reconcilers() {
        let block_number = reconciler.checkpoint().await?.map(|c| c.block_number);
        let chain_head = match reconciler.chain_head().await {
            Ok(head) => Some(head),
            Err(e) => {
                tracing::warn!(stream = %reconciler.name(), error = %e, "chain head unavailable");
                None
            }
        };
        let stream = reconciler.stream();

        statuses.push(StreamStatus {
            name: stream.name.clone(),
            contract: stream.contract.to_string(),
            address: stream.address.to_checksum(None),
            block_number,
            chain_head,
            lag: chain_head.map(|head| head.saturating_sub(block_number.unwrap_or(stream.start_block))),
        });
    }

    Ok(Json(statuses))
}

/// Run a reconciliation and return the last event it recorded (`null` if none)
async fn reconcile_stream(
    State(state): State<AppState>,
    Path(stream): Path<String>,
) -> Result<Json<Option<DecodedEvent>>, ApiError> {
    let reconciler = find_stream(&state, &stream)?;
    let last_event = reconciler.reconcile().await?;
    Ok(Json(last_event))
}

async fn get_checkpoint(
    State(state): State<AppState>,
    Path(stream): Path<String>,
) -> Result<Json<BlockCheckpoint>, ApiError> {
    let reconciler = find_stream(&state, &stream)?;
    reconciler
        .checkpoint()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No checkpoint recorded for stream {}", stream)))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    limit: Option<u64>,
}

async fn get_events(
    State(state): State<AppState>,
    Path(stream): Path<String>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<Vec<DecodedEvent>>, ApiError> {
    let reconciler = find_stream(&state, &stream)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_EVENT_LIMIT)
        .clamp(1, MAX_EVENT_LIMIT);
    Ok(Json(reconciler.recent_events(limit).await?))
}

fn find_stream(state: &AppState, stream: &str) -> Result<Arc<Reconciler>, ApiError> {
    state
        .registry
        .get(stream)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown stream {}", stream)))
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Storage(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            ApiError::Reconcile(ReconcileError::StreamBusy(_) | ReconcileError::LeaseLost(_)) => (
                StatusCode::CONFLICT,
                json!({
                    "error": self.to_string(),
                    "message": "Reconciliation already in progress for this stream"
                }),
            ),
            ApiError::Reconcile(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": self.to_string(),
                    "message": "Failed to reconcile blockchain events"
                }),
            ),
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": self.to_string(),
                    "message": "Failed to read from the event store"
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
