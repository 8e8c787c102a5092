use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::net::SocketAddr;

use crate::error::IngestError;
use crate::extract::JsonBody;
use crate::models::{HealthResponse, IngestAck};
use crate::origin::resolve_origin;
use crate::record::IngestRecord;
use crate::state::AppState;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Accepts any JSON document from a device, logs it and acknowledges.
/// The payload shape is deliberately not checked.
pub async fn ingest(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> Result<Json<IngestAck>, IngestError> {
    let origin = resolve_origin(&headers, peer.map(|ConnectInfo(addr)| addr));
    IngestRecord::new(origin, &headers, body).log(&state.log_policy)?;
    Ok(Json(IngestAck { ok: true }))
}

pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
