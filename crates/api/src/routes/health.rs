use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::RpcResult;
use crate::routes::todo::decode;
use crate::rpc::messages::{HealthCheckRequest, HealthCheckResponse};
use crate::rpc::paths;
use crate::state::AppState;

/// Liveness probe payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable; absent without a database.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_healthy: Option<bool>,
}

/// GET /health -- returns service and database health.
async fn liveness(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match &state.pool {
        Some(pool) => Some(prototodo_db::health_check(pool).await.is_ok()),
        None => None,
    };

    let status = if db_healthy == Some(false) { "degraded" } else { "ok" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// POST /grpc.health.v1.Health/Check -- serving status of a named service.
async fn check(
    State(state): State<AppState>,
    payload: Result<Json<HealthCheckRequest>, JsonRejection>,
) -> RpcResult<Json<HealthCheckResponse>> {
    let req = decode(payload)?;
    let status = state.health.check(&req.service).await?;
    Ok(Json(HealthCheckResponse { status }))
}

/// Liveness probe, mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}

/// Health-check RPC.
pub fn rpc_router() -> Router<AppState> {
    Router::new().route(paths::HEALTH_CHECK, post(check))
}
