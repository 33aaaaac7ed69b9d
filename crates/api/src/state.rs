use std::sync::Arc;

use crate::health::HealthReporter;
use crate::rpc::handler::ToDoHandler;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// RPC request handler for the to-do service.
    pub handler: ToDoHandler,
    /// Serving status per service, answered by the health-check RPC.
    pub health: Arc<HealthReporter>,
    /// Database pool, when the repository is PostgreSQL-backed. Only used
    /// by the `/health` liveness probe.
    pub pool: Option<prototodo_db::DbPool>,
}
