pub mod health;
pub mod todo;

use axum::http::Uri;
use axum::Router;

use crate::error::Status;
use crate::state::AppState;

/// Build the RPC route tree.
///
/// Every method is a `POST` of its JSON request message to
/// `/{service}/{method}`:
///
/// ```text
/// /todo.v1.ToDoService/CreateToDo        CreateRequest  -> CreateResponse
/// /todo.v1.ToDoService/ReadToDo          ReadRequest    -> ReadResponse
/// /todo.v1.ToDoService/ReadAllToDos      ReadAllRequest -> ReadAllResponse
/// /todo.v1.ToDoService/UpdateToDo        UpdateRequest  -> UpdateResponse
/// /todo.v1.ToDoService/DeleteToDo        DeleteRequest  -> DeleteResponse
///
/// /grpc.health.v1.Health/Check           HealthCheckRequest -> HealthCheckResponse
/// ```
pub fn rpc_routes() -> Router<AppState> {
    Router::new()
        .merge(todo::router())
        .merge(health::rpc_router())
}

/// Fallback for paths that name no known method.
pub async fn unknown_method(uri: Uri) -> Status {
    Status::unimplemented(format!("unknown method {}", uri.path()))
}
