//! Axum adapters for the to-do RPC methods.
//!
//! Each adapter decodes the JSON request message, opens the request scope
//! and delegates to [`ToDoHandler`](crate::rpc::handler::ToDoHandler).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::{RpcResult, Status};
use crate::rpc::messages::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadAllRequest,
    ReadAllResponse, ReadRequest, ReadResponse, UpdateRequest, UpdateResponse,
};
use crate::rpc::paths;
use crate::state::AppState;

/// Request-scoped cancellation.
///
/// The guard cancels the token when the request future is dropped, which
/// is what happens when the client disconnects or the timeout layer gives
/// up on the request.
fn request_scope() -> (CancellationToken, DropGuard) {
    let ctx = CancellationToken::new();
    let guard = ctx.clone().drop_guard();
    (ctx, guard)
}

/// Turn an undecodable body into `InvalidArgument`.
pub(crate) fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> RpcResult<T> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| Status::invalid_argument(format!("malformed request body: {}", e.body_text())))
}

async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> RpcResult<Json<CreateResponse>> {
    let req = decode(payload)?;
    let (ctx, _guard) = request_scope();
    state.handler.create(&ctx, req).await.map(Json)
}

async fn read_todo(
    State(state): State<AppState>,
    payload: Result<Json<ReadRequest>, JsonRejection>,
) -> RpcResult<Json<ReadResponse>> {
    let req = decode(payload)?;
    let (ctx, _guard) = request_scope();
    state.handler.read(&ctx, req).await.map(Json)
}

async fn read_all_todos(
    State(state): State<AppState>,
    payload: Result<Json<ReadAllRequest>, JsonRejection>,
) -> RpcResult<Json<ReadAllResponse>> {
    let req = decode(payload)?;
    let (ctx, _guard) = request_scope();
    state.handler.read_all(&ctx, req).await.map(Json)
}

async fn update_todo(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> RpcResult<Json<UpdateResponse>> {
    let req = decode(payload)?;
    let (ctx, _guard) = request_scope();
    state.handler.update(&ctx, req).await.map(Json)
}

async fn delete_todo(
    State(state): State<AppState>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> RpcResult<Json<DeleteResponse>> {
    let req = decode(payload)?;
    let (ctx, _guard) = request_scope();
    state.handler.delete(&ctx, req).await.map(Json)
}

/// To-do service routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(paths::CREATE_TODO, post(create_todo))
        .route(paths::READ_TODO, post(read_todo))
        .route(paths::READ_ALL_TODOS, post(read_all_todos))
        .route(paths::UPDATE_TODO, post(update_todo))
        .route(paths::DELETE_TODO, post(delete_todo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_the_scope_cancels_the_token() {
        let (ctx, guard) = request_scope();
        assert!(!ctx.is_cancelled());
        drop(guard);
        assert!(ctx.is_cancelled());
    }
}
