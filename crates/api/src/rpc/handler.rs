//! Request handler: the only boundary between the transport and
//! [`ToDoService`].
//!
//! Every operation takes the request-scoped [`CancellationToken`] and checks
//! it before touching the store. Store failures become exactly one
//! [`Status`]: not-found maps to `NotFound`, anything else to `Internal`.

use prototodo_core::error::CoreError;
use prototodo_core::service::ToDoService;
use tokio_util::sync::CancellationToken;

use crate::error::{RpcResult, Status};
use crate::rpc::convert::{decode_fields, encode_todo, id_from_wire, id_to_wire};
use crate::rpc::messages::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, ReadAllRequest,
    ReadAllResponse, ReadRequest, ReadResponse, UpdateRequest, UpdateResponse,
};

/// Stateless translator/dispatcher for the five CRUD methods.
///
/// Cheaply cloneable; safe to share across any number of concurrent calls.
#[derive(Clone)]
pub struct ToDoHandler {
    service: ToDoService,
}

impl ToDoHandler {
    pub fn new(service: ToDoService) -> Self {
        Self { service }
    }

    /// CreateToDo: persist `todo.title`, `todo.description` and
    /// `todo.reminder`, returning the stored item.
    pub async fn create(
        &self,
        ctx: &CancellationToken,
        req: CreateRequest,
    ) -> RpcResult<CreateResponse> {
        let todo = req.todo.unwrap_or_default();
        let new = decode_fields(&todo)?.into_new()?;

        ensure_active(ctx)?;

        let created = self.service.create(new).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to create todo");
            Status::internal(format!("failed to create todo: {e}"))
        })?;

        tracing::info!(todo_id = created.id, "Todo created");

        Ok(CreateResponse {
            todo: encode_todo(&created)?,
        })
    }

    /// ReadToDo: fetch one item by id.
    pub async fn read(&self, ctx: &CancellationToken, req: ReadRequest) -> RpcResult<ReadResponse> {
        ensure_active(ctx)?;

        let id = id_from_wire(req.id).ok_or_else(|| missing(req.id))?;
        let item = self
            .service
            .read(id)
            .await
            .map_err(|e| store_failure("fetch todo item", e))?;

        Ok(ReadResponse {
            todo: encode_todo(&item)?,
        })
    }

    /// ReadAllToDos: drain the repository stream into one response.
    ///
    /// The stream runs under a child of `ctx`. It is closed (producer
    /// stopped and joined) on every exit path, so an encoding failure or a
    /// caller cancellation never leaves the cursor open. Either the whole
    /// collection is returned or the call fails.
    pub async fn read_all(
        &self,
        ctx: &CancellationToken,
        _req: ReadAllRequest,
    ) -> RpcResult<ReadAllResponse> {
        ensure_active(ctx)?;

        let mut stream = self
            .service
            .read_all(ctx.child_token())
            .await
            .map_err(|e| store_failure("fetch todo items", e))?;

        let mut todos = Vec::new();
        while let Some(item) = stream.next().await {
            let encoded = item
                .map_err(|e| store_failure("fetch todo items", e))
                .and_then(|t| encode_todo(&t));

            match encoded {
                Ok(todo) => todos.push(todo),
                Err(status) => {
                    if let Err(e) = stream.close().await {
                        tracing::warn!(error = %e, "ToDo stream did not shut down cleanly");
                    }
                    return Err(status);
                }
            }
        }

        let closed = stream.close().await;
        // The stream also ends early when the caller goes away.
        ensure_active(ctx)?;
        closed.map_err(|e| store_failure("fetch todo items", e))?;

        tracing::debug!(count = todos.len(), "Todos read");

        Ok(ReadAllResponse { todos })
    }

    /// UpdateToDo: merge the supplied fields of `todo` into item `todo.id`.
    pub async fn update(
        &self,
        ctx: &CancellationToken,
        req: UpdateRequest,
    ) -> RpcResult<UpdateResponse> {
        let todo = req.todo.unwrap_or_default();
        let patch = decode_fields(&todo)?.into_patch();

        ensure_active(ctx)?;

        let id = id_from_wire(todo.id).ok_or_else(|| missing(todo.id))?;
        if patch.is_empty() {
            tracing::debug!(todo_id = id, "Update supplies no fields, only updated_at changes");
        }
        let updated = self
            .service
            .update(id, patch)
            .await
            .map_err(|e| store_failure("update todo item", e))?;

        tracing::info!(todo_id = updated.id, "Todo updated");

        Ok(UpdateResponse {
            updated: encode_todo(&updated)?,
        })
    }

    /// DeleteToDo: delete an item, returning its id.
    pub async fn delete(
        &self,
        ctx: &CancellationToken,
        req: DeleteRequest,
    ) -> RpcResult<DeleteResponse> {
        ensure_active(ctx)?;

        let id = id_from_wire(req.id).ok_or_else(|| missing(req.id))?;
        let deleted = self
            .service
            .delete(id)
            .await
            .map_err(|e| store_failure("delete todo item", e))?;

        tracing::info!(todo_id = deleted, "Todo deleted");

        Ok(DeleteResponse {
            deleted: id_to_wire(deleted)?,
        })
    }
}

/// Fail with `Cancelled` if nobody is waiting for the response any more.
fn ensure_active(ctx: &CancellationToken) -> RpcResult<()> {
    if ctx.is_cancelled() {
        return Err(Status::cancelled());
    }
    Ok(())
}

fn missing(id: i64) -> Status {
    Status::not_found(format!("Todo item not found: id {id}"))
}

fn store_failure(operation: &str, err: CoreError) -> Status {
    match err {
        CoreError::NotFound { entity, id } => {
            Status::not_found(format!("{entity} item not found: id {id}"))
        }
        other => {
            tracing::error!(error = %other, operation, "Store call failed");
            Status::internal(format!("Failed to {operation}: {other}"))
        }
    }
}
