//! RPC surface of the to-do service: wire messages, wire/domain
//! translation and the request handler.

pub mod convert;
pub mod handler;
pub mod messages;

/// Fully-qualified name of the to-do service, as registered with the
/// health reporter.
pub const TODO_SERVICE: &str = "todo.v1.ToDoService";

/// Route paths, one per RPC method (`/{service}/{method}`).
pub mod paths {
    pub const CREATE_TODO: &str = "/todo.v1.ToDoService/CreateToDo";
    pub const READ_TODO: &str = "/todo.v1.ToDoService/ReadToDo";
    pub const READ_ALL_TODOS: &str = "/todo.v1.ToDoService/ReadAllToDos";
    pub const UPDATE_TODO: &str = "/todo.v1.ToDoService/UpdateToDo";
    pub const DELETE_TODO: &str = "/todo.v1.ToDoService/DeleteToDo";
    pub const HEALTH_CHECK: &str = "/grpc.health.v1.Health/Check";
}
