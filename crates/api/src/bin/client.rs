//! Command-line client: runs a create/read/update/read-all/delete round
//! against a running server and logs every response.
//!
//! | Env Var               | Default                  |
//! |-----------------------|--------------------------|
//! | `SERVER_URL`          | `http://localhost:10000` |
//! | `CLIENT_TIMEOUT_SECS` | `5`                      |
//! | `LOG_LEVEL`           | `info`                   |

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use prototodo_api::client::{HealthState, ToDoClient};
use prototodo_api::rpc::convert::timestamp_to_wire;
use prototodo_api::rpc::messages::{
    CreateRequest, DeleteRequest, ReadRequest, ToDo, UpdateRequest,
};
use prototodo_api::rpc::TODO_SERVICE;
use prototodo_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    telemetry::init(&log_level, false);

    let server_url =
        std::env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:10000".into());
    let timeout_secs: u64 = std::env::var("CLIENT_TIMEOUT_SECS")
        .unwrap_or_else(|_| "5".into())
        .parse()
        .context("CLIENT_TIMEOUT_SECS must be a valid u64")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let client = ToDoClient::with_http_client(http, &server_url);

    match client.check_health(TODO_SERVICE).await? {
        HealthState::Serving => tracing::info!(%server_url, "Service is serving"),
        HealthState::NotServing => anyhow::bail!("{TODO_SERVICE} is not serving"),
        HealthState::Unavailable => {
            tracing::warn!("Health reporting unavailable, continuing anyway")
        }
    }

    let reminder = timestamp_to_wire(&(Utc::now() + chrono::Duration::hours(1)))
        .context("reminder out of range")?;

    let created = client
        .create_todo(&CreateRequest {
            todo: Some(ToDo {
                title: "Buy milk".into(),
                description: "Two litres, semi-skimmed".into(),
                reminder: Some(reminder),
                ..Default::default()
            }),
        })
        .await
        .context("CreateToDo failed")?
        .todo;
    tracing::info!(?created, "CreateToDo result");

    let read = client
        .read_todo(&ReadRequest { id: created.id })
        .await
        .context("ReadToDo failed")?;
    tracing::info!(todo = ?read.todo, "ReadToDo result");

    let updated = client
        .update_todo(&UpdateRequest {
            todo: Some(ToDo {
                id: created.id,
                title: "Buy oat milk".into(),
                ..Default::default()
            }),
        })
        .await
        .context("UpdateToDo failed")?;
    tracing::info!(updated = ?updated.updated, "UpdateToDo result");

    let all = client
        .read_all_todos()
        .await
        .context("ReadAllToDos failed")?;
    tracing::info!(count = all.todos.len(), todos = ?all.todos, "ReadAllToDos result");

    let deleted = client
        .delete_todo(&DeleteRequest { id: created.id })
        .await
        .context("DeleteToDo failed")?;
    tracing::info!(deleted = deleted.deleted, "DeleteToDo result");

    Ok(())
}
