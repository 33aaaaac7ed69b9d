//! RPC client for the to-do service.
//!
//! Failed calls come back as the server's [`Status`]; a failure without a
//! decodable body is classified from its HTTP status alone.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Code, Status};
use crate::rpc::messages::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, HealthCheckRequest,
    HealthCheckResponse, ReadAllRequest, ReadAllResponse, ReadRequest, ReadResponse,
    ServingStatus, UpdateRequest, UpdateResponse,
};
use crate::rpc::paths;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a failure status.
    #[error("rpc failed: {0}")]
    Status(#[from] Status),
}

impl ClientError {
    /// RPC code of the failure, if the server produced one.
    pub fn code(&self) -> Option<Code> {
        match self {
            ClientError::Status(status) => Some(status.code),
            ClientError::Transport(_) => None,
        }
    }
}

/// What a health check tells the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Serving,
    NotServing,
    /// The server does not implement health reporting. Says nothing about
    /// whether the service itself is up.
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct ToDoClient {
    http: reqwest::Client,
    base_url: String,
}

impl ToDoClient {
    /// Client for a server at `base_url` (e.g. `http://localhost:10000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Client reusing an already configured `reqwest` client (timeouts etc).
    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    async fn call<Req, Resp>(&self, path: &str, req: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(req).send().await?;

        let http_status = response.status();
        if http_status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.bytes().await?;
        let status = serde_json::from_slice::<Status>(&body).unwrap_or_else(|_| {
            Status::new(
                Code::from_http_status(http_status),
                format!(
                    "{path} answered {http_status}: {}",
                    String::from_utf8_lossy(&body)
                ),
            )
        });

        tracing::debug!(path, code = %status.code, message = %status.message, "RPC failed");
        Err(status.into())
    }

    pub async fn create_todo(&self, req: &CreateRequest) -> Result<CreateResponse, ClientError> {
        self.call(paths::CREATE_TODO, req).await
    }

    pub async fn read_todo(&self, req: &ReadRequest) -> Result<ReadResponse, ClientError> {
        self.call(paths::READ_TODO, req).await
    }

    pub async fn read_all_todos(&self) -> Result<ReadAllResponse, ClientError> {
        self.call(paths::READ_ALL_TODOS, &ReadAllRequest {}).await
    }

    pub async fn update_todo(&self, req: &UpdateRequest) -> Result<UpdateResponse, ClientError> {
        self.call(paths::UPDATE_TODO, req).await
    }

    pub async fn delete_todo(&self, req: &DeleteRequest) -> Result<DeleteResponse, ClientError> {
        self.call(paths::DELETE_TODO, req).await
    }

    /// Serving status of `service`.
    ///
    /// A server without the health-check method yields
    /// [`HealthState::Unavailable`] rather than an error.
    pub async fn check_health(&self, service: &str) -> Result<HealthState, ClientError> {
        let req = HealthCheckRequest {
            service: service.to_string(),
        };

        match self
            .call::<_, HealthCheckResponse>(paths::HEALTH_CHECK, &req)
            .await
        {
            Ok(resp) => Ok(match resp.status {
                ServingStatus::Serving => HealthState::Serving,
                ServingStatus::NotServing => HealthState::NotServing,
            }),
            Err(ClientError::Status(status)) if status.code == Code::Unimplemented => {
                tracing::warn!(service, "Server does not implement health checks");
                Ok(HealthState::Unavailable)
            }
            Err(e) => Err(e),
        }
    }
}
