//! Per-service serving status, queried through the health-check RPC.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::{RpcResult, Status};
use crate::rpc::messages::ServingStatus;

/// Registry of named services and their current [`ServingStatus`].
///
/// The empty name stands for the server as a whole and is always
/// registered.
pub struct HealthReporter {
    statuses: RwLock<HashMap<String, ServingStatus>>,
}

impl Default for HealthReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthReporter {
    pub fn new() -> Self {
        let mut statuses = HashMap::new();
        statuses.insert(String::new(), ServingStatus::Serving);
        Self {
            statuses: RwLock::new(statuses),
        }
    }

    pub async fn set_serving_status(&self, service: &str, status: ServingStatus) {
        tracing::info!(service, ?status, "Serving status changed");
        self.statuses
            .write()
            .await
            .insert(service.to_string(), status);
    }

    /// Status of `service`; unknown names fail with `NotFound`.
    pub async fn check(&self, service: &str) -> RpcResult<ServingStatus> {
        self.statuses
            .read()
            .await
            .get(service)
            .copied()
            .ok_or_else(|| Status::not_found(format!("unknown service: {service:?}")))
    }

    /// Mark every registered service as not serving.
    pub async fn shutdown(&self) {
        let mut statuses = self.statuses.write().await;
        for status in statuses.values_mut() {
            *status = ServingStatus::NotServing;
        }
        tracing::info!(services = statuses.len(), "All services marked not serving");
    }
}
