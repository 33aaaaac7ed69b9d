#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use prototodo_api::config::ServerConfig;
use prototodo_api::health::HealthReporter;
use prototodo_api::router::build_app_router;
use prototodo_api::rpc::handler::ToDoHandler;
use prototodo_api::rpc::messages::ServingStatus;
use prototodo_api::rpc::TODO_SERVICE;
use prototodo_api::state::AppState;
use prototodo_core::memory::MemoryToDoRepository;
use prototodo_core::service::ToDoService;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        app_env: "test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        log_level: "debug".to_string(),
        request_timeout_secs: 30,
    }
}

/// Application under test plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryToDoRepository>,
    pub health: Arc<HealthReporter>,
}

/// Build the full application router over an in-memory repository, with
/// the to-do service registered as serving.
///
/// Uses the same [`build_app_router`] as `main.rs`, so the middleware stack
/// (request id, timeout, tracing, panic recovery) matches production.
pub async fn build_test_app() -> TestApp {
    let repo = Arc::new(MemoryToDoRepository::new());
    let handler = ToDoHandler::new(ToDoService::new(repo.clone()));

    let health = Arc::new(HealthReporter::new());
    health
        .set_serving_status(TODO_SERVICE, ServingStatus::Serving)
        .await;

    let state = AppState {
        handler,
        health: Arc::clone(&health),
        pool: None,
    };

    TestApp {
        router: build_app_router(state, &test_config()),
        repo,
        health,
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

/// POST an arbitrary (possibly malformed) JSON body.
pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
