use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use prototodo_api::config::{ServerArgs, ServerConfig};
use prototodo_api::health::HealthReporter;
use prototodo_api::router::build_app_router;
use prototodo_api::rpc::handler::ToDoHandler;
use prototodo_api::rpc::messages::ServingStatus;
use prototodo_api::rpc::TODO_SERVICE;
use prototodo_api::state::AppState;
use prototodo_api::telemetry;
use prototodo_core::service::ToDoService;
use prototodo_db::repositories::PgToDoRepository;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let args = ServerArgs::parse();
    let config = ServerConfig::from_env()
        .expect("Invalid server configuration")
        .with_args(args);

    // --- Tracing ---
    telemetry::init(&config.log_level, config.is_production());
    tracing::info!(
        app_env = %config.app_env,
        host = %config.host,
        port = config.port,
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = prototodo_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    prototodo_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    prototodo_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Repository / service / handler ---
    let repo = Arc::new(PgToDoRepository::new(pool.clone()));
    let handler = ToDoHandler::new(ToDoService::new(repo));

    // --- Health ---
    let health = Arc::new(HealthReporter::new());
    health
        .set_serving_status(TODO_SERVICE, ServingStatus::Serving)
        .await;

    // --- App state ---
    let state = AppState {
        handler,
        health: Arc::clone(&health),
        pool: Some(pool.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let shutdown_health = Arc::clone(&health);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Health checks answered while draining report not serving.
            shutdown_health.shutdown().await;
        })
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    pool.close().await;
    tracing::info!("Database pool closed");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
