//! HTTP surface of the task service.
//!
//! Handlers are thin: each one runs a single [`TaskService`] call on the
//! blocking pool and renders the result as JSON.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::service::TaskService;

pub mod error;
pub mod handlers;

pub use error::{ApiError, ApiErrorResponse};
pub use handlers::{DeleteResponse, HealthResponse, PurgeResponse};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TaskService>,
}

impl AppState {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }

    /// Run a service call off the async runtime
    pub async fn run<T, F>(&self, op: F) -> std::result::Result<T, ApiErrorResponse>
    where
        F: FnOnce(&TaskService) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        match tokio::task::spawn_blocking(move || op(&service)).await {
            Ok(result) => result.map_err(ApiErrorResponse::from),
            Err(join_error) => {
                tracing::error!(error = %join_error, "service task did not complete");
                Err(ApiErrorResponse::internal_error())
            }
        }
    }
}

/// Build the router with every task route and the configured middleware
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::replace_task)
                .patch(handlers::patch_task)
                .delete(handlers::delete_task),
        )
        .route("/deleted", get(handlers::list_deleted))
        .route(
            "/deleted/{id}",
            get(handlers::get_deleted).delete(handlers::purge_task),
        )
        .route("/deleted/{id}/restore", post(handlers::restore_task));

    if let Some(dir) = &config.static_dir {
        app = app
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/static", ServeDir::new(dir));
    }

    let mut app = app.layer(TraceLayer::new_for_http());
    if config.cors_permissive {
        app = app.layer(create_cors_layer());
    }
    app.with_state(state)
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind the configured address and serve until SIGINT or SIGTERM
pub async fn serve(service: Arc<TaskService>, config: &ServerConfig) -> Result<SocketAddr> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|err| {
            Error::OperationFailed(format!(
                "cannot bind {}:{}: {err}",
                config.host, config.port
            ))
        })?;
    let address = listener.local_addr()?;
    tracing::info!(%address, "listening");

    let app = router(AppState::new(service), config);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(address)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
