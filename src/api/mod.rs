//! HTTP boundary
//!
//! Maps the REST surface onto [`Orchestrator`] calls:
//!
//! | Route                       | Call                                  | Success          |
//! |-----------------------------|---------------------------------------|------------------|
//! | `GET /health`               |                                       | 200 `OK`         |
//! | `GET /1/packages`           | `packages()`                          | 200 JSON array   |
//! | `GET /1/packages/:name`     | `package(name, ?version)`             | 200 JSON object  |
//! | `POST /1/packages`          | `install_package(body)`               | 201 scheduler body |
//! | `DELETE /1/packages/:name`  | `find_installed` + `uninstall_package`| 204              |
//!
//! The orchestrator is synchronous, so every call runs on the blocking pool.

mod packages;
mod response;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{self, Result};
use crate::operations::Orchestrator;

/// HTTP server exposing an [`Orchestrator`]
#[derive(Clone)]
pub struct HttpServer {
    orchestrator: Arc<Orchestrator>,
}

impl HttpServer {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Routes of the package API
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route(
                "/1/packages",
                get(packages::list).post(packages::install),
            )
            .route(
                "/1/packages/:name",
                get(packages::describe).delete(packages::uninstall),
            )
            .with_state(self.clone())
    }

    /// Bind `address` and serve until `shutdown` completes
    pub async fn start<F>(self, address: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|e| error::server::bind_failed(address, e.to_string()))?;
        info!(%address, "HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| error::server::failed(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Run `call` against the orchestrator on the blocking pool
    async fn call<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&Orchestrator) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::task::spawn_blocking(move || call(&orchestrator))
            .await
            .map_err(|e| error::server::task_failed(e.to_string()))?
    }
}

async fn health() -> &'static str {
    "OK"
}
