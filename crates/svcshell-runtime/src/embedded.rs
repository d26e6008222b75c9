//! In-process service for packaged distributions.
//!
//! Packaged builds have no interpreter to spawn, so the service runs inside
//! the shell process on the reserved port. Binding happens before
//! [`EmbeddedLauncher::start`] returns: a port already in use fails the
//! launch instead of surfacing later as a health timeout.
//!
//! The service lives until the host process exits; there is nothing to
//! terminate separately.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::Json;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use svcshell_core::{LaunchSpec, LaunchedService, SupervisorError};

/// Error from loading the embedded service.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddedError {
    /// The entry point cannot be served.
    #[error("Invalid entry point {path}: {reason}")]
    InvalidEntry { path: String, reason: String },

    /// The health path cannot be registered as a literal route.
    #[error("Invalid health path {path}: {reason}")]
    InvalidHealthPath { path: String, reason: String },

    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },
}

impl From<EmbeddedError> for SupervisorError {
    fn from(err: EmbeddedError) -> Self {
        Self::Launch(err.to_string())
    }
}

/// A service that can run inside the shell process.
pub trait EmbeddedService: Send + Sync {
    /// Build the routes for `spec`; the health path must be among them.
    fn router(&self, spec: &LaunchSpec) -> Result<Router, EmbeddedError>;
}

/// Serves the web UI next to the entry file, with SPA fallback to the entry.
///
/// Answers the health path with `{"status":"ok"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSiteService;

impl EmbeddedService for StaticSiteService {
    fn router(&self, spec: &LaunchSpec) -> Result<Router, EmbeddedError> {
        let health_path = spec.endpoint.health_path();
        check_health_path(health_path)?;

        let entry = &spec.entry_point.path;
        let site_root = entry
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        if !site_root.is_dir() {
            return Err(EmbeddedError::InvalidEntry {
                path: entry.display().to_string(),
                reason: "parent is not a directory".into(),
            });
        }

        let serve_dir = ServeDir::new(site_root).fallback(ServeFile::new(entry));

        Ok(Router::new()
            .route(health_path, get(health_check))
            .fallback_service(serve_dir)
            .layer(TraceLayer::new_for_http()))
    }
}

/// The router reads `:` and `*` as captures and panics on unnamed ones.
fn check_health_path(path: &str) -> Result<(), EmbeddedError> {
    if path.contains([':', '*']) {
        return Err(EmbeddedError::InvalidHealthPath {
            path: path.to_string(),
            reason: "`:` and `*` are not allowed".into(),
        });
    }
    Ok(())
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Launches an [`EmbeddedService`] on the endpoint's port.
#[derive(Clone)]
pub struct EmbeddedLauncher {
    service: Arc<dyn EmbeddedService>,
}

impl Default for EmbeddedLauncher {
    fn default() -> Self {
        Self::new(Arc::new(StaticSiteService))
    }
}

impl EmbeddedLauncher {
    pub fn new(service: Arc<dyn EmbeddedService>) -> Self {
        Self { service }
    }

    /// Load and bind the service, then serve it on a background task.
    pub async fn start(&self, spec: &LaunchSpec) -> Result<LaunchedService, SupervisorError> {
        spec.entry_point.ensure_exists()?;

        let app = self.service.router(spec)?;

        let endpoint = &spec.endpoint;
        let listener = TcpListener::bind((endpoint.host(), endpoint.port()))
            .await
            .map_err(|e| EmbeddedError::BindFailed {
                address: endpoint.authority(),
                reason: e.to_string(),
            })?;

        info!(
            address = %endpoint.authority(),
            entry = %spec.entry_point.path.display(),
            "Embedded service listening"
        );

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "Embedded service error");
            }
        });

        Ok(LaunchedService::embedded())
    }
}
