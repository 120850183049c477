//! Authenticated admin API for inspecting the failover core.
//!
//! # Endpoints
//! - `GET /admin/status`: version and provider counts
//! - `GET /admin/providers`: per-provider health, breaker state and latency
//! - `GET /admin/latency`: raw latency statistics
//! - `GET /admin/select/{*model}`: dry-run selection for a model key; keys
//!   may contain `/` (e.g. `meta-llama/Llama-3-8b-chat-hf`)

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::failover::FailoverManager;

/// State shared with every admin handler.
#[derive(Clone)]
pub struct AdminState {
    pub manager: Arc<FailoverManager>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(manager: Arc<FailoverManager>, api_key: &str) -> Self {
        Self {
            manager,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/providers", get(get_providers))
        .route("/admin/latency", get(get_latency))
        .route("/admin/select/{*model}", get(select_provider))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serve the admin API on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    manager: Arc<FailoverManager>,
    config: &AdminConfig,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = AdminState::new(manager, &config.api_key);
    let app = setup_admin_router(state, Duration::from_secs(config.request_timeout_secs));

    tracing::info!(address = %listener.local_addr()?, "Admin API listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
