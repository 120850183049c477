//! Startup orchestration.
//!
//! Order: metrics exporter, catalog, failover manager (which starts the
//! probe loop), one immediate probe round, admin API. Shutdown runs in
//! reverse once the process is signalled.

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin;
use crate::catalog::StaticCatalog;
use crate::config::FailoverConfig;
use crate::failover::{FailoverError, FailoverManager};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize failover manager: {0}")]
    Failover(#[from] FailoverError),

    #[error("invalid {what} address {address:?}")]
    InvalidAddress { what: &'static str, address: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn parse_addr(what: &'static str, address: &str) -> Result<SocketAddr, StartupError> {
    address.parse().map_err(|_| StartupError::InvalidAddress {
        what,
        address: address.to_string(),
    })
}

/// Run until SIGINT/SIGTERM, then shut down in order.
pub async fn run(config: FailoverConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(parse_addr("metrics", &config.observability.metrics_address)?);
    }

    let store = Arc::new(StaticCatalog::from_config(&config));
    let manager = Arc::new(FailoverManager::new(store, &config)?);

    if config.health_check.enabled {
        // Do not wait a full interval before the first verdict.
        manager.health_checker().check_now().await;
    }

    let shutdown = Shutdown::new();
    let admin_task = if config.admin.enabled {
        let addr = parse_addr("admin", &config.admin.bind_address)?;
        let listener = TcpListener::bind(addr).await?;
        let mut rx = shutdown.subscribe();
        let manager = manager.clone();
        let admin_config = config.admin.clone();
        Some(tokio::spawn(async move {
            let signal = async move {
                let _ = rx.recv().await;
            };
            if let Err(e) = admin::serve(listener, manager, &admin_config, signal).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }))
    } else {
        None
    };

    tracing::info!(
        providers = manager.providers().len(),
        models = manager.model_keys().len(),
        admin = config.admin.enabled,
        "Provider failover running"
    );

    shutdown_signal().await;
    tracing::info!("Shutting down");

    shutdown.trigger();
    if let Some(task) = admin_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Admin task terminated abnormally");
        }
    }
    manager.stop().await;

    Ok(())
}
