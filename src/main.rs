//! Provider failover service.
//!
//! ```text
//!   live traffic outcomes          periodic probes (GET {endpoint}/health)
//!            │                                  │
//!            ▼                                  ▼
//!   ┌──────────────────┐   outcomes   ┌──────────────────┐
//!   │ FailoverManager  │─────────────▶│  HealthChecker   │
//!   │  select_provider │◀─────────────│ circuit breakers │
//!   └────────┬─────────┘ availability └──────────────────┘
//!            │
//!            ▼
//!   ┌──────────────────┐      ┌─────────────────────────┐
//!   │  LatencyTracker  │      │ admin API / Prometheus  │
//!   │ WeightedSelector │      │   (optional surfaces)   │
//!   └──────────────────┘      └─────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use provider_failover::config::{load_config, FailoverConfig};
use provider_failover::lifecycle::startup;
use provider_failover::observability::logging;

#[derive(Parser)]
#[command(name = "provider-failover")]
#[command(about = "Health-aware LLM provider failover", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => FailoverConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        providers = config.providers.len(),
        models = config.models.len(),
        "provider-failover starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
