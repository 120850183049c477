use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::admin::AdminState;
use crate::catalog::ProviderId;
use crate::failover::{FailoverError, ProviderStatus};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub providers: usize,
    pub healthy_providers: usize,
    pub health_checks_running: bool,
}

#[derive(Serialize)]
pub struct LatencySummary {
    pub sample_count: u64,
    pub average_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[derive(Serialize)]
pub struct Selection {
    pub model: String,
    pub provider_id: ProviderId,
    pub name: String,
    pub endpoint: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn millis(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let health = state.manager.health_checker();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        providers: health.provider_ids().len(),
        healthy_providers: health.healthy_providers().len(),
        health_checks_running: health.is_running(),
    })
}

pub async fn get_providers(State(state): State<AdminState>) -> Json<BTreeMap<String, ProviderStatus>> {
    Json(state.manager.provider_status())
}

pub async fn get_latency(State(state): State<AdminState>) -> Json<BTreeMap<String, LatencySummary>> {
    let stats = state.manager.latency_tracker().all_latency_stats();
    let summaries = stats
        .into_iter()
        .map(|(id, s)| {
            let summary = LatencySummary {
                sample_count: s.sample_count,
                average_ms: millis(s.average_latency),
                min_ms: millis(s.min_latency),
                max_ms: millis(s.max_latency),
            };
            (id.to_string(), summary)
        })
        .collect();
    Json(summaries)
}

/// Dry-run selection. Nothing is reported back to the breakers.
pub async fn select_provider(State(state): State<AdminState>, Path(model): Path<String>) -> Response {
    match state.manager.select_provider(&model) {
        Ok(provider) => Json(Selection {
            model,
            provider_id: provider.id,
            name: provider.name,
            endpoint: provider.endpoint,
        })
        .into_response(),
        Err(e) => {
            let status = match &e {
                FailoverError::NoProvidersAvailable(_) => StatusCode::NOT_FOUND,
                FailoverError::NoHealthyProviders(_) => StatusCode::SERVICE_UNAVAILABLE,
                FailoverError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorBody { error: e.to_string() })).into_response()
        }
    }
}
