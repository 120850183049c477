//! Provider status snapshots for operational introspection.

use serde::Serialize;

/// Status of one provider as reported by the failover manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub healthy: bool,
    /// Average latency rendered for humans (e.g. `"150ms"`, `"0ns"`).
    pub average_latency: String,
    /// One of `closed`, `open`, `half-open`, `unknown`.
    pub circuit_state: String,
}

/// Provider-level cost weight by provider name, in [0, 1]; lower is cheaper.
///
/// Computed for every provider and exposed for introspection. Selection
/// does not consult it.
pub fn cost_weight_for(name: &str) -> f64 {
    match name {
        "openai" => 0.8,
        "anthropic" => 0.7,
        "google" => 0.6,
        "mistral" => 0.7,
        "meta" => 0.3,
        "groq" => 0.8,
        "togetherai" => 0.6,
        "fireworks" => 0.6,
        "poe" => 0.5,
        "navigator" => 0.4,
        _ => 0.5,
    }
}
