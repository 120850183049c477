//! Catalog record types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ModelConfig, ProviderConfig};

/// Strongly typed provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub i64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProviderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// An upstream LLM-API provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    /// Base endpoint URL.
    pub endpoint: String,
    pub active: bool,
}

/// A model served by exactly one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    /// Key callers route by (e.g. "gpt-4o").
    pub model_key: String,
    pub provider_id: ProviderId,
    pub name: String,
}

/// Filter for listing providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderFilter {
    pub active: Option<bool>,
}

impl ProviderFilter {
    pub fn matches(&self, provider: &Provider) -> bool {
        self.active.map_or(true, |active| provider.active == active)
    }
}

/// Filter for listing models.
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    pub provider_id: Option<ProviderId>,
}

impl ModelFilter {
    pub fn matches(&self, model: &Model) -> bool {
        self.provider_id.map_or(true, |id| model.provider_id == id)
    }
}

impl From<&ProviderConfig> for Provider {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            id: ProviderId(config.id),
            name: config.name.clone(),
            endpoint: config.endpoint.clone(),
            active: config.active,
        }
    }
}

impl From<&ModelConfig> for Model {
    fn from(config: &ModelConfig) -> Self {
        Self {
            id: config.id,
            model_key: config.model_key.clone(),
            provider_id: ProviderId(config.provider_id),
            name: config.name.clone(),
        }
    }
}
