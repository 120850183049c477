//! Collaborator store abstraction and the static, config-backed implementation.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::types::{Model, ModelFilter, Provider, ProviderFilter, ProviderId};
use crate::config::FailoverConfig;

/// Errors returned by a provider store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("provider not found: {0}")]
    ProviderNotFound(ProviderId),

    #[error("model not found: {0}")]
    ModelNotFound(i64),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read access to provider and model records.
pub trait ProviderStore: Send + Sync {
    fn get_provider(&self, id: ProviderId) -> Result<Provider, CatalogError>;

    fn get_model(&self, id: i64) -> Result<Model, CatalogError>;

    fn list_providers(&self, filter: &ProviderFilter) -> Result<Vec<Provider>, CatalogError>;

    fn list_models(&self, filter: &ModelFilter) -> Result<Vec<Model>, CatalogError>;
}

/// In-memory catalog loaded from the configuration file.
///
/// Listings come back ordered by id so callers see a stable order.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    providers: BTreeMap<ProviderId, Provider>,
    models: BTreeMap<i64, Model>,
}

impl StaticCatalog {
    pub fn new(providers: Vec<Provider>, models: Vec<Model>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.id, p)).collect(),
            models: models.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn from_config(config: &FailoverConfig) -> Self {
        Self::new(
            config.providers.iter().map(Provider::from).collect(),
            config.models.iter().map(Model::from).collect(),
        )
    }
}

impl ProviderStore for StaticCatalog {
    fn get_provider(&self, id: ProviderId) -> Result<Provider, CatalogError> {
        self.providers
            .get(&id)
            .cloned()
            .ok_or(CatalogError::ProviderNotFound(id))
    }

    fn get_model(&self, id: i64) -> Result<Model, CatalogError> {
        self.models
            .get(&id)
            .cloned()
            .ok_or(CatalogError::ModelNotFound(id))
    }

    fn list_providers(&self, filter: &ProviderFilter) -> Result<Vec<Provider>, CatalogError> {
        Ok(self
            .providers
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    fn list_models(&self, filter: &ModelFilter) -> Result<Vec<Model>, CatalogError> {
        Ok(self
            .models
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }
}
