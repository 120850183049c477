//! Failover error taxonomy.

use thiserror::Error;

use crate::catalog::CatalogError;

/// Errors returned by provider selection and routing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailoverError {
    /// The model is not served by any provider in the catalog.
    #[error("no providers available for model {0}")]
    NoProvidersAvailable(String),

    /// The model is known but every candidate's circuit is open.
    #[error("no healthy providers available for model {0}")]
    NoHealthyProviders(String),

    /// The collaborator store failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl FailoverError {
    /// Whether retrying later (or elsewhere) may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FailoverError::NoHealthyProviders(_))
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FailoverError::NoProvidersAvailable(_) => "no_providers",
            FailoverError::NoHealthyProviders(_) => "no_healthy_providers",
            FailoverError::Catalog(_) => "catalog",
        }
    }
}

pub type FailoverResult<T> = Result<T, FailoverError>;
