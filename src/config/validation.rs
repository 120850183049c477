//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (models reference existing providers)
//! - Validate value ranges (thresholds > 0, ratios in (0, 1])
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::schema::FailoverConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be in (0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("duplicate provider id {0}")]
    DuplicateProvider(i64),

    #[error("provider {id} has invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint {
        id: i64,
        endpoint: String,
        reason: String,
    },

    #[error("duplicate model id {0}")]
    DuplicateModel(i64),

    #[error("model {0} has an empty model key")]
    EmptyModelKey(i64),

    #[error("model {model_id} references unknown provider {provider_id}")]
    UnknownProvider { model_id: i64, provider_id: i64 },

    #[error("health check path {0:?} must start with '/'")]
    InvalidHealthPath(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let breaker = &config.circuit_breaker;
    check_positive(&mut errors, "circuit_breaker.failure_threshold", breaker.failure_threshold as u64);
    check_positive(&mut errors, "circuit_breaker.success_threshold", breaker.success_threshold as u64);
    check_positive(&mut errors, "circuit_breaker.recovery_timeout_ms", breaker.recovery_timeout_ms);

    let health = &config.health_check;
    check_positive(&mut errors, "health_check.interval_secs", health.interval_secs);
    check_positive(&mut errors, "health_check.timeout_secs", health.timeout_secs);
    check_positive(&mut errors, "health_check.client_timeout_secs", health.client_timeout_secs);
    if !health.path.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath(health.path.clone()));
    }

    check_unit(&mut errors, "latency.smoothing_factor", config.latency.smoothing_factor);
    check_unit(&mut errors, "selection.cost_effective_ratio", config.selection.cost_effective_ratio);
    check_unit(&mut errors, "selection.cost_effective_share", config.selection.cost_effective_share);

    let mut provider_ids = HashSet::new();
    for provider in &config.providers {
        if !provider_ids.insert(provider.id) {
            errors.push(ValidationError::DuplicateProvider(provider.id));
        }
        match Url::parse(&provider.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::InvalidEndpoint {
                id: provider.id,
                endpoint: provider.endpoint.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidEndpoint {
                id: provider.id,
                endpoint: provider.endpoint.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let mut model_ids = HashSet::new();
    for model in &config.models {
        if !model_ids.insert(model.id) {
            errors.push(ValidationError::DuplicateModel(model.id));
        }
        if model.model_key.trim().is_empty() {
            errors.push(ValidationError::EmptyModelKey(model.id));
        }
        if !provider_ids.contains(&model.provider_id) {
            errors.push(ValidationError::UnknownProvider {
                model_id: model.id,
                provider_id: model.provider_id,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::NotPositive { field });
    }
}

fn check_unit(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !(value > 0.0 && value <= 1.0) {
        errors.push(ValidationError::OutOfUnitRange { field, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ModelConfig, ProviderConfig};

    fn provider(id: i64, endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            id,
            name: format!("p{}", id),
            endpoint: endpoint.to_string(),
            active: true,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FailoverConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FailoverConfig::default();
        config.circuit_breaker.failure_threshold = 0;
        config.latency.smoothing_factor = 1.5;
        config.health_check.path = "health".into();
        config.providers.push(provider(1, "http://localhost:9000"));
        config.providers.push(provider(1, "ftp://localhost"));
        config.models.push(ModelConfig {
            id: 10,
            model_key: "gpt-4o".into(),
            provider_id: 7,
            name: String::new(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::NotPositive {
            field: "circuit_breaker.failure_threshold"
        }));
        assert!(errors.contains(&ValidationError::DuplicateProvider(1)));
        assert!(errors.contains(&ValidationError::UnknownProvider {
            model_id: 10,
            provider_id: 7
        }));
        assert!(errors.contains(&ValidationError::InvalidHealthPath("health".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::OutOfUnitRange { field: "latency.smoothing_factor", .. })));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidEndpoint { id: 1, .. })));
    }

    #[test]
    fn test_empty_model_key_rejected() {
        let mut config = FailoverConfig::default();
        config.providers.push(provider(1, "https://api.example.com"));
        config.models.push(ModelConfig {
            id: 1,
            model_key: "  ".into(),
            provider_id: 1,
            name: String::new(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyModelKey(1)]);
    }
}
