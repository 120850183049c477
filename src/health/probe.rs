//! HTTP health probe.
//!
//! Issues `GET <endpoint><path>` and reports whether the provider answered
//! `200 OK` within the request timeout. Every other outcome is unhealthy.

use std::time::Duration;

use crate::config::HealthCheckConfig;

/// Performs single health probes against provider endpoints.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    path: String,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(config: &HealthCheckConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.client_timeout_secs))
            .user_agent("provider-failover-health-check")
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build health check client, using defaults");
                reqwest::Client::new()
            });

        Self {
            client,
            path: config.path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Probe URL for a provider endpoint.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", endpoint.trim_end_matches('/'), self.path)
    }

    /// Probe one endpoint. Never fails; problems are logged and reported unhealthy.
    pub async fn check(&self, endpoint: &str) -> bool {
        let url = self.url_for(endpoint);

        match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => {
                let healthy = response.status() == reqwest::StatusCode::OK;
                if !healthy {
                    tracing::warn!(url = %url, status = %response.status(), "Health check failed: non-200 status");
                }
                healthy
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(url = %url, "Health check failed: timeout");
                false
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Health check failed: connection error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let probe = HealthProbe::new(&HealthCheckConfig::default());
        assert_eq!(probe.url_for("http://api.local/"), "http://api.local/health");
        assert_eq!(probe.url_for("http://api.local/v1"), "http://api.local/v1/health");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unhealthy() {
        let config = HealthCheckConfig {
            timeout_secs: 1,
            ..HealthCheckConfig::default()
        };
        let probe = HealthProbe::new(&config);
        // Port 9 (discard) on loopback is almost never listening.
        assert!(!probe.check("http://127.0.0.1:9").await);
        assert!(!probe.check("not a url").await);
    }
}
