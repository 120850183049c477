//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use provider_failover::config::FailoverConfig;
use provider_failover::config::{ModelConfig, ProviderConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request path and returns the status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            204 => "204 No Content",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Health endpoint whose status code can be flipped at runtime.
pub struct FlakyBackend {
    pub addr: SocketAddr,
    status: Arc<AtomicU16>,
    hits: Arc<AtomicUsize>,
}

impl FlakyBackend {
    pub async fn start(initial_status: u16) -> Self {
        Self::start_with_delay(initial_status, Duration::ZERO).await
    }

    /// Like `start`, but every `/health` reply is held back for `delay`.
    /// Hits are counted when the request arrives.
    pub async fn start_with_delay(initial_status: u16, delay: Duration) -> Self {
        let status = Arc::new(AtomicU16::new(initial_status));
        let hits = Arc::new(AtomicUsize::new(0));

        let (s, h) = (status.clone(), hits.clone());
        let addr = start_programmable_backend(move |path| {
            let (s, h) = (s.clone(), h.clone());
            async move {
                if path != "/health" {
                    return (404, "not found".to_string());
                }
                h.fetch_add(1, Ordering::SeqCst);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                (s.load(Ordering::SeqCst), "ok".to_string())
            }
        })
        .await;

        Self { addr, status, hits }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_status(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Config with health checks off and the given `(id, name, endpoint)`
/// providers all serving `model_key`.
pub fn config_with_providers(model_key: &str, providers: &[(i64, &str, String)]) -> FailoverConfig {
    let mut config = FailoverConfig::default();
    config.health_check.enabled = false;
    config.health_check.timeout_secs = 1;
    config.health_check.client_timeout_secs = 1;

    for (i, (id, name, endpoint)) in providers.iter().enumerate() {
        config.providers.push(ProviderConfig {
            id: *id,
            name: name.to_string(),
            endpoint: endpoint.clone(),
            active: true,
        });
        config.models.push(ModelConfig {
            id: 100 + i as i64,
            model_key: model_key.to_string(),
            provider_id: *id,
            name: String::new(),
        });
    }
    config
}
