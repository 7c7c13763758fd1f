//! HTTP health check for the status board.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mockable::Clock;
use reqwest::Client;
use tracing::debug;

use crate::domain::ports::StatusCheck;
use crate::domain::status::{ServiceHealth, ServiceStatus, ServiceTarget};

/// Checks a target with `GET` and classifies the response.
///
/// 2xx/3xx are operational, 4xx degraded, 5xx and transport failures down.
pub struct HttpStatusCheck {
    client: Client,
    clock: Arc<dyn Clock>,
}

impl HttpStatusCheck {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, clock })
    }
}

/// Classify an HTTP status code.
pub fn health_for_status(status: reqwest::StatusCode) -> ServiceHealth {
    if status.is_server_error() {
        ServiceHealth::Down
    } else if status.is_client_error() {
        ServiceHealth::Degraded
    } else {
        ServiceHealth::Operational
    }
}

#[async_trait]
impl StatusCheck for HttpStatusCheck {
    async fn check(&self, target: &ServiceTarget) -> ServiceStatus {
        let started = Instant::now();
        let outcome = self.client.get(target.url.clone()).send().await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (health, detail) = match outcome {
            Ok(response) => {
                let status = response.status();
                let health = health_for_status(status);
                let detail = (health != ServiceHealth::Operational)
                    .then(|| format!("status {}", status.as_u16()));
                (health, detail)
            }
            Err(error) => (ServiceHealth::Down, Some(error.to_string())),
        };
        debug!(service = %target.name, %health, latency_ms, "status check finished");
        ServiceStatus {
            name: target.name.clone(),
            health,
            latency_ms: Some(latency_ms),
            checked_at: self.clock.utc(),
            detail,
        }
    }
}
