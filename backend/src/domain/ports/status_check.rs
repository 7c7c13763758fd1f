//! Driven port for checking an external service's health.

use async_trait::async_trait;

use crate::domain::status::{ServiceStatus, ServiceTarget};

/// Port for checking one monitored service.
///
/// Checks never fail: unreachable services are reported as down.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusCheck: Send + Sync {
    /// Check `target` once.
    async fn check(&self, target: &ServiceTarget) -> ServiceStatus;
}
