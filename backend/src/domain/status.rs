//! Status board for the external services the site depends on.
//!
//! A background task checks every configured target on a fixed interval and
//! replaces the board's snapshot; readers always see a complete snapshot.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use utoipa::ToSchema;

use super::ports::StatusCheck;

/// Default refresh interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// A monitored service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub name: String,
    pub url: Url,
}

/// Health of one service, ordered from best to worst.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceHealth {
    Operational,
    Degraded,
    Down,
}

impl fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Operational => "operational",
            Self::Degraded => "degraded",
            Self::Down => "down",
        })
    }
}

/// Result of checking one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    pub health: ServiceHealth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// What readers of the board receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub overall: ServiceHealth,
    pub services: Vec<ServiceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    fn from_services(services: Vec<ServiceStatus>) -> Self {
        Self {
            overall: overall_health(&services),
            refreshed_at: services.iter().map(|status| status.checked_at).max(),
            services,
        }
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::from_services(Vec::new())
    }
}

/// Worst health across `services`; operational when there are none.
pub fn overall_health(services: &[ServiceStatus]) -> ServiceHealth {
    services
        .iter()
        .map(|status| status.health)
        .max()
        .unwrap_or(ServiceHealth::Operational)
}

/// Errors raised while parsing the `name=url` target list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusTargetError {
    #[error("status target '{0}' must look like name=url")]
    Malformed(String),
    #[error("status target '{name}' has an invalid URL: {reason}")]
    InvalidUrl { name: String, reason: String },
    #[error("status target '{name}' must use http or https")]
    UnsupportedScheme { name: String },
}

/// Parse a comma separated `name=url` list; blank entries are ignored.
///
/// # Examples
/// ```
/// use telesaude::domain::status::parse_targets;
///
/// let targets = parse_targets("crm=https://crm.example/health, ai=https://ai.example").unwrap();
/// assert_eq!(targets.len(), 2);
/// assert_eq!(targets[0].name, "crm");
/// ```
pub fn parse_targets(raw: &str) -> Result<Vec<ServiceTarget>, StatusTargetError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .map(|(name, url)| (name.trim(), url.trim()))
                .filter(|(name, url)| !name.is_empty() && !url.is_empty())
                .ok_or_else(|| StatusTargetError::Malformed(entry.to_owned()))?;
            let url = Url::parse(url).map_err(|err| StatusTargetError::InvalidUrl {
                name: name.to_owned(),
                reason: err.to_string(),
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(StatusTargetError::UnsupportedScheme {
                    name: name.to_owned(),
                });
            }
            Ok(ServiceTarget {
                name: name.to_owned(),
                url,
            })
        })
        .collect()
}

/// Shared holder of the latest snapshot.
#[derive(Debug, Default)]
pub struct StatusBoard {
    snapshot: RwLock<StatusSnapshot>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot.
    pub async fn snapshot(&self) -> StatusSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Check every target concurrently and publish the results.
    pub async fn refresh(&self, checker: &dyn StatusCheck, targets: &[ServiceTarget]) {
        let services = join_all(targets.iter().map(|target| checker.check(target))).await;
        let next = StatusSnapshot::from_services(services);
        if next.overall != ServiceHealth::Operational {
            warn!(overall = %next.overall, "external services are not fully operational");
        } else {
            debug!(services = next.services.len(), "status board refreshed");
        }
        *self.snapshot.write().await = next;
    }
}

/// Spawn the polling task. The first refresh happens immediately; abort the
/// returned handle to stop polling.
pub fn spawn_status_poller(
    board: Arc<StatusBoard>,
    checker: Arc<dyn StatusCheck>,
    targets: Vec<ServiceTarget>,
    interval: Duration,
) -> JoinHandle<()> {
    info!(
        targets = targets.len(),
        interval_secs = interval.as_secs(),
        "starting status poller"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            board.refresh(checker.as_ref(), &targets).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockStatusCheck;
    use chrono::TimeZone;
    use rstest::rstest;

    fn target(name: &str) -> ServiceTarget {
        ServiceTarget {
            name: name.to_owned(),
            url: Url::parse(&format!("https://{name}.example/health")).expect("valid url"),
        }
    }

    fn status(name: &str, health: ServiceHealth, minute: u32) -> ServiceStatus {
        ServiceStatus {
            name: name.to_owned(),
            health,
            latency_ms: Some(12),
            checked_at: Utc
                .with_ymd_and_hms(2026, 1, 1, 12, minute, 0)
                .single()
                .expect("valid timestamp"),
            detail: None,
        }
    }

    #[rstest]
    #[case::none(&[], ServiceHealth::Operational)]
    #[case::all_ok(&[ServiceHealth::Operational, ServiceHealth::Operational], ServiceHealth::Operational)]
    #[case::one_degraded(&[ServiceHealth::Operational, ServiceHealth::Degraded], ServiceHealth::Degraded)]
    #[case::down_wins(&[ServiceHealth::Down, ServiceHealth::Degraded], ServiceHealth::Down)]
    fn overall_is_worst_health(#[case] healths: &[ServiceHealth], #[case] expected: ServiceHealth) {
        let services: Vec<ServiceStatus> = healths
            .iter()
            .map(|health| status("svc", *health, 0))
            .collect();
        assert_eq!(overall_health(&services), expected);
    }

    #[test]
    fn parses_target_list() {
        let targets =
            parse_targets(" crm = https://crm.example/health ,, gemini=http://ai.example ")
                .expect("valid list");
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["crm", "gemini"]);
        assert_eq!(targets[1].url.as_str(), "http://ai.example/");
    }

    #[rstest]
    #[case::missing_separator("crm https://crm.example")]
    #[case::empty_name("=https://crm.example")]
    #[case::bad_url("crm=not a url")]
    #[case::ftp("crm=ftp://crm.example")]
    fn rejects_malformed_targets(#[case] raw: &str) {
        assert!(parse_targets(raw).is_err());
    }

    #[test]
    fn empty_target_list_is_allowed() {
        assert_eq!(parse_targets("  "), Ok(Vec::new()));
    }

    #[tokio::test]
    async fn refresh_publishes_check_results() {
        let mut checker = MockStatusCheck::new();
        checker.expect_check().times(2).returning(|target| {
            let health = if target.name == "crm" {
                ServiceHealth::Down
            } else {
                ServiceHealth::Operational
            };
            let minute = if target.name == "crm" { 5 } else { 3 };
            status(&target.name, health, minute)
        });

        let board = StatusBoard::new();
        assert_eq!(board.snapshot().await.overall, ServiceHealth::Operational);

        board.refresh(&checker, &[target("crm"), target("ai")]).await;
        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.overall, ServiceHealth::Down);
        assert_eq!(snapshot.services.len(), 2);
        assert_eq!(snapshot.refreshed_at, Some(status("crm", ServiceHealth::Down, 5).checked_at));
    }

    #[tokio::test(start_paused = true)]
    async fn poller_refreshes_until_aborted() {
        let mut checker = MockStatusCheck::new();
        checker
            .expect_check()
            .returning(|target| status(&target.name, ServiceHealth::Degraded, 0));

        let board = Arc::new(StatusBoard::new());
        let handle = spawn_status_poller(
            Arc::clone(&board),
            Arc::new(checker),
            vec![target("crm")],
            Duration::from_secs(60),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(board.snapshot().await.overall, ServiceHealth::Degraded);

        handle.abort();
        let joined = handle.await;
        assert!(joined.is_err_and(|err| err.is_cancelled()));
    }
}
