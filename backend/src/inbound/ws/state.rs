//! Shared WebSocket adapter state.
//!
//! The live triage socket depends on the same triage service and clock as the
//! HTTP adapter, plus the origin allow-list checked on upgrade.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use url::Url;

use crate::domain::triage::TriageService;
use crate::domain::trial::DEFAULT_TRIAL_DURATION;

const LOCALHOST: &str = "localhost";

/// Origins allowed to open a socket.
///
/// The site host (without a leading `www.`) and its subdomains under the
/// site scheme, plus `http://localhost` with a non-zero explicit port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigins {
    scheme: String,
    primary_host: String,
}

impl AllowedOrigins {
    /// Derive the allow-list from the public site URL.
    ///
    /// # Examples
    /// ```
    /// use telesaude::inbound::ws::state::AllowedOrigins;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.telesaude.example").expect("valid url");
    /// let origins = AllowedOrigins::from_public_base_url(&base);
    /// let chat = Url::parse("https://chat.telesaude.example").expect("valid url");
    /// assert!(origins.allows(&chat));
    /// ```
    pub fn from_public_base_url(base: &Url) -> Self {
        let host = base.host_str().unwrap_or_default();
        let primary_host = host.strip_prefix("www.").unwrap_or(host).to_owned();
        Self {
            scheme: base.scheme().to_owned(),
            primary_host,
        }
    }

    /// Returns true when a parsed Origin belongs to the allow-list.
    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };

        if origin.scheme() == "http" && host == LOCALHOST {
            return matches!(origin.port(), Some(port) if port != 0);
        }
        if origin.scheme() != self.scheme || self.primary_host.is_empty() {
            return false;
        }
        host == self.primary_host
            || host
                .strip_suffix(self.primary_host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.') && prefix.len() > 1)
    }
}

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub triage: TriageService,
    pub clock: Arc<dyn Clock>,
    pub trial_duration: Duration,
    pub origins: AllowedOrigins,
}

impl WsState {
    /// Construct state from the triage service and clock.
    pub fn new(triage: TriageService, clock: Arc<dyn Clock>, origins: AllowedOrigins) -> Self {
        Self {
            triage,
            clock,
            trial_duration: DEFAULT_TRIAL_DURATION,
            origins,
        }
    }

    #[must_use]
    pub fn with_trial_duration(mut self, duration: Duration) -> Self {
        self.trial_duration = duration;
        self
    }
}
