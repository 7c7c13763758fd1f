//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

use telesaude::domain::AdminCredentials;
use telesaude::domain::status::{DEFAULT_POLL_INTERVAL, ServiceTarget};
use telesaude::domain::trial::DEFAULT_TRIAL_DURATION;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Credentials and endpoint for a keyed upstream API.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub api_key: String,
}

/// Generative model endpoint plus the model name.
#[derive(Clone)]
pub struct ModelConfig {
    pub upstream: UpstreamConfig,
    pub model: String,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) public_base_url: Url,
    pub(crate) admin: Option<AdminCredentials>,
    pub(crate) trial_duration: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) crm: Option<UpstreamConfig>,
    pub(crate) model: Option<ModelConfig>,
    pub(crate) status_targets: Vec<ServiceTarget>,
    pub(crate) status_poll_interval: Duration,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Upstreams start unset, so the simulated CRM registry and the
    /// unconfigured model are used until `with_crm`/`with_model` are called.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        public_base_url: Url,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            public_base_url,
            admin: None,
            trial_duration: DEFAULT_TRIAL_DURATION,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            crm: None,
            model: None,
            status_targets: Vec::new(),
            status_poll_interval: DEFAULT_POLL_INTERVAL,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Enable the admin login with the given credentials.
    #[must_use]
    pub fn with_admin(mut self, admin: Option<AdminCredentials>) -> Self {
        self.admin = admin;
        self
    }

    #[must_use]
    pub fn with_trial_duration(mut self, duration: Duration) -> Self {
        self.trial_duration = duration;
        self
    }

    /// Timeout applied to every outbound HTTP call.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Use the real CRM registry.
    #[must_use]
    pub fn with_crm(mut self, crm: Option<UpstreamConfig>) -> Self {
        self.crm = crm;
        self
    }

    /// Use the real generative model.
    #[must_use]
    pub fn with_model(mut self, model: Option<ModelConfig>) -> Self {
        self.model = model;
        self
    }

    /// Poll `targets` for the status board every `interval`.
    #[must_use]
    pub fn with_status_targets(mut self, targets: Vec<ServiceTarget>, interval: Duration) -> Self {
        self.status_targets = targets;
        self.status_poll_interval = interval;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by unit tests; retained for fixture access")
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
