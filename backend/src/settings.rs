//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `TELESAUDE_*` environment variables and
//! configuration files, in that order of precedence. Optional fields fall
//! back to the defaults exposed by the accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::status::{DEFAULT_POLL_INTERVAL, ServiceTarget, StatusTargetError, parse_targets};
use crate::domain::trial::DEFAULT_TRIAL_DURATION;
use crate::domain::{AdminCredentials, AdminCredentialsError};
use crate::outbound::gemini::DEFAULT_GEMINI_BASE_URL;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_PUBLIC_BASE_URL: &str = "https://www.telesaude.example";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_CRM_BASE_URL: &str = "https://api.consultacrm.example";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} is not a valid URL: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    StatusTargets(#[from] StatusTargetError),
    #[error("admin credentials are invalid: {0}")]
    AdminCredentials(#[from] AdminCredentialsError),
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

fn parse_url(field: &'static str, value: Option<&str>, default: &str) -> Result<Url, SettingsError> {
    Url::parse(value.unwrap_or(default)).map_err(|source| SettingsError::InvalidUrl { field, source })
}

fn seconds(
    field: &'static str,
    value: Option<u64>,
    default: Duration,
) -> Result<Duration, SettingsError> {
    match value {
        Some(0) => Err(SettingsError::ZeroDuration { field }),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(default),
    }
}

/// Runtime configuration for the telehealth service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TELESAUDE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// Public site URL used for links, redirects and the WebSocket origin check.
    pub public_base_url: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow a throwaway session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Emit the session cookie with the `Secure` attribute.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Generative model API key; triage answers with a fallback when absent.
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    /// CRM registry API key; a simulated registry is used when absent.
    pub crm_api_key: Option<String>,
    pub crm_base_url: Option<String>,
    /// Admin login is disabled unless both are set.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// Comma separated `name=url` list checked by the status board.
    pub status_targets: Option<String>,
    pub status_poll_seconds: Option<u64>,
    pub trial_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn public_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "public_base_url",
            self.public_base_url.as_deref(),
            DEFAULT_PUBLIC_BASE_URL,
        )
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    pub fn gemini_model(&self) -> &str {
        self.gemini_model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    pub fn gemini_base_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "gemini_base_url",
            self.gemini_base_url.as_deref(),
            DEFAULT_GEMINI_BASE_URL,
        )
    }

    pub fn crm_base_url(&self) -> Result<Url, SettingsError> {
        parse_url("crm_base_url", self.crm_base_url.as_deref(), DEFAULT_CRM_BASE_URL)
    }

    /// Configured admin credentials, or `None` when the login is disabled.
    pub fn admin_credentials(&self) -> Result<Option<AdminCredentials>, SettingsError> {
        match (&self.admin_username, &self.admin_password) {
            (Some(username), Some(password)) => {
                Ok(Some(AdminCredentials::try_from_parts(username, password)?))
            }
            _ => Ok(None),
        }
    }

    pub fn status_targets(&self) -> Result<Vec<ServiceTarget>, SettingsError> {
        Ok(self
            .status_targets
            .as_deref()
            .map(parse_targets)
            .transpose()?
            .unwrap_or_default())
    }

    pub fn status_poll_interval(&self) -> Result<Duration, SettingsError> {
        seconds(
            "status_poll_seconds",
            self.status_poll_seconds,
            DEFAULT_POLL_INTERVAL,
        )
    }

    pub fn trial_duration(&self) -> Result<Duration, SettingsError> {
        seconds("trial_seconds", self.trial_seconds, DEFAULT_TRIAL_DURATION)
    }

    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        seconds(
            "request_timeout_seconds",
            self.request_timeout_seconds,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }
}
