//! Service entry-point: loads settings, wires the HTTP server and starts the
//! status poller.

mod server;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ModelConfig, RunningServer, ServerConfig, UpstreamConfig, create_server};
use telesaude::inbound::http::health::HealthState;
use telesaude::settings::{AppSettings, SettingsError};

fn settings_error(err: SettingsError) -> std::io::Error {
    std::io::Error::other(format!("invalid configuration: {err}"))
}

fn load_session_key(settings: &AppSettings) -> std::io::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(path = %key_path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    key_path.display()
                )))
            }
        }
    }
}

fn server_config(settings: &AppSettings, key: Key) -> Result<ServerConfig, SettingsError> {
    let crm = settings
        .crm_api_key
        .clone()
        .map(|api_key| {
            Ok::<_, SettingsError>(UpstreamConfig {
                base_url: settings.crm_base_url()?,
                api_key,
            })
        })
        .transpose()?;
    let model = settings
        .gemini_api_key
        .clone()
        .map(|api_key| {
            Ok::<_, SettingsError>(ModelConfig {
                upstream: UpstreamConfig {
                    base_url: settings.gemini_base_url()?,
                    api_key,
                },
                model: settings.gemini_model().to_owned(),
            })
        })
        .transpose()?;

    Ok(ServerConfig::new(
        key,
        settings.cookie_secure,
        SameSite::Lax,
        settings.bind_addr(),
        settings.public_base_url()?,
    )
    .with_admin(settings.admin_credentials()?)
    .with_trial_duration(settings.trial_duration()?)
    .with_request_timeout(settings.request_timeout()?)
    .with_crm(crm)
    .with_model(model)
    .with_status_targets(settings.status_targets()?, settings.status_poll_interval()?))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os()).map_err(|e| {
        std::io::Error::other(format!("failed to load configuration: {e}"))
    })?;
    let key = load_session_key(&settings)?;
    let config = server_config(&settings, key).map_err(settings_error)?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::telehealth_metrics());

    let health_state = web::Data::new(HealthState::new());
    let RunningServer {
        server,
        status_poller,
    } = create_server(health_state.clone(), config)?;
    info!(addr = %settings.bind_addr(), "telesaude listening");

    let result = server.await;
    health_state.mark_unhealthy();
    if let Some(poller) = status_poller {
        poller.abort();
    }
    result
}
