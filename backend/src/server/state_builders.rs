//! Builders selecting real or simulated adapters for each driven port.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;
use tracing::info;

use telesaude::domain::ports::{
    CheckoutGateway, CrmLookup, GenerativeModel, SimulatedCrmLookup, UnconfiguredModel,
};
use telesaude::domain::status::{StatusBoard, spawn_status_poller};
use telesaude::domain::triage::TriageService;
use telesaude::inbound::http::state::{HttpState, HttpStatePorts};
use telesaude::inbound::ws::state::{AllowedOrigins, WsState};
use telesaude::outbound::checkout::SimulatedCheckoutGateway;
use telesaude::outbound::crm::CrmHttpLookup;
use telesaude::outbound::gemini::GeminiHttpModel;
use telesaude::outbound::status::HttpStatusCheck;

use super::ServerConfig;

fn client_error(adapter: &str, err: reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("failed to build {adapter} HTTP client: {err}"))
}

/// The CRM registry when an API key is configured, otherwise the simulation.
fn build_crm_lookup(config: &ServerConfig) -> std::io::Result<Arc<dyn CrmLookup>> {
    match &config.crm {
        Some(crm) => {
            info!(base_url = %crm.base_url, "using CRM registry");
            let lookup = CrmHttpLookup::new(
                crm.base_url.clone(),
                crm.api_key.clone(),
                config.request_timeout,
            )
            .map_err(|err| client_error("CRM", err))?;
            Ok(Arc::new(lookup))
        }
        None => {
            info!("no CRM API key configured; using simulated registry");
            Ok(Arc::new(SimulatedCrmLookup))
        }
    }
}

/// The generative model when an API key is configured, otherwise a stand-in
/// that always fails so triage answers with its fallback.
fn build_model(config: &ServerConfig) -> std::io::Result<Arc<dyn GenerativeModel>> {
    match &config.model {
        Some(model) => {
            info!(model = %model.model, "using generative model");
            let adapter = GeminiHttpModel::new(
                model.upstream.base_url.clone(),
                model.model.clone(),
                model.upstream.api_key.clone(),
                config.request_timeout,
            )
            .map_err(|err| client_error("model", err))?;
            Ok(Arc::new(adapter))
        }
        None => {
            info!("no model API key configured; triage will use the fallback reply");
            Ok(Arc::new(UnconfiguredModel))
        }
    }
}

/// Adapters shared by the HTTP and WebSocket states.
pub(super) fn build_ports(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> std::io::Result<HttpStatePorts> {
    let checkout: Arc<dyn CheckoutGateway> =
        Arc::new(SimulatedCheckoutGateway::new(config.public_base_url.clone()));
    Ok(HttpStatePorts {
        crm: build_crm_lookup(config)?,
        model: build_model(config)?,
        checkout,
        clock,
    })
}

/// Build the shared HTTP state.
pub(super) fn build_http_state(
    config: &ServerConfig,
    ports: HttpStatePorts,
    status_board: Arc<StatusBoard>,
) -> web::Data<HttpState> {
    web::Data::new(
        HttpState::new(ports, status_board, config.public_base_url.clone())
            .with_admin(config.admin.clone())
            .with_trial_duration(config.trial_duration),
    )
}

/// Build the live triage socket state from the same model and clock.
pub(super) fn build_ws_state(config: &ServerConfig, ports: &HttpStatePorts) -> web::Data<WsState> {
    web::Data::new(
        WsState::new(
            TriageService::new(ports.model.clone()),
            ports.clock.clone(),
            AllowedOrigins::from_public_base_url(&config.public_base_url),
        )
        .with_trial_duration(config.trial_duration),
    )
}

/// Start polling the configured targets; `None` when there are none.
pub(super) fn start_status_poller(
    config: &ServerConfig,
    status_board: Arc<StatusBoard>,
) -> std::io::Result<Option<JoinHandle<()>>> {
    if config.status_targets.is_empty() {
        info!("no status targets configured; status board stays empty");
        return Ok(None);
    }
    let checker = HttpStatusCheck::new(config.request_timeout, Arc::new(DefaultClock))
        .map_err(|err| client_error("status check", err))?;
    Ok(Some(spawn_status_poller(
        status_board,
        Arc::new(checker),
        config.status_targets.clone(),
        config.status_poll_interval,
    )))
}
