//! Server construction and middleware wiring.

pub(crate) mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{ModelConfig, ServerConfig, UpstreamConfig};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
#[cfg(feature = "metrics")]
pub(crate) use metrics::telehealth_metrics;
use state_builders::{build_http_state, build_ports, build_ws_state, start_status_poller};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tokio::task::JoinHandle;

use telesaude::Trace;
#[cfg(debug_assertions)]
use telesaude::doc::ApiDoc;
use telesaude::domain::status::StatusBoard;
use telesaude::inbound::http::admin::{
    admin_login, admin_logout, generate_seo_link, list_seo_permutations,
};
use telesaude::inbound::http::checkout::{list_plans, start_checkout};
use telesaude::inbound::http::content::{
    city_page, get_job, legacy_tag_redirect, list_jobs, specialty_page, state_page,
};
use telesaude::inbound::http::crm::lookup_crm;
use telesaude::inbound::http::error::{
    json_error_handler, path_error_handler, query_error_handler,
};
use telesaude::inbound::http::health::{HealthState, live, ready};
use telesaude::inbound::http::onboarding::{
    get_professional_wizard, professional_wizard_back, register_patient,
    reset_professional_wizard, submit_professional_step,
};
use telesaude::inbound::http::state::HttpState;
use telesaude::inbound::http::status::get_status;
use telesaude::inbound::http::triage::triage_chat;
use telesaude::inbound::http::trial::{get_trial, start_trial};
use telesaude::inbound::ws;
use telesaude::inbound::ws::state::WsState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .service(lookup_crm)
        .service(triage_chat)
        .service(start_trial)
        .service(get_trial)
        .service(list_plans)
        .service(start_checkout)
        .service(get_status)
        .service(get_professional_wizard)
        .service(submit_professional_step)
        .service(professional_wizard_back)
        .service(reset_professional_wizard)
        .service(register_patient)
        .service(admin_login)
        .service(admin_logout)
        .service(generate_seo_link)
        .service(list_seo_permutations);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(session)
        .wrap(Trace)
        .service(api)
        .service(ws::ws_entry)
        .service(ready)
        .service(live)
        .service(list_jobs)
        .service(get_job)
        .service(state_page)
        .service(city_page)
        .service(specialty_page)
        .service(legacy_tag_redirect);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// A bound server plus the background status poller it owns.
pub struct RunningServer {
    pub server: Server,
    /// Abort on shutdown to stop polling.
    pub status_poller: Option<JoinHandle<()>>,
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing session, binding, upstream and optional metrics settings.
///
/// # Returns
/// A [`RunningServer`] whose `server` must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when an HTTP client cannot be built or when
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let server_health_state = health_state.clone();
    let status_board = Arc::new(StatusBoard::new());
    let ports = build_ports(&config, Arc::new(DefaultClock))?;
    let ws_state = build_ws_state(&config, &ports);
    let http_state = build_http_state(&config, ports, status_board.clone());
    let status_poller = start_status_poller(&config, status_board)?;

    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)
    .inspect_err(|_| {
        if let Some(poller) = &status_poller {
            poller.abort();
        }
    })?
    .run();

    health_state.mark_ready();
    Ok(RunningServer {
        server,
        status_poller,
    })
}
