//! Shared setup for integration tests.
//!
//! Integration tests under `backend/tests/` compile as separate crates, so
//! the composed application lives here to avoid copy/paste drift.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use telesaude::Trace;
use telesaude::domain::AdminCredentials;
use telesaude::domain::ports::{GenerativeModel, SimulatedCrmLookup, UnconfiguredModel};
use telesaude::domain::status::StatusBoard;
use telesaude::domain::triage::TriageService;
use telesaude::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use telesaude::inbound::http::state::{HttpState, HttpStatePorts};
use telesaude::inbound::http::{admin, checkout, content, crm, onboarding, status, triage, trial};
use telesaude::inbound::ws;
use telesaude::inbound::ws::state::{AllowedOrigins, WsState};
use telesaude::outbound::checkout::SimulatedCheckoutGateway;
use telesaude::test_support::{MutableClock, fixture_clock};
use url::Url;

pub const BASE_URL: &str = "https://www.telesaude.test";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret";

pub fn base_url() -> Url {
    Url::parse(BASE_URL).expect("base url")
}

/// Collaborators and clock backing one composed application.
pub struct Harness {
    pub http: HttpState,
    pub ws: WsState,
    pub clock: Arc<MutableClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_model(Arc::new(UnconfiguredModel))
    }

    pub fn with_model(model: Arc<dyn GenerativeModel>) -> Self {
        let clock = fixture_clock();
        let ports = HttpStatePorts {
            crm: Arc::new(SimulatedCrmLookup),
            model: model.clone(),
            checkout: Arc::new(SimulatedCheckoutGateway::new(base_url())),
            clock: clock.clone(),
        };
        let admin = AdminCredentials::try_from_parts(ADMIN_USERNAME, ADMIN_PASSWORD)
            .expect("admin credentials");
        let http = HttpState::new(ports, Arc::new(StatusBoard::new()), base_url())
            .with_admin(Some(admin))
            .with_trial_duration(Duration::from_secs(300));
        let ws = WsState::new(
            TriageService::new(model),
            clock.clone(),
            AllowedOrigins::from_public_base_url(&base_url()),
        );
        Self { http, ws, clock }
    }
}

fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The full route table wired the way the server binary wires it.
pub fn app(
    harness: &Harness,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let api = web::scope("/api/v1")
        .service(crm::lookup_crm)
        .service(triage::triage_chat)
        .service(trial::start_trial)
        .service(trial::get_trial)
        .service(checkout::list_plans)
        .service(checkout::start_checkout)
        .service(status::get_status)
        .service(onboarding::get_professional_wizard)
        .service(onboarding::submit_professional_step)
        .service(onboarding::professional_wizard_back)
        .service(onboarding::reset_professional_wizard)
        .service(onboarding::register_patient)
        .service(admin::admin_login)
        .service(admin::admin_logout)
        .service(admin::generate_seo_link)
        .service(admin::list_seo_permutations);

    App::new()
        .app_data(web::Data::new(harness.http.clone()))
        .app_data(web::Data::new(harness.ws.clone()))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(session_middleware())
        .wrap(Trace)
        .service(api)
        .service(ws::ws_entry)
        .service(content::list_jobs)
        .service(content::get_job)
        .service(content::state_page)
        .service(content::city_page)
        .service(content::specialty_page)
        .service(content::legacy_tag_redirect)
}

/// The `session` cookie set on `res`, if any.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}
