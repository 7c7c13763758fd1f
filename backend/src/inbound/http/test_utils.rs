//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use url::Url;

use crate::domain::ports::{SimulatedCrmLookup, UnconfiguredModel};
use crate::domain::status::StatusBoard;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::checkout::SimulatedCheckoutGateway;
use crate::test_support::{MutableClock, fixture_clock};

pub const TEST_BASE_URL: &str = "https://www.telesaude.test";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

fn test_base_url() -> Url {
    Url::parse(TEST_BASE_URL).unwrap_or_else(|err| panic!("test base url: {err}"))
}

/// Simulated collaborators sharing one fixed clock.
pub fn test_ports() -> (HttpStatePorts, Arc<MutableClock>) {
    let clock = fixture_clock();
    let ports = HttpStatePorts {
        crm: Arc::new(SimulatedCrmLookup),
        model: Arc::new(UnconfiguredModel),
        checkout: Arc::new(SimulatedCheckoutGateway::new(test_base_url())),
        clock: clock.clone(),
    };
    (ports, clock)
}

/// Handler state built from `ports` with an empty status board.
pub fn state_from(ports: HttpStatePorts) -> HttpState {
    HttpState::new(ports, Arc::new(StatusBoard::new()), test_base_url())
}

/// Handler state wired to simulated collaborators and a fixed clock.
///
/// Returns the clock too so tests can move time forward.
pub fn test_state() -> (HttpState, Arc<MutableClock>) {
    let (ports, clock) = test_ports();
    (state_from(ports), clock)
}

/// The `session` cookie set on `res`, if any.
pub fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}
