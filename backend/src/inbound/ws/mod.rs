//! WebSocket inbound adapter for the live triage chat.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list, active trial)
//! - hand the socket to the per-connection session loop
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use mockable::Clock;
use tracing::{error, warn};
use url::Url;

use crate::inbound::http::session::SessionContext;
use crate::inbound::http::trial::ensure_active_trial;

mod session;

pub mod messages;
pub mod state;

use state::{AllowedOrigins, WsState};

/// Handle WebSocket upgrade for the `/ws/triage` endpoint.
///
/// Opening the socket starts the trial countdown; an expired trial refuses
/// the upgrade with `403`.
#[get("/ws/triage")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    session: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(&state.origins, origin_header)?;

    let trial = ensure_active_trial(&session, state.clock.utc(), state.trial_duration)?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream).inspect_err(|error| {
        warn!(error = %error, "WebSocket upgrade failed");
    })?;

    actix_web::rt::spawn(session::handle_ws_session(
        state.triage.clone(),
        state.clock.clone(),
        trial,
        ws_session,
        msg_stream,
    ));

    Ok(response)
}

fn validate_origin(allowed: &AllowedOrigins, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
