//! Trial countdown endpoints.
//!
//! ```text
//! POST /api/v1/trial
//! GET  /api/v1/trial
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::time::Duration;

use crate::domain::Error;
use crate::domain::trial::{TrialSession, TrialStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Start the trial if needed and refuse once it has run out.
///
/// Shared by every endpoint that consumes trial time.
pub(crate) fn require_active_trial(
    state: &HttpState,
    session: &SessionContext,
) -> Result<TrialSession, Error> {
    ensure_active_trial(session, state.clock.utc(), state.trial_duration)
}

/// Clock-explicit form of [`require_active_trial`] for adapters that do not
/// hold an [`HttpState`].
pub(crate) fn ensure_active_trial(
    session: &SessionContext,
    now: DateTime<Utc>,
    duration: Duration,
) -> Result<TrialSession, Error> {
    let trial = session.start_trial(now, duration)?;
    if trial.is_expired(now) {
        return Err(Error::forbidden("trial period has ended").with_details(
            serde_json::json!({ "code": "trial_expired", "endsAt": trial.ends_at() }),
        ));
    }
    Ok(trial)
}

/// Start the trial countdown. Repeated calls keep the original start.
#[utoipa::path(
    post,
    path = "/api/v1/trial",
    responses(
        (status = 200, description = "Trial status", body = TrialStatus),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["trial"],
    operation_id = "startTrial",
    security([])
)]
#[post("/trial")]
pub async fn start_trial(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let now = state.clock.utc();
    let trial = session.start_trial(now, state.trial_duration)?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(trial.status(now)))
}

/// Report the remaining trial time.
#[utoipa::path(
    get,
    path = "/api/v1/trial",
    responses(
        (status = 200, description = "Trial status", body = TrialStatus),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["trial"],
    operation_id = "getTrial",
    security([])
)]
#[get("/trial")]
pub async fn get_trial(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let now = state.clock.utc();
    let status = session
        .trial(state.trial_duration)?
        .map_or_else(|| TrialStatus::not_started(state.trial_duration), |trial| trial.status(now));
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware, test_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;
    use std::time::Duration;

    #[actix_web::test]
    async fn countdown_runs_from_first_start() {
        let (state, clock) = test_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(test_session_middleware())
                .service(web::scope("/api/v1").service(start_trial).service(get_trial)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/trial").to_request()).await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["remainingSeconds"], 300);
        assert_eq!(body["startedAt"], Value::Null);

        let res = test::call_service(&app, test::TestRequest::post().uri("/api/v1/trial").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = session_cookie(&res).expect("session cookie");

        clock.advance(Duration::from_secs(120));
        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/v1/trial").cookie(cookie.clone()).to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["remainingSeconds"], 180);

        clock.advance(Duration::from_secs(600));
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/trial").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(
            res.headers().get("Cache-Control").and_then(|v| v.to_str().ok()),
            Some("private, no-cache, must-revalidate")
        );
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["remainingSeconds"], 0);
        assert_eq!(body["expired"], true);
    }
}
