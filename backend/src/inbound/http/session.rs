//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Everything the browser used to keep in component state lives in the
//! signed session cookie: the admin flag, the trial start instant and the
//! onboarding wizard draft.

use std::time::Duration;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::domain::Error;
use crate::domain::onboarding::ProfessionalWizard;
use crate::domain::trial::TrialSession;

pub(crate) const ADMIN_KEY: &str = "admin";
pub(crate) const TRIAL_STARTED_AT_KEY: &str = "trial_started_at";
pub(crate) const PROFESSIONAL_WIZARD_KEY: &str = "professional_wizard";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        match self.0.get::<T>(key) {
            Ok(value) => Ok(value),
            Err(error) => {
                warn!(key, %error, "discarding unreadable session entry");
                self.0.remove(key);
                Ok(None)
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Flag the session as belonging to the administrator.
    pub fn persist_admin(&self) -> Result<(), Error> {
        self.0.renew();
        self.write(ADMIN_KEY, &true)
    }

    pub fn is_admin(&self) -> Result<bool, Error> {
        Ok(self.read::<bool>(ADMIN_KEY)?.unwrap_or(false))
    }

    /// Require the admin flag or return `401 Unauthorized`.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin()? {
            Ok(())
        } else {
            Err(Error::unauthorized("admin login required"))
        }
    }

    /// Drop the admin flag; the trial clock and wizard draft stay.
    pub fn revoke_admin(&self) {
        self.0.renew();
        self.0.remove(ADMIN_KEY);
    }

    /// Trial started in this session, if any.
    pub fn trial(&self, duration: Duration) -> Result<Option<TrialSession>, Error> {
        Ok(self
            .read::<DateTime<Utc>>(TRIAL_STARTED_AT_KEY)?
            .map(|started_at| TrialSession::start(started_at, duration)))
    }

    /// Start the trial at `now` unless one is already running.
    pub fn start_trial(&self, now: DateTime<Utc>, duration: Duration) -> Result<TrialSession, Error> {
        if let Some(existing) = self.trial(duration)? {
            return Ok(existing);
        }
        self.write(TRIAL_STARTED_AT_KEY, &now)?;
        Ok(TrialSession::start(now, duration))
    }

    /// Stored wizard, or a fresh one.
    pub fn professional_wizard(&self) -> Result<ProfessionalWizard, Error> {
        Ok(self
            .read::<ProfessionalWizard>(PROFESSIONAL_WIZARD_KEY)?
            .unwrap_or_default())
    }

    pub fn persist_professional_wizard(&self, wizard: &ProfessionalWizard) -> Result<(), Error> {
        self.write(PROFESSIONAL_WIZARD_KEY, wizard)
    }

    pub fn reset_professional_wizard(&self) {
        self.0.remove(PROFESSIONAL_WIZARD_KEY);
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_timestamp;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::TimeDelta;

    const TRIAL: Duration = Duration::from_secs(300);

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().wrap(crate::inbound::http::test_utils::test_session_middleware())
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(Cookie::into_owned)
            .expect("session cookie set")
    }

    #[actix_web::test]
    async fn admin_flag_round_trips() {
        let app = test::init_service(
            session_test_app()
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_admin()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/admin",
                    web::get().to(|session: SessionContext| async move {
                        session.require_admin()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/admin").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let login = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&login);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/admin").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn revoking_admin_keeps_trial_clock() {
        let app = test::init_service(
            session_test_app()
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        session.start_trial(fixture_timestamp(), TRIAL)?;
                        session.persist_admin()?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route(
                    "/logout",
                    web::get().to(|session: SessionContext| async move {
                        session.revoke_admin();
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/state",
                    web::get().to(|session: SessionContext| async move {
                        let trial = session.trial(TRIAL)?.map(|trial| trial.started_at);
                        let body = format!("{}|{:?}", session.is_admin()?, trial);
                        Ok::<_, Error>(HttpResponse::Ok().body(body))
                    }),
                ),
        )
        .await;

        let login = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let logout = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/logout")
                .cookie(session_cookie(&login))
                .to_request(),
        )
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/state")
                .cookie(session_cookie(&logout))
                .to_request(),
        )
        .await;
        assert_eq!(
            test::read_body(res).await,
            format!("false|{:?}", Some(fixture_timestamp()))
        );
    }

    #[actix_web::test]
    async fn trial_start_is_idempotent() {
        let app = test::init_service(session_test_app().route(
            "/trial/{offset}",
            web::get().to(|session: SessionContext, offset: web::Path<i64>| async move {
                let now = fixture_timestamp() + TimeDelta::seconds(offset.into_inner());
                let trial = session.start_trial(now, TRIAL)?;
                Ok::<_, Error>(HttpResponse::Ok().body(trial.started_at.to_rfc3339()))
            }),
        ))
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/trial/0").to_request()).await;
        let cookie = session_cookie(&first);
        let first_body = test::read_body(first).await;

        let second = test::call_service(
            &app,
            test::TestRequest::get().uri("/trial/120").cookie(cookie).to_request(),
        )
        .await;
        let second_body = test::read_body(second).await;
        assert_eq!(first_body, second_body);
        assert_eq!(first_body, fixture_timestamp().to_rfc3339());
    }

    #[actix_web::test]
    async fn tampered_wizard_falls_back_to_fresh_state() {
        let app = test::init_service(
            session_test_app()
                .route(
                    "/tamper",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(PROFESSIONAL_WIZARD_KEY, "not a wizard")
                            .expect("insert raw value");
                        HttpResponse::Ok()
                    }),
                )
                .route(
                    "/wizard",
                    web::get().to(|session: SessionContext| async move {
                        let wizard = session.professional_wizard()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(wizard.step().to_string()))
                    }),
                ),
        )
        .await;

        let tamper = test::call_service(&app, test::TestRequest::get().uri("/tamper").to_request()).await;
        let cookie = session_cookie(&tamper);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/wizard").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "personal");
    }
}
