//! Wizard and patient endpoints over a cookie session.

use super::*;
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::test_utils::{session_cookie, test_session_middleware, test_state};
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test};
use rstest::rstest;
use serde_json::{Value, json};

fn onboarding_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let (state, _) = test_state();
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(get_professional_wizard)
                .service(submit_professional_step)
                .service(professional_wizard_back)
                .service(reset_professional_wizard)
                .service(register_patient),
        )
}

/// Send a request, carrying the cookie forward when the server refreshes it.
async fn send<S>(app: &S, req: test::TestRequest, cookie: &mut Option<Cookie<'static>>) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = match cookie.clone() {
        Some(value) => req.cookie(value),
        None => req,
    };
    let res = test::call_service(app, req.to_request()).await;
    if let Some(fresh) = session_cookie(&res) {
        *cookie = Some(fresh);
    }
    let status = res.status();
    let body = test::read_body(res).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

fn step(body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/onboarding/professional/steps")
        .set_json(body)
}

fn personal() -> Value {
    json!({"step": "personal", "name": "Ana Souza", "email": "ana@example.com", "phone": "11987654321"})
}

#[actix_web::test]
async fn wizard_completes_across_requests() {
    let app = test::init_service(onboarding_app()).await;
    let mut cookie = None;

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/onboarding/professional"),
        &mut cookie,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "personal");

    let (_, body) = send(&app, step(personal()), &mut cookie).await;
    assert_eq!(body["step"], "credentials");

    let (_, body) = send(
        &app,
        step(json!({"step": "credentials", "uf": "MG", "crmNumber": "123456"})),
        &mut cookie,
    )
    .await;
    assert_eq!(body["step"], "specialties");
    assert_eq!(body["offeredSpecialties"][0], "Clínica Médica");

    let (_, body) = send(
        &app,
        step(json!({"step": "specialties", "specialties": ["cardiologia"]})),
        &mut cookie,
    )
    .await;
    assert_eq!(body["step"], "review");

    let (status, body) = send(
        &app,
        step(json!({"step": "review", "acceptTerms": true})),
        &mut cookie,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "completed");
    assert_eq!(body["wizard"]["profile"]["status"], "pending_review");
    assert_eq!(body["wizard"]["profile"]["specialties"], json!(["Cardiologia"]));
}

#[rstest]
#[case::skipping_ahead(json!({"step": "review", "acceptTerms": true}), StatusCode::CONFLICT)]
#[case::invalid_email(
    json!({"step": "personal", "name": "Ana", "email": "ana", "phone": "11987654321"}),
    StatusCode::BAD_REQUEST
)]
#[case::unknown_step(json!({"step": "payment"}), StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn bad_first_steps_are_refused(#[case] body: Value, #[case] expected: StatusCode) {
    let app = test::init_service(onboarding_app()).await;
    let mut cookie = None;
    let (status, _) = send(&app, step(body), &mut cookie).await;
    assert_eq!(status, expected);
}

#[actix_web::test]
async fn unknown_crm_number_is_not_found_and_keeps_step() {
    let app = test::init_service(onboarding_app()).await;
    let mut cookie = None;
    send(&app, step(personal()), &mut cookie).await;

    let (status, body) = send(
        &app,
        step(json!({"step": "credentials", "uf": "SP", "crmNumber": "999"})),
        &mut cookie,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/onboarding/professional"),
        &mut cookie,
    )
    .await;
    assert_eq!(body["step"], "credentials");
}

#[actix_web::test]
async fn back_and_reset() {
    let app = test::init_service(onboarding_app()).await;
    let mut cookie = None;
    send(&app, step(personal()), &mut cookie).await;

    let back = || test::TestRequest::post().uri("/api/v1/onboarding/professional/back");
    let (status, body) = send(&app, back(), &mut cookie).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "personal");
    assert_eq!(body["wizard"]["personal"]["name"], "Ana Souza");

    let (status, _) = send(&app, back(), &mut cookie).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri("/api/v1/onboarding/professional"),
        &mut cookie,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/onboarding/professional"),
        &mut cookie,
    )
    .await;
    assert_eq!(body["wizard"].get("personal"), None);
}

fn patient(overrides: Value) -> Value {
    let mut body = json!({
        "name": "João da Silva",
        "email": "joao@example.com",
        "phone": "(21) 99876-5432",
        "birthDate": "1990-07-15",
        "state": "RJ",
        "city": "Niterói",
        "consent": true
    });
    if let (Some(target), Some(source)) = (body.as_object_mut(), overrides.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    body
}

#[actix_web::test]
async fn registers_patient() {
    let app = test::init_service(onboarding_app()).await;
    let mut cookie = None;
    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/patients").set_json(patient(json!({}))),
        &mut cookie,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phone"], "21998765432");
    assert_eq!(body["state"], "RJ");
    assert_eq!(body["birthDate"], "1990-07-15");
    assert!(body["id"].as_str().is_some_and(|id| Uuid::parse_str(id).is_ok()));
}

#[rstest]
#[case::future_birth(json!({"birthDate": "2027-01-01"}))]
#[case::no_consent(json!({"consent": false}))]
#[case::short_phone(json!({"phone": "9876-5432"}))]
#[case::nationwide(json!({"state": "Brasil"}))]
#[actix_web::test]
async fn invalid_patients_are_rejected(#[case] overrides: Value) {
    let app = test::init_service(onboarding_app()).await;
    let mut cookie = None;
    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/api/v1/patients").set_json(patient(overrides)),
        &mut cookie,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}
