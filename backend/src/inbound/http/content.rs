//! Content routes outside `/api/v1`.
//!
//! ```text
//! GET /carreiras
//! GET /vagas/{slug}
//! GET /atendimento/{state}[/{city}[/{specialty}]]
//! GET /tag/{anything}   -> 301 /
//! ```
//!
//! These routes return page context as JSON; rendering is the client's job.

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::jobs::{JOB_OPPORTUNITIES, JobOpportunity, find_job};
use crate::domain::location::{LocationError, UserLocation};
use crate::inbound::http::ApiResult;

/// Open positions.
#[utoipa::path(
    get,
    path = "/carreiras",
    responses((status = 200, description = "Job openings", body = [JobOpportunity])),
    tags = ["content"],
    operation_id = "listJobs",
    security([])
)]
#[get("/carreiras")]
pub async fn list_jobs() -> web::Json<&'static [JobOpportunity]> {
    web::Json(JOB_OPPORTUNITIES)
}

/// One opening by slug.
#[utoipa::path(
    get,
    path = "/vagas/{slug}",
    params(("slug" = String, Path, description = "Opening slug")),
    responses(
        (status = 200, description = "Job opening", body = JobOpportunity),
        (status = 404, description = "No such opening", body = Error)
    ),
    tags = ["content"],
    operation_id = "getJob",
    security([])
)]
#[get("/vagas/{slug}")]
pub async fn get_job(slug: web::Path<String>) -> ApiResult<web::Json<&'static JobOpportunity>> {
    find_job(&slug)
        .map(web::Json)
        .ok_or_else(|| Error::not_found(format!("job '{}' not found", slug.as_str())))
}

/// Context for a local landing page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPage {
    #[schema(example = "/atendimento/sp/campinas/cardiologia")]
    pub canonical_path: String,
    #[schema(example = "Campinas")]
    pub city: String,
    #[schema(example = "SP")]
    pub state: String,
    #[schema(example = "São Paulo")]
    pub state_name: String,
    pub specialty: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub headline: String,
    pub subheadline: String,
}

impl From<UserLocation> for LocationPage {
    fn from(location: UserLocation) -> Self {
        let copy = location.copy();
        Self {
            canonical_path: location.canonical_path(),
            state: location.state.to_string(),
            state_name: location.state.name().to_owned(),
            city: location.city,
            specialty: location.specialty,
            lat: location.lat,
            lng: location.lng,
            headline: copy.headline,
            subheadline: copy.subheadline,
        }
    }
}

fn location_page(
    state: &str,
    city: Option<&str>,
    specialty: Option<&str>,
) -> ApiResult<web::Json<LocationPage>> {
    let location =
        UserLocation::from_path_segments(state, city, specialty).map_err(|err| match err {
            LocationError::InvalidState(_) | LocationError::EmptyCity => {
                Error::not_found(err.to_string())
            }
        })?;
    Ok(web::Json(LocationPage::from(location)))
}

/// Landing page for a state capital (or the nationwide page for `brasil`).
#[utoipa::path(
    get,
    path = "/atendimento/{state}",
    params(("state" = String, Path, description = "UF code or `brasil`", example = "sp")),
    responses(
        (status = 200, description = "Page context", body = LocationPage),
        (status = 404, description = "Unknown state", body = Error)
    ),
    tags = ["content"],
    operation_id = "stateLocationPage",
    security([])
)]
#[get("/atendimento/{state}")]
pub async fn state_page(path: web::Path<String>) -> ApiResult<web::Json<LocationPage>> {
    location_page(&path, None, None)
}

/// Landing page for a city.
#[utoipa::path(
    get,
    path = "/atendimento/{state}/{city}",
    params(
        ("state" = String, Path, description = "UF code or `brasil`", example = "sp"),
        ("city" = String, Path, description = "City slug", example = "campinas")
    ),
    responses(
        (status = 200, description = "Page context", body = LocationPage),
        (status = 404, description = "Unknown state", body = Error)
    ),
    tags = ["content"],
    operation_id = "cityLocationPage",
    security([])
)]
#[get("/atendimento/{state}/{city}")]
pub async fn city_page(path: web::Path<(String, String)>) -> ApiResult<web::Json<LocationPage>> {
    let (state, city) = path.into_inner();
    location_page(&state, Some(&city), None)
}

/// Landing page for a specialty in a city.
#[utoipa::path(
    get,
    path = "/atendimento/{state}/{city}/{specialty}",
    params(
        ("state" = String, Path, description = "UF code or `brasil`", example = "sp"),
        ("city" = String, Path, description = "City slug", example = "campinas"),
        ("specialty" = String, Path, description = "Specialty slug", example = "cardiologia")
    ),
    responses(
        (status = 200, description = "Page context", body = LocationPage),
        (status = 404, description = "Unknown state", body = Error)
    ),
    tags = ["content"],
    operation_id = "specialtyLocationPage",
    security([])
)]
#[get("/atendimento/{state}/{city}/{specialty}")]
pub async fn specialty_page(
    path: web::Path<(String, String, String)>,
) -> ApiResult<web::Json<LocationPage>> {
    let (state, city, specialty) = path.into_inner();
    location_page(&state, Some(&city), Some(&specialty))
}

/// Retired tag archive; everything goes home.
#[utoipa::path(
    get,
    path = "/tag/{tail}",
    params(("tail" = String, Path, description = "Any legacy tag path")),
    responses((status = 301, description = "Redirect to the home page")),
    tags = ["content"],
    operation_id = "legacyTagRedirect",
    security([])
)]
#[get("/tag/{tail:.*}")]
pub async fn legacy_tag_redirect() -> HttpResponse {
    HttpResponse::MovedPermanently()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    fn content_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .service(list_jobs)
            .service(get_job)
            .service(state_page)
            .service(city_page)
            .service(specialty_page)
            .service(legacy_tag_redirect)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(content_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn lists_and_finds_jobs() {
        let (status, body) = get_json("/carreiras").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(JOB_OPPORTUNITIES.len()));

        let (status, body) = get_json("/vagas/psicologo-clinico").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "part_time");

        let (status, body) = get_json("/vagas/astronauta").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[rstest]
    #[case::state("/atendimento/rj", "Rio de Janeiro", "/atendimento/rj/rio-de-janeiro")]
    #[case::state_capital("/atendimento/mg", "Belo Horizonte", "/atendimento/mg/belo-horizonte")]
    #[case::known_city("/atendimento/SP/sao-paulo", "São Paulo", "/atendimento/sp/sao-paulo")]
    #[case::unknown_city("/atendimento/mg/montes-claros", "Montes Claros", "/atendimento/mg/montes-claros")]
    #[case::nationwide("/atendimento/brasil", "Brasil", "/atendimento/brasil/brasil")]
    #[actix_web::test]
    async fn location_pages_resolve_segments(
        #[case] uri: &str,
        #[case] city: &str,
        #[case] canonical: &str,
    ) {
        let (status, body) = get_json(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["city"], city);
        assert_eq!(body["canonicalPath"], canonical);
    }

    #[actix_web::test]
    async fn specialty_page_restores_display_names() {
        let (status, body) = get_json("/atendimento/sp/campinas/clinica-medica").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["specialty"], "Clínica Médica");
        assert_eq!(body["headline"], "Clínica Médica online em Campinas");
        assert!(body["lat"].is_number());
    }

    #[actix_web::test]
    async fn unknown_state_is_not_found() {
        let (status, body) = get_json("/atendimento/xx/campinas").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[rstest]
    #[case("/tag/telemedicina")]
    #[case("/tag/saude/mental")]
    #[actix_web::test]
    async fn legacy_tags_redirect_home(#[case] uri: &str) {
        let app = test::init_service(content_app()).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/")
        );
    }
}
