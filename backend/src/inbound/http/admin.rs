//! Admin login and the local-SEO link generator.
//!
//! ```text
//! POST /api/v1/admin/login {"username":"admin","password":"s3cret"}
//! POST /api/v1/admin/logout
//! POST /api/v1/admin/seo-links {"state":"SP","city":"Campinas","specialty":"Cardiologia"}
//! GET  /api/v1/admin/seo-links/permutations?state=SP
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::domain::location::{LocationError, StateCode, UserLocation, permutations, sync_path};
use crate::domain::site::site_url;
use crate::domain::{AdminCredentials, AdminCredentialsError, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/admin/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<AdminLoginRequest> for AdminCredentials {
    type Error = AdminCredentialsError;

    fn try_from(value: AdminLoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_credentials_error(err: AdminCredentialsError) -> Error {
    match err {
        AdminCredentialsError::EmptyUsername => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        AdminCredentialsError::EmptyPassword => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate the administrator and flag the session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Admin login is not configured", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<HttpResponse> {
    let Some(configured) = state.admin.as_ref() else {
        return Err(Error::service_unavailable("admin login is disabled"));
    };
    let submitted =
        AdminCredentials::try_from(payload.into_inner()).map_err(map_credentials_error)?;
    if !configured.matches(&submitted) {
        warn!("rejected admin login");
        return Err(Error::unauthorized("invalid credentials"));
    }
    session.persist_admin()?;
    info!("admin logged in");
    Ok(HttpResponse::Ok().finish())
}

/// Drop admin rights from the session; the trial countdown keeps running.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses((status = 204, description = "Admin flag removed")),
    tags = ["admin"],
    operation_id = "adminLogout"
)]
#[post("/admin/logout")]
pub async fn admin_logout(session: SessionContext) -> HttpResponse {
    session.revoke_admin();
    HttpResponse::NoContent().finish()
}

/// Location selection for `POST /api/v1/admin/seo-links`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeoLinkRequest {
    #[schema(example = "SP")]
    pub state: String,
    #[schema(example = "Campinas")]
    pub city: String,
    #[serde(default)]
    #[schema(example = "Cardiologia")]
    pub specialty: Option<String>,
    /// Path currently shown in the address bar.
    #[serde(default)]
    #[schema(example = "/atendimento/sp/campinas")]
    pub current_path: Option<String>,
}

/// Generated landing page link.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeoLinkResponse {
    #[schema(example = "/atendimento/sp/campinas/cardiologia")]
    pub path: String,
    #[schema(example = "https://www.telesaude.example/atendimento/sp/campinas/cardiologia")]
    pub url: String,
    /// `true` when the client should push `path` onto its history.
    pub changed: bool,
    pub headline: String,
}

fn map_location_error(err: LocationError) -> Error {
    let field = match err {
        LocationError::InvalidState(_) => "state",
        LocationError::EmptyCity => "city",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Build the canonical landing page link for a location.
#[utoipa::path(
    post,
    path = "/api/v1/admin/seo-links",
    request_body = SeoLinkRequest,
    responses(
        (status = 200, description = "Generated link", body = SeoLinkResponse),
        (status = 400, description = "Invalid selection", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "generateSeoLink"
)]
#[post("/admin/seo-links")]
pub async fn generate_seo_link(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SeoLinkRequest>,
) -> ApiResult<web::Json<SeoLinkResponse>> {
    session.require_admin()?;
    let request = payload.into_inner();
    let location =
        UserLocation::from_selection(&request.state, &request.city, request.specialty.as_deref())
            .map_err(map_location_error)?;
    let update = sync_path(request.current_path.as_deref(), &location);
    let url = site_url(&state.public_base_url, &update.path)
        .map_err(|err| Error::internal(format!("failed to build link: {err}")))?;
    Ok(web::Json(SeoLinkResponse {
        path: update.path,
        url: url.into(),
        changed: update.changed,
        headline: location.copy().headline,
    }))
}

/// Filter for the permutation list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PermutationQuery {
    /// UF code; omitted or `brasil` lists every state.
    #[param(example = "SP")]
    pub state: Option<String>,
}

/// Every city × specialty landing page path.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermutationsResponse {
    pub count: usize,
    pub paths: Vec<String>,
}

/// List landing page paths for every known city and specialty.
#[utoipa::path(
    get,
    path = "/api/v1/admin/seo-links/permutations",
    params(PermutationQuery),
    responses(
        (status = 200, description = "Landing page paths", body = PermutationsResponse),
        (status = 400, description = "Unknown state", body = Error),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listSeoPermutations"
)]
#[get("/admin/seo-links/permutations")]
pub async fn list_seo_permutations(
    session: SessionContext,
    query: web::Query<PermutationQuery>,
) -> ApiResult<web::Json<PermutationsResponse>> {
    session.require_admin()?;
    let state = query
        .state
        .as_deref()
        .map(str::parse::<StateCode>)
        .transpose()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let paths = permutations(state);
    Ok(web::Json(PermutationsResponse {
        count: paths.len(),
        paths,
    }))
}
