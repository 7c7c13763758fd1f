//! CRM lookup endpoint.
//!
//! ```text
//! GET /api/v1/crm/SP/123456
//! ```

use actix_web::{get, web};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::crm::{CrmQuery, CrmRecord, CrmValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Registry record returned to the browser.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrmRecordResponse {
    #[schema(example = "SP")]
    pub uf: String,
    #[schema(example = "123456")]
    pub number: String,
    #[schema(example = "Dr. Simulado da Silva")]
    pub name: String,
    #[schema(example = "Ativo")]
    pub status: String,
    pub active: bool,
    pub specialties: Vec<String>,
}

impl CrmRecordResponse {
    fn new(query: &CrmQuery, record: CrmRecord) -> Self {
        Self {
            uf: query.uf.to_string(),
            number: query.number.to_string(),
            active: record.is_active(),
            name: record.name,
            status: record.status,
            specialties: record.specialties,
        }
    }
}

pub(crate) fn map_crm_validation_error(err: CrmValidationError) -> Error {
    let field = match err {
        CrmValidationError::InvalidNumber => "number",
        CrmValidationError::InvalidState(_) | CrmValidationError::NationwideState => "uf",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Look up a medical licence in the regional council registry.
#[utoipa::path(
    get,
    path = "/api/v1/crm/{uf}/{number}",
    params(
        ("uf" = String, Path, description = "Issuing state (UF)", example = "SP"),
        ("number" = String, Path, description = "CRM number", example = "123456")
    ),
    responses(
        (status = 200, description = "Registry record", body = CrmRecordResponse),
        (status = 400, description = "Invalid UF or number", body = Error),
        (status = 404, description = "No registration found", body = Error),
        (status = 503, description = "Registry unavailable", body = Error)
    ),
    tags = ["crm"],
    operation_id = "lookupCrm",
    security([])
)]
#[get("/crm/{uf}/{number}")]
pub async fn lookup_crm(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<CrmRecordResponse>> {
    let (uf, number) = path.into_inner();
    let query = CrmQuery::try_from_parts(&uf, &number).map_err(map_crm_validation_error)?;
    let record = state.onboarding.lookup(&query).await?;
    Ok(web::Json(CrmRecordResponse::new(&query, record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CrmLookupError, MockCrmLookup};
    use crate::inbound::http::test_utils::{state_from, test_ports, test_state};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    async fn get(state: HttpState, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(lookup_crm)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        let body: Value = test::read_body_json(res).await;
        (status, body)
    }

    #[actix_web::test]
    async fn simulated_registry_resolves_known_number() {
        let (state, _) = test_state();
        let (status, body) = get(state, "/api/v1/crm/sp/123456").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["uf"], "SP");
        assert_eq!(body["active"], true);
        assert_eq!(body["specialties"].as_array().map(Vec::len), Some(2));
    }

    #[rstest]
    #[case::unknown_number("/api/v1/crm/SP/999999", StatusCode::NOT_FOUND, "not_found")]
    #[case::letters("/api/v1/crm/SP/12ab", StatusCode::NOT_FOUND, "not_found")]
    #[case::too_many_digits("/api/v1/crm/SP/123456789", StatusCode::NOT_FOUND, "not_found")]
    #[case::blank_number("/api/v1/crm/SP/%20", StatusCode::BAD_REQUEST, "invalid_request")]
    #[case::nationwide("/api/v1/crm/brasil/123456", StatusCode::BAD_REQUEST, "invalid_request")]
    #[case::unknown_uf("/api/v1/crm/XX/123456", StatusCode::BAD_REQUEST, "invalid_request")]
    #[actix_web::test]
    async fn failures_map_to_error_payloads(
        #[case] uri: &str,
        #[case] expected_status: StatusCode,
        #[case] expected_code: &str,
    ) {
        let (state, _) = test_state();
        let (status, body) = get(state, uri).await;
        assert_eq!(status, expected_status);
        assert_eq!(body["code"], expected_code);
    }

    #[actix_web::test]
    async fn registry_outage_is_service_unavailable() {
        let mut crm = MockCrmLookup::new();
        crm.expect_lookup()
            .times(1)
            .returning(|_| Err(CrmLookupError::transport("connection reset")));
        let (mut ports, _) = test_ports();
        ports.crm = Arc::new(crm);
        let state = state_from(ports);

        let (status, body) = get(state, "/api/v1/crm/RJ/42").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "service_unavailable");
    }
}
