//! Status board endpoint.

use actix_web::{HttpResponse, get, web};

use crate::domain::status::StatusSnapshot;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::state::HttpState;

/// Latest health of the services the site depends on.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses((status = 200, description = "Status snapshot", body = StatusSnapshot)),
    tags = ["status"],
    operation_id = "getStatus",
    security([])
)]
#[get("/status")]
pub async fn get_status(state: web::Data<HttpState>) -> HttpResponse {
    let snapshot = state.status_board.snapshot().await;
    HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockStatusCheck;
    use crate::domain::status::{ServiceHealth, ServiceStatus, ServiceTarget};
    use crate::inbound::http::test_utils::test_state;
    use crate::test_support::fixture_timestamp;
    use actix_web::{App, test};
    use serde_json::Value;
    use url::Url;

    #[actix_web::test]
    async fn reports_worst_health_across_services() {
        let (state, _) = test_state();
        let mut checker = MockStatusCheck::new();
        checker.expect_check().returning(|target| ServiceStatus {
            name: target.name.clone(),
            health: if target.name == "pagamentos" {
                ServiceHealth::Degraded
            } else {
                ServiceHealth::Operational
            },
            latency_ms: Some(12),
            checked_at: fixture_timestamp(),
            detail: None,
        });
        let targets = ["gemini", "pagamentos"]
            .into_iter()
            .map(|name| ServiceTarget {
                name: name.to_owned(),
                url: Url::parse(&format!("https://{name}.example/health")).expect("url"),
            })
            .collect::<Vec<_>>();
        state.status_board.refresh(&checker, &targets).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(get_status)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/status").to_request()).await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["overall"], "degraded");
        assert_eq!(body["services"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn empty_board_is_operational() {
        let (state, _) = test_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(get_status)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/api/v1/status").to_request()).await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["overall"], "operational");
        assert_eq!(body["services"], serde_json::json!([]));
    }
}
