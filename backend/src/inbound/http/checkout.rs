//! Checkout endpoints.
//!
//! ```text
//! GET  /api/v1/checkout/plans
//! POST /api/v1/checkout/stripe {"planId":"mensal","email":"ana@example.com"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::checkout::{CheckoutSession, PLANS, PaymentProvider, Plan};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/checkout/{provider}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[schema(example = "mensal")]
    pub plan_id: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
}

/// List purchasable plans.
#[utoipa::path(
    get,
    path = "/api/v1/checkout/plans",
    responses((status = 200, description = "Plan catalogue", body = [Plan])),
    tags = ["checkout"],
    operation_id = "listPlans",
    security([])
)]
#[get("/checkout/plans")]
pub async fn list_plans() -> web::Json<&'static [Plan]> {
    web::Json(PLANS)
}

/// Open a hosted checkout session with a payment provider.
#[utoipa::path(
    post,
    path = "/api/v1/checkout/{provider}",
    params(("provider" = String, Path, description = "`stripe` or `mercado_pago`")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout session", body = CheckoutSession),
        (status = 400, description = "Unknown plan or invalid e-mail", body = Error),
        (status = 404, description = "Unknown provider", body = Error),
        (status = 409, description = "Provider rejected the order", body = Error),
        (status = 503, description = "Provider unavailable", body = Error)
    ),
    tags = ["checkout"],
    operation_id = "startCheckout",
    security([])
)]
#[post("/checkout/{provider}")]
pub async fn start_checkout(
    state: web::Data<HttpState>,
    provider: web::Path<String>,
    payload: web::Json<CheckoutRequest>,
) -> ApiResult<web::Json<CheckoutSession>> {
    let provider: PaymentProvider = provider.parse::<PaymentProvider>().map_err(|err| {
        Error::not_found(err.to_string())
            .with_details(json!({ "supported": ["stripe", "mercado_pago"] }))
    })?;
    let CheckoutRequest { plan_id, email } = payload.into_inner();
    let session = state.checkout.start(provider, &plan_id, &email).await?;
    Ok(web::Json(session))
}
