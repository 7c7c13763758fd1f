//! Simulated payment provider.
//!
//! No network call is made: each provider gets an identifier with its own
//! prefix and the browser is sent to a confirmation page on the site.

use async_trait::async_trait;
use reqwest::Url;
use tracing::info;
use uuid::Uuid;

use crate::domain::checkout::{CURRENCY, CheckoutSession, PaymentProvider, Plan};
use crate::domain::ports::{CheckoutGateway, CheckoutGatewayError};
use crate::domain::site::site_url;

const CONFIRMATION_PATH: &str = "/checkout/simulado";

/// `CheckoutGateway` that fabricates sessions locally.
#[derive(Debug, Clone)]
pub struct SimulatedCheckoutGateway {
    public_base_url: Url,
}

impl SimulatedCheckoutGateway {
    pub fn new(public_base_url: Url) -> Self {
        Self { public_base_url }
    }

    fn redirect_url(
        &self,
        provider: PaymentProvider,
        session_id: &str,
    ) -> Result<Url, CheckoutGatewayError> {
        let mut url = site_url(&self.public_base_url, CONFIRMATION_PATH)
            .map_err(|error| CheckoutGatewayError::rejected(error.to_string()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("session", session_id);
        Ok(url)
    }
}

#[async_trait]
impl CheckoutGateway for SimulatedCheckoutGateway {
    async fn create_session(
        &self,
        provider: PaymentProvider,
        plan: &Plan,
        _email: &str,
    ) -> Result<CheckoutSession, CheckoutGatewayError> {
        let session_id = format!("{}{}", provider.session_prefix(), Uuid::new_v4().simple());
        let redirect_url = self.redirect_url(provider, &session_id)?;
        info!(%provider, plan = plan.id, %session_id, "simulated checkout session");
        Ok(CheckoutSession {
            provider,
            session_id,
            plan_id: plan.id.to_owned(),
            amount_cents: plan.amount_cents,
            currency: CURRENCY.to_owned(),
            redirect_url: redirect_url.into(),
        })
    }
}
