//! Subscription plans and hosted checkout sessions.
//!
//! Payments are never captured by this service: a checkout gateway returns a
//! session identifier and the URL the browser should be sent to.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::Error;
use super::contact::EmailAddress;
use super::ports::{CheckoutGateway, CheckoutGatewayError};

/// Currency used for every plan.
pub const CURRENCY: &str = "BRL";

/// Supported payment providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    Stripe,
    MercadoPago,
}

impl PaymentProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::MercadoPago => "mercado_pago",
        }
    }

    /// Prefix carried by simulated session identifiers.
    pub const fn session_prefix(self) -> &'static str {
        match self {
            Self::Stripe => "cs_sim_",
            Self::MercadoPago => "pref_sim_",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for provider names other than `stripe` and `mercado_pago`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for PaymentProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "stripe" => Ok(Self::Stripe),
            "mercado_pago" | "mercadopago" => Ok(Self::MercadoPago),
            _ => Err(UnknownProvider(s.to_owned())),
        }
    }
}

/// A purchasable plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: &'static str,
    pub name: &'static str,
    /// Price in centavos.
    pub amount_cents: u32,
}

/// The plan catalogue.
pub const PLANS: &[Plan] = &[
    Plan {
        id: "consulta-avulsa",
        name: "Consulta avulsa",
        amount_cents: 8_990,
    },
    Plan {
        id: "mensal",
        name: "Assinatura mensal",
        amount_cents: 4_990,
    },
    Plan {
        id: "familia",
        name: "Plano família",
        amount_cents: 12_990,
    },
];

/// Look up a plan by id.
pub fn find_plan(id: &str) -> Option<&'static Plan> {
    let id = id.trim();
    PLANS.iter().find(|plan| plan.id.eq_ignore_ascii_case(id))
}

/// Session returned by a checkout gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub provider: PaymentProvider,
    pub session_id: String,
    pub plan_id: String,
    pub amount_cents: u32,
    pub currency: String,
    pub redirect_url: String,
}

/// Checkout use-case: validate the order and delegate to the gateway.
#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn CheckoutGateway>,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn CheckoutGateway>) -> Self {
        Self { gateway }
    }

    /// Open a checkout session.
    ///
    /// # Errors
    /// `invalid_request` for an unknown plan or a malformed e-mail;
    /// `conflict` when the provider rejects the order; `service_unavailable`
    /// when it cannot be reached.
    pub async fn start(
        &self,
        provider: PaymentProvider,
        plan_id: &str,
        email: &str,
    ) -> Result<CheckoutSession, Error> {
        let plan = find_plan(plan_id).ok_or_else(|| {
            Error::invalid_request(format!("unknown plan: {}", plan_id.trim()))
        })?;
        let email = EmailAddress::new(email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        match self
            .gateway
            .create_session(provider, plan, email.as_str())
            .await
        {
            Ok(session) => {
                info!(%provider, plan = plan.id, session_id = %session.session_id, "checkout session created");
                Ok(session)
            }
            Err(err) => {
                warn!(%provider, error = %err, "checkout session failed");
                let code = err.error_code();
                let message = match err {
                    CheckoutGatewayError::Rejected { message } => message,
                    CheckoutGatewayError::Transport { .. } => {
                        "payment provider unavailable".to_owned()
                    }
                };
                Err(Error::new(code, message))
            }
        }
    }
}
