//! Driven port for payment checkout providers.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::checkout::{CheckoutSession, Plan, PaymentProvider};

define_port_error! {
    /// Errors raised while opening a checkout session.
    pub enum CheckoutGatewayError {
        /// The provider refused the session.
        Rejected { message: String } as Conflict =>
            "checkout rejected: {message}",
        /// The provider could not be reached.
        Transport { message: String } as ServiceUnavailable =>
            "checkout provider unreachable: {message}",
    }
}

/// Port for creating hosted checkout sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Open a checkout session for `plan` paid by `email`.
    async fn create_session(
        &self,
        provider: PaymentProvider,
        plan: &Plan,
        email: &str,
    ) -> Result<CheckoutSession, CheckoutGatewayError>;
}
