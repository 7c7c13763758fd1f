//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every external collaborator (CRM registry, generative model, payment
//! provider, status check) sits behind one of these traits so services and
//! handlers can be exercised with fixtures or mocks.

mod macros;
pub(crate) use macros::define_port_error;

mod checkout_gateway;
mod crm_lookup;
mod generative_model;
mod status_check;

#[cfg(test)]
pub use checkout_gateway::MockCheckoutGateway;
pub use checkout_gateway::{CheckoutGateway, CheckoutGatewayError};
#[cfg(test)]
pub use crm_lookup::MockCrmLookup;
pub use crm_lookup::{CrmLookup, CrmLookupError, SIMULATED_CRM_NUMBER, SimulatedCrmLookup};
#[cfg(test)]
pub use generative_model::MockGenerativeModel;
pub use generative_model::{
    GenerationRequest, GenerativeModel, GenerativeModelError, UnconfiguredModel,
};
#[cfg(test)]
pub use status_check::MockStatusCheck;
pub use status_check::StatusCheck;
