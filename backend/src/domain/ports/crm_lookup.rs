//! Driven port for medical licence registry lookups.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::crm::{ACTIVE_STATUS, CrmQuery, CrmRecord};

define_port_error! {
    /// Errors raised while consulting the CRM registry.
    pub enum CrmLookupError {
        /// The registry has no entry for the number in that state.
        NotFound { message: String } as NotFound =>
            "CRM not found: {message}",
        /// The registry rejected our credentials.
        Unauthorized { message: String } as ServiceUnavailable =>
            "CRM registry rejected credentials: {message}",
        /// The registry could not be reached or failed.
        Transport { message: String } as ServiceUnavailable =>
            "CRM registry request failed: {message}",
        /// The registry answered with an unexpected payload.
        Decode { message: String } as ServiceUnavailable =>
            "CRM registry response could not be decoded: {message}",
    }
}

/// Port for validating a professional's licence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmLookup: Send + Sync {
    /// Fetch the registry record for `query`.
    async fn lookup(&self, query: &CrmQuery) -> Result<CrmRecord, CrmLookupError>;
}

/// Number the simulated registry knows about.
pub const SIMULATED_CRM_NUMBER: &str = "123456";

/// Canned registry used when no API key is configured.
///
/// Only [`SIMULATED_CRM_NUMBER`] resolves, in any state, to an active
/// record with two specialties. Every other number is `NotFound`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedCrmLookup;

#[async_trait]
impl CrmLookup for SimulatedCrmLookup {
    async fn lookup(&self, query: &CrmQuery) -> Result<CrmRecord, CrmLookupError> {
        if query.number.as_str() == SIMULATED_CRM_NUMBER {
            Ok(CrmRecord {
                name: "Dr. Simulado da Silva".to_owned(),
                status: ACTIVE_STATUS.to_owned(),
                specialties: vec!["Clínica Médica".to_owned(), "Cardiologia".to_owned()],
            })
        } else {
            Err(CrmLookupError::not_found(query.to_string()))
        }
    }
}
