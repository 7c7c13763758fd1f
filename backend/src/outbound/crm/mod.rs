//! CRM registry outbound adapters.
//!
//! Provides a reqwest implementation of the `CrmLookup` port. Deployments
//! without an API key use `SimulatedCrmLookup` from the domain instead.

mod dto;
mod http_lookup;

pub use http_lookup::CrmHttpLookup;
