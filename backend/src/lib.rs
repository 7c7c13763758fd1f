//! Telehealth lead-generation back end.
//!
//! Hexagonal layout: `domain` holds the rules, `inbound` the HTTP and
//! WebSocket adapters, `outbound` the clients for external services.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
