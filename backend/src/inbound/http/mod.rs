//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod cache_control;
pub mod checkout;
pub mod content;
pub mod crm;
pub mod error;
pub mod health;
pub mod onboarding;
pub mod session;
pub mod state;
pub mod status;
#[cfg(test)]
pub mod test_utils;
pub mod triage;
pub mod trial;

pub use error::ApiResult;
