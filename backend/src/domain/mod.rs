//! Domain primitives, services and ports.
//!
//! Purpose: hold every transport-agnostic rule of the telehealth site:
//! slugs and location paths, CRM validation, triage, checkout, the status
//! board, the trial countdown and the onboarding wizards. Adapters under
//! `inbound` and `outbound` depend on this module, never the reverse.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - TraceId — per-request correlation identifier.

pub mod audio;
pub mod auth;
pub mod checkout;
pub mod contact;
pub mod crm;
pub mod error;
pub mod jobs;
pub mod location;
pub mod onboarding;
pub mod patient;
pub mod playback;
pub mod ports;
pub mod site;
pub mod slug;
pub mod status;
pub mod trace_id;
pub mod trial;
pub mod triage;

pub use self::auth::{AdminCredentials, AdminCredentialsError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use telesaude::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
