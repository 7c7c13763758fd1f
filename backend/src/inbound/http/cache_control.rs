//! Cache policies for session-bound responses.
//!
//! Trial countdowns, wizard drafts and the status board change between
//! requests and depend on the caller's cookie, so shared caches must not
//! store them.

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Header pair for responses tied to the caller's session.
pub const fn private_no_cache_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
