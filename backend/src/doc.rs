//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the HTTP surface. It registers:
//!
//! - **Paths**: every REST endpoint under `/api/v1`, the content routes and
//!   the health checks
//! - **Schemas**: the shared [`Error`] payload; request and response bodies
//!   are collected from the path annotations
//! - **Security**: the session cookie carrying the admin flag, the trial
//!   countdown and wizard drafts
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::domain::{Error, ErrorCode};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/admin/login and the trial endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP surface.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Telesaúde API",
        description = "Back end for the telehealth site: CRM checks, triage chat, \
checkout sessions, the status board, onboarding and local landing pages.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::crm::lookup_crm,
        crate::inbound::http::triage::triage_chat,
        crate::inbound::http::trial::start_trial,
        crate::inbound::http::trial::get_trial,
        crate::inbound::http::checkout::list_plans,
        crate::inbound::http::checkout::start_checkout,
        crate::inbound::http::status::get_status,
        crate::inbound::http::onboarding::get_professional_wizard,
        crate::inbound::http::onboarding::submit_professional_step,
        crate::inbound::http::onboarding::professional_wizard_back,
        crate::inbound::http::onboarding::reset_professional_wizard,
        crate::inbound::http::onboarding::register_patient,
        crate::inbound::http::admin::admin_login,
        crate::inbound::http::admin::admin_logout,
        crate::inbound::http::admin::generate_seo_link,
        crate::inbound::http::admin::list_seo_permutations,
        crate::inbound::http::content::list_jobs,
        crate::inbound::http::content::get_job,
        crate::inbound::http::content::state_page,
        crate::inbound::http::content::city_page,
        crate::inbound::http::content::specialty_page,
        crate::inbound::http::content::legacy_tag_redirect,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "health", description = "Endpoints for health checks"),
        (name = "crm", description = "Medical licence lookups"),
        (name = "triage", description = "Symptom triage assistant"),
        (name = "trial", description = "Free trial countdown"),
        (name = "checkout", description = "Plans and payment sessions"),
        (name = "status", description = "External service status board"),
        (name = "onboarding", description = "Professional and patient sign-up"),
        (name = "admin", description = "Administrator tools"),
        (name = "content", description = "Job board and local landing pages")
    )
)]
pub struct ApiDoc;
