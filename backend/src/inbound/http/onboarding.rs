//! Onboarding endpoints for professionals and patients.
//!
//! ```text
//! GET    /api/v1/onboarding/professional
//! POST   /api/v1/onboarding/professional/steps {"step":"personal","name":"Ana","email":"ana@example.com","phone":"11987654321"}
//! POST   /api/v1/onboarding/professional/back
//! DELETE /api/v1/onboarding/professional
//! POST   /api/v1/patients
//! ```
//!
//! The professional wizard draft lives in the session cookie, so each
//! browser walks its own wizard without server-side storage.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::onboarding::{ProfessionalStep, ProfessionalStepInput, ProfessionalWizard};
use crate::domain::patient::{PatientProfile, PatientRegistration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Step payload for `POST /api/v1/onboarding/professional/steps`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ProfessionalStepBody {
    Personal {
        name: String,
        email: String,
        phone: String,
    },
    Credentials {
        #[schema(example = "SP")]
        uf: String,
        #[serde(rename = "crmNumber")]
        #[schema(example = "123456")]
        crm_number: String,
    },
    Specialties {
        specialties: Vec<String>,
    },
    Review {
        #[serde(rename = "acceptTerms")]
        accept_terms: bool,
    },
}

impl From<ProfessionalStepBody> for ProfessionalStepInput {
    fn from(value: ProfessionalStepBody) -> Self {
        match value {
            ProfessionalStepBody::Personal { name, email, phone } => {
                Self::Personal { name, email, phone }
            }
            ProfessionalStepBody::Credentials { uf, crm_number } => {
                Self::Credentials { uf, crm_number }
            }
            ProfessionalStepBody::Specialties { specialties } => Self::Specialties { specialties },
            ProfessionalStepBody::Review { accept_terms } => Self::Review { accept_terms },
        }
    }
}

/// Wizard progress returned after every transition.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalWizardView {
    #[schema(value_type = String, example = "credentials")]
    pub step: ProfessionalStep,
    /// Draft collected so far, including the profile once completed.
    #[schema(value_type = Object)]
    pub wizard: ProfessionalWizard,
    /// Specialties the next specialties step will accept.
    pub offered_specialties: Vec<String>,
}

impl From<ProfessionalWizard> for ProfessionalWizardView {
    fn from(wizard: ProfessionalWizard) -> Self {
        Self {
            step: wizard.step(),
            offered_specialties: wizard.offered_specialties(),
            wizard,
        }
    }
}

fn wizard_response(wizard: ProfessionalWizard) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(ProfessionalWizardView::from(wizard))
}

/// Current wizard state for this browser.
#[utoipa::path(
    get,
    path = "/api/v1/onboarding/professional",
    responses(
        (status = 200, description = "Wizard state", body = ProfessionalWizardView),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["onboarding"],
    operation_id = "getProfessionalWizard",
    security([])
)]
#[get("/onboarding/professional")]
pub async fn get_professional_wizard(session: SessionContext) -> ApiResult<HttpResponse> {
    Ok(wizard_response(session.professional_wizard()?))
}

/// Submit the current step.
#[utoipa::path(
    post,
    path = "/api/v1/onboarding/professional/steps",
    request_body = ProfessionalStepBody,
    responses(
        (status = 200, description = "Step accepted", body = ProfessionalWizardView),
        (status = 400, description = "Invalid step data", body = Error),
        (status = 404, description = "CRM registration not found", body = Error),
        (status = 409, description = "Step submitted out of order", body = Error),
        (status = 503, description = "CRM registry unavailable", body = Error)
    ),
    tags = ["onboarding"],
    operation_id = "submitProfessionalStep",
    security([])
)]
#[post("/onboarding/professional/steps")]
pub async fn submit_professional_step(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfessionalStepBody>,
) -> ApiResult<HttpResponse> {
    let mut wizard = session.professional_wizard()?;
    state
        .onboarding
        .advance(&mut wizard, payload.into_inner().into())
        .await?;
    session.persist_professional_wizard(&wizard)?;
    Ok(wizard_response(wizard))
}

/// Return to the previous step without losing the draft.
#[utoipa::path(
    post,
    path = "/api/v1/onboarding/professional/back",
    responses(
        (status = 200, description = "Moved back one step", body = ProfessionalWizardView),
        (status = 400, description = "Already at the first step or completed", body = Error)
    ),
    tags = ["onboarding"],
    operation_id = "professionalWizardBack",
    security([])
)]
#[post("/onboarding/professional/back")]
pub async fn professional_wizard_back(session: SessionContext) -> ApiResult<HttpResponse> {
    let mut wizard = session.professional_wizard()?;
    wizard.back()?;
    session.persist_professional_wizard(&wizard)?;
    Ok(wizard_response(wizard))
}

/// Discard the wizard and start over.
#[utoipa::path(
    delete,
    path = "/api/v1/onboarding/professional",
    responses((status = 204, description = "Wizard discarded")),
    tags = ["onboarding"],
    operation_id = "resetProfessionalWizard",
    security([])
)]
#[delete("/onboarding/professional")]
pub async fn reset_professional_wizard(session: SessionContext) -> HttpResponse {
    session.reset_professional_wizard();
    HttpResponse::NoContent().finish()
}

/// Patient sign-up form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistrationRequest {
    #[schema(example = "João da Silva")]
    pub name: String,
    #[schema(example = "joao@example.com")]
    pub email: String,
    #[schema(example = "(21) 99876-5432")]
    pub phone: String,
    #[schema(example = "1990-07-15")]
    pub birth_date: String,
    #[schema(example = "RJ")]
    pub state: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

impl From<PatientRegistrationRequest> for PatientRegistration {
    fn from(value: PatientRegistrationRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            birth_date: value.birth_date,
            state: value.state,
            city: value.city,
            consent: value.consent,
        }
    }
}

/// Registered patient.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Digits only.
    pub phone: String,
    pub birth_date: NaiveDate,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<PatientProfile> for PatientResponse {
    fn from(value: PatientProfile) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email.as_str().to_owned(),
            phone: value.phone.as_str().to_owned(),
            birth_date: value.birth_date,
            state: value.state.to_string(),
            city: value.city,
            registered_at: value.registered_at,
        }
    }
}

/// Register a patient.
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = PatientRegistrationRequest,
    responses(
        (status = 201, description = "Patient registered", body = PatientResponse),
        (status = 400, description = "Invalid registration", body = Error)
    ),
    tags = ["onboarding"],
    operation_id = "registerPatient",
    security([])
)]
#[post("/patients")]
pub async fn register_patient(
    state: web::Data<HttpState>,
    payload: web::Json<PatientRegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let registration = PatientRegistration::from(payload.into_inner());
    let profile = registration.validate(Uuid::new_v4(), state.clock.utc())?;
    info!(patient_id = %profile.id, state = %profile.state, "patient registered");
    Ok(HttpResponse::Created().json(PatientResponse::from(profile)))
}

#[cfg(test)]
mod tests;
