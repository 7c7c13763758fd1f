//! Professional onboarding wizard.
//!
//! Doctors join through four steps: personal details, licence check against
//! the CRM registry, specialties and a final review. The wizard is a plain
//! value so the HTTP adapter can keep it in the session cookie between
//! requests; [`OnboardingService`] drives the transitions that need a port
//! or a clock.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::{Error, ErrorCode};
use super::contact::{ContactError, EmailAddress, PhoneNumber};
use super::crm::{CrmQuery, CrmRecord, CrmValidationError};
use super::location::SPECIALTIES;
use super::ports::{CrmLookup, CrmLookupError};

/// Longest accepted full name, in characters.
pub const MAX_NAME_CHARS: usize = 120;

/// Wizard steps in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalStep {
    #[default]
    Personal,
    Credentials,
    Specialties,
    Review,
    Completed,
}

impl ProfessionalStep {
    fn previous(self) -> Option<Self> {
        match self {
            Self::Personal | Self::Completed => None,
            Self::Credentials => Some(Self::Personal),
            Self::Specialties => Some(Self::Credentials),
            Self::Review => Some(Self::Specialties),
        }
    }
}

impl fmt::Display for ProfessionalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Personal => "personal",
            Self::Credentials => "credentials",
            Self::Specialties => "specialties",
            Self::Review => "review",
            Self::Completed => "completed",
        })
    }
}

/// Data submitted for one step, tagged by step name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProfessionalStepInput {
    Personal {
        name: String,
        email: String,
        phone: String,
    },
    Credentials {
        uf: String,
        crm_number: String,
    },
    Specialties {
        specialties: Vec<String>,
    },
    Review {
        accept_terms: bool,
    },
}

impl ProfessionalStepInput {
    pub fn step(&self) -> ProfessionalStep {
        match self {
            Self::Personal { .. } => ProfessionalStep::Personal,
            Self::Credentials { .. } => ProfessionalStep::Credentials,
            Self::Specialties { .. } => ProfessionalStep::Specialties,
            Self::Review { .. } => ProfessionalStep::Review,
        }
    }
}

/// Reasons a wizard transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("expected the {expected} step but received {received}")]
    WrongStep {
        expected: ProfessionalStep,
        received: ProfessionalStep,
    },
    #[error("there is no previous step")]
    NoPreviousStep,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must not exceed {MAX_NAME_CHARS} characters")]
    NameTooLong,
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error(transparent)]
    Crm(#[from] CrmValidationError),
    #[error("CRM registration is not active (status: {0})")]
    InactiveRegistration(String),
    #[error("at least one specialty is required")]
    NoSpecialties,
    #[error("specialty '{0}' is not offered")]
    UnknownSpecialty(String),
    #[error("terms of use must be accepted")]
    TermsNotAccepted,
    #[error("wizard is incomplete")]
    Incomplete,
}

impl From<OnboardingError> for Error {
    fn from(value: OnboardingError) -> Self {
        let message = value.to_string();
        match value {
            OnboardingError::WrongStep { expected, received } => {
                Error::conflict(message).with_details(serde_json::json!({
                    "expected": expected,
                    "received": received,
                }))
            }
            _ => Error::invalid_request(message),
        }
    }
}

/// Review status of a submitted profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    PendingReview,
}

/// Profile produced by a completed wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub crm: CrmQuery,
    pub specialties: Vec<String>,
    pub status: ProfileStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Personal details collected by the first step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub name: String,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
}

/// Verified licence from the second step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedCredentials {
    pub query: CrmQuery,
    pub record: CrmRecord,
}

/// Wizard progress and draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalWizard {
    step: ProfessionalStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    personal: Option<PersonalDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<VerifiedCredentials>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    specialties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    profile: Option<DoctorProfile>,
}

pub(crate) fn validate_name(raw: &str) -> Result<String, OnboardingError> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(OnboardingError::EmptyName);
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(OnboardingError::NameTooLong);
    }
    Ok(name)
}

impl ProfessionalWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> ProfessionalStep {
        self.step
    }

    pub fn personal(&self) -> Option<&PersonalDetails> {
        self.personal.as_ref()
    }

    pub fn credentials(&self) -> Option<&VerifiedCredentials> {
        self.credentials.as_ref()
    }

    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }

    /// Profile created when the wizard completed.
    pub fn profile(&self) -> Option<&DoctorProfile> {
        self.profile.as_ref()
    }

    fn expect_step(&self, received: ProfessionalStep) -> Result<(), OnboardingError> {
        if self.step() == received {
            Ok(())
        } else {
            Err(OnboardingError::WrongStep {
                expected: self.step(),
                received,
            })
        }
    }

    /// Step 1: name, e-mail and phone.
    pub fn submit_personal(
        &mut self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<(), OnboardingError> {
        self.expect_step(ProfessionalStep::Personal)?;
        self.personal = Some(PersonalDetails {
            name: validate_name(name)?,
            email: EmailAddress::new(email)?,
            phone: PhoneNumber::new(phone)?,
        });
        self.step = ProfessionalStep::Credentials;
        Ok(())
    }

    /// Step 2: accept a registry record fetched for `query`.
    pub fn submit_credentials(
        &mut self,
        query: CrmQuery,
        record: CrmRecord,
    ) -> Result<(), OnboardingError> {
        self.expect_step(ProfessionalStep::Credentials)?;
        if !record.is_active() {
            return Err(OnboardingError::InactiveRegistration(record.status));
        }
        self.credentials = Some(VerifiedCredentials { query, record });
        self.step = ProfessionalStep::Specialties;
        Ok(())
    }

    /// Specialties that may be chosen: the registry's plus the catalogue.
    pub fn offered_specialties(&self) -> Vec<String> {
        let mut offered: Vec<String> = self
            .credentials
            .iter()
            .flat_map(|verified| verified.record.specialties.iter().cloned())
            .collect();
        for name in SPECIALTIES {
            if !offered.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                offered.push(name.to_owned());
            }
        }
        offered
    }

    /// Step 3: pick one or more offered specialties.
    ///
    /// Matching is case-insensitive; the offered spelling is kept and
    /// duplicates are dropped.
    pub fn submit_specialties(&mut self, chosen: &[String]) -> Result<(), OnboardingError> {
        self.expect_step(ProfessionalStep::Specialties)?;
        let offered = self.offered_specialties();
        let mut selected: Vec<String> = Vec::new();
        for raw in chosen.iter().map(|value| value.trim()).filter(|v| !v.is_empty()) {
            let canonical = offered
                .iter()
                .find(|name| name.to_lowercase() == raw.to_lowercase())
                .ok_or_else(|| OnboardingError::UnknownSpecialty(raw.to_owned()))?;
            if !selected.contains(canonical) {
                selected.push(canonical.clone());
            }
        }
        if selected.is_empty() {
            return Err(OnboardingError::NoSpecialties);
        }
        self.specialties = selected;
        self.step = ProfessionalStep::Review;
        Ok(())
    }

    /// Step 4: accept the terms and produce the profile.
    pub fn submit_review(
        &mut self,
        accept_terms: bool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<&DoctorProfile, OnboardingError> {
        self.expect_step(ProfessionalStep::Review)?;
        if !accept_terms {
            return Err(OnboardingError::TermsNotAccepted);
        }
        let (Some(personal), Some(credentials)) = (&self.personal, &self.credentials) else {
            return Err(OnboardingError::Incomplete);
        };
        let profile = DoctorProfile {
            id,
            name: personal.name.clone(),
            email: personal.email.clone(),
            phone: personal.phone.clone(),
            crm: credentials.query.clone(),
            specialties: self.specialties.clone(),
            status: ProfileStatus::PendingReview,
            submitted_at: now,
        };
        self.step = ProfessionalStep::Completed;
        Ok(self.profile.insert(profile))
    }

    /// Return to the previous step, keeping everything entered so far.
    pub fn back(&mut self) -> Result<ProfessionalStep, OnboardingError> {
        let previous = self.step().previous().ok_or(OnboardingError::NoPreviousStep)?;
        self.step = previous;
        Ok(previous)
    }
}

/// Drives the wizard transitions that need the registry or a clock.
#[derive(Clone)]
pub struct OnboardingService {
    crm: Arc<dyn CrmLookup>,
    clock: Arc<dyn Clock>,
}

impl OnboardingService {
    pub fn new(crm: Arc<dyn CrmLookup>, clock: Arc<dyn Clock>) -> Self {
        Self { crm, clock }
    }

    /// Apply `input` to `wizard`.
    ///
    /// # Errors
    /// Validation failures map to `invalid_request`, out-of-order steps to
    /// `conflict`, and registry outages to `service_unavailable`.
    pub async fn advance(
        &self,
        wizard: &mut ProfessionalWizard,
        input: ProfessionalStepInput,
    ) -> Result<(), Error> {
        match input {
            ProfessionalStepInput::Personal { name, email, phone } => {
                wizard.submit_personal(&name, &email, &phone)?;
            }
            ProfessionalStepInput::Credentials { uf, crm_number } => {
                if wizard.step() != ProfessionalStep::Credentials {
                    return Err(OnboardingError::WrongStep {
                        expected: wizard.step(),
                        received: ProfessionalStep::Credentials,
                    }
                    .into());
                }
                let query = CrmQuery::try_from_parts(&uf, &crm_number)
                    .map_err(OnboardingError::from)?;
                let record = self.lookup(&query).await?;
                wizard.submit_credentials(query, record)?;
            }
            ProfessionalStepInput::Specialties { specialties } => {
                wizard.submit_specialties(&specialties)?;
            }
            ProfessionalStepInput::Review { accept_terms } => {
                let profile = wizard.submit_review(accept_terms, Uuid::new_v4(), self.clock.utc())?;
                info!(profile_id = %profile.id, crm = %profile.crm, "professional onboarding submitted");
            }
        }
        Ok(())
    }

    /// Look up a licence, mapping registry failures to domain errors.
    pub async fn lookup(&self, query: &CrmQuery) -> Result<CrmRecord, Error> {
        self.crm.lookup(query).await.map_err(|err| {
            warn!(%query, error = %err, "CRM lookup failed");
            lookup_error(query, &err)
        })
    }
}

fn lookup_error(query: &CrmQuery, err: &CrmLookupError) -> Error {
    match err.error_code() {
        ErrorCode::NotFound => Error::not_found(format!("{query} was not found in the registry")),
        code => Error::new(code, "CRM registry is unavailable"),
    }
}
