//! Patient registration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;
use super::contact::{ContactError, EmailAddress, PhoneNumber};
use super::location::{InvalidStateCode, StateCode};
use super::onboarding::{OnboardingError, validate_name};

/// Raw registration form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistration {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// ISO `YYYY-MM-DD`.
    pub birth_date: String,
    pub state: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

/// Reasons a registration is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatientError {
    #[error("{0}")]
    Name(OnboardingError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    #[error("birth date must be an ISO date (YYYY-MM-DD)")]
    InvalidBirthDate,
    #[error("birth date must not be in the future")]
    FutureBirthDate,
    #[error(transparent)]
    State(#[from] InvalidStateCode),
    #[error("a specific state is required")]
    NationwideState,
    #[error("consent to the privacy policy is required")]
    ConsentRequired,
}

impl From<PatientError> for Error {
    fn from(value: PatientError) -> Self {
        Error::invalid_request(value.to_string())
    }
}

/// Registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: Uuid,
    pub name: String,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub birth_date: NaiveDate,
    pub state: StateCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl PatientRegistration {
    /// Validate the form and build the profile.
    pub fn validate(
        self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<PatientProfile, PatientError> {
        let name = validate_name(&self.name).map_err(PatientError::Name)?;
        let email = EmailAddress::new(&self.email)?;
        let phone = PhoneNumber::new(&self.phone)?;
        let birth_date = NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d")
            .map_err(|_| PatientError::InvalidBirthDate)?;
        if birth_date > now.date_naive() {
            return Err(PatientError::FutureBirthDate);
        }
        let state: StateCode = self.state.parse()?;
        if state.is_nationwide() {
            return Err(PatientError::NationwideState);
        }
        if !self.consent {
            return Err(PatientError::ConsentRequired);
        }
        Ok(PatientProfile {
            id,
            name,
            email,
            phone,
            birth_date,
            state,
            city: self
                .city
                .map(|city| city.trim().to_owned())
                .filter(|city| !city.is_empty()),
            registered_at: now,
        })
    }
}
