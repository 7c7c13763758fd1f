//! Medical licence (CRM) identifiers and registry records.
//!
//! A CRM number is only meaningful together with the federative unit that
//! issued it, so lookups always carry both.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::{InvalidStateCode, StateCode};

/// Longest CRM number the councils issue, in digits.
const MAX_CRM_DIGITS: usize = 8;

/// Longest raw value accepted before it reaches a registry.
const MAX_CRM_CHARS: usize = 32;

/// Validation failures for CRM queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrmValidationError {
    #[error("CRM number must be a single token of at most {MAX_CRM_CHARS} characters")]
    InvalidNumber,
    #[error(transparent)]
    InvalidState(#[from] InvalidStateCode),
    #[error("CRM registrations are issued per state; 'Brasil' is not accepted")]
    NationwideState,
}

/// Registry number issued by a regional medical council.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CrmNumber(String);

impl CrmNumber {
    /// Accept a raw CRM value; surrounding whitespace is ignored.
    ///
    /// Only blank, oversized or whitespace-split values are rejected here.
    /// Whether the value looks like a council number is the registry's call,
    /// so unknown shapes surface as "not found".
    ///
    /// # Examples
    /// ```
    /// use telesaude::domain::crm::CrmNumber;
    ///
    /// assert!(CrmNumber::new(" 123456 ").is_ok());
    /// assert!(CrmNumber::new("12ab").is_ok());
    /// assert!(CrmNumber::new("12 34").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CrmValidationError> {
        let trimmed = raw.as_ref().trim();
        let valid = !trimmed.is_empty()
            && trimmed.chars().count() <= MAX_CRM_CHARS
            && !trimmed
                .chars()
                .any(|ch| ch.is_whitespace() || ch.is_control());
        if valid {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(CrmValidationError::InvalidNumber)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for 1 to 8 ASCII digits, the shape councils issue.
    pub fn is_council_format(&self) -> bool {
        (1..=MAX_CRM_DIGITS).contains(&self.0.len()) && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl TryFrom<String> for CrmNumber {
    type Error = CrmValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CrmNumber> for String {
    fn from(value: CrmNumber) -> Self {
        value.0
    }
}

impl fmt::Display for CrmNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A CRM number paired with its issuing state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmQuery {
    pub uf: StateCode,
    pub number: CrmNumber,
}

impl CrmQuery {
    /// Validate a UF code and CRM number together.
    pub fn try_from_parts(uf: &str, number: &str) -> Result<Self, CrmValidationError> {
        let uf: StateCode = uf.parse()?;
        if uf.is_nationwide() {
            return Err(CrmValidationError::NationwideState);
        }
        Ok(Self {
            uf,
            number: CrmNumber::new(number)?,
        })
    }
}

impl fmt::Display for CrmQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CRM-{} {}", self.uf, self.number)
    }
}

/// Registry status that allows a professional to practise.
pub const ACTIVE_STATUS: &str = "Ativo";

/// Registry entry returned by a CRM lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmRecord {
    pub name: String,
    pub status: String,
    pub specialties: Vec<String>,
}

impl CrmRecord {
    /// `true` when the registry lists the licence as active.
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(ACTIVE_STATUS)
    }
}
