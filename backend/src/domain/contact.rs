//! Contact details collected by the wizards and checkout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation failures for contact fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("phone number must have 10 or 11 digits including the area code")]
    InvalidPhone,
}

/// Syntactically plausible e-mail address, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// # Examples
    /// ```
    /// use telesaude::domain::contact::EmailAddress;
    ///
    /// let email = EmailAddress::new(" Ana@Example.com ").unwrap();
    /// assert_eq!(email.as_str(), "ana@example.com");
    /// assert!(EmailAddress::new("ana@").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactError> {
        let trimmed = raw.as_ref().trim();
        let (local, domain) = trimmed.split_once('@').ok_or(ContactError::InvalidEmail)?;
        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !domain.ends_with('.');
        if local.is_empty()
            || !domain_ok
            || domain.contains('@')
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(ContactError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Brazilian phone number reduced to its digits (area code included).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accepts punctuation such as `(11) 98765-4321`; only digits are kept.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactError> {
        let raw = raw.as_ref();
        if raw
            .chars()
            .any(|ch| !(ch.is_ascii_digit() || " ()-+.".contains(ch)))
        {
            return Err(ContactError::InvalidPhone);
        }
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if (10..=11).contains(&digits.len()) {
            Ok(Self(digits))
        } else {
            Err(ContactError::InvalidPhone)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}
