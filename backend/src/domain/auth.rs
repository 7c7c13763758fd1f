//! Administrator credentials for the SEO tooling.
//!
//! There is a single configured administrator; the login handler compares
//! submitted credentials against it and flags the session on success.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCredentialsError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for AdminCredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for AdminCredentialsError {}

/// Validated administrator credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller whitespace.
///
/// # Examples
/// ```
/// use telesaude::domain::AdminCredentials;
///
/// let creds = AdminCredentials::try_from_parts(" admin ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl AdminCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, AdminCredentialsError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(AdminCredentialsError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AdminCredentialsError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Compare with submitted credentials without short-circuiting on the
    /// first differing byte.
    pub fn matches(&self, submitted: &Self) -> bool {
        let username = constant_time_eq(self.username.as_bytes(), submitted.username.as_bytes());
        let password = constant_time_eq(self.password.as_bytes(), submitted.password.as_bytes());
        username & password
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
