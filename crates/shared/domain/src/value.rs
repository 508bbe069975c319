//! Identity value types - email addresses and plaintext passwords.
//!
//! Both are pure wrappers; validation has no side effects.

use std::fmt;

use validator::ValidateEmail;

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// A validated email address. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and wrap an email address.
    ///
    /// # Errors
    /// Returns a validation error if the address is empty or not shaped
    /// like `local@domain`.
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        validate_email(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A transient plaintext password.
///
/// Construction does not validate: login accepts any candidate, registration
/// runs [`validate_password`] explicitly. The plaintext never shows up in
/// debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

// Don't expose plaintext in debug output (security)
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the plaintext. Only the hasher should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Password {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Password {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Check that an email is non-empty and RFC-shaped.
pub fn validate_email(email: &str) -> DomainResult<()> {
    if email.is_empty() {
        return Err(DomainError::validation("email must not be empty"));
    }

    if !email.validate_email() {
        return Err(DomainError::validation("email must be a valid address"));
    }

    Ok(())
}

/// Check the password policy: at least 8 characters, one letter and one digit.
pub fn validate_password(password: &Password) -> DomainResult<()> {
    let plain = password.expose();

    if plain.is_empty() {
        return Err(DomainError::validation("password must not be empty"));
    }

    if plain.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if !plain.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::validation(
            "password must contain at least one letter",
        ));
    }

    if !plain.chars().any(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(
            "password must contain at least one digit",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a@b.com").is_ok());
    }

    #[test]
    fn test_email_parse_keeps_value() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
        assert_eq!(email.to_string(), "user@example.com");
    }

    #[test]
    fn test_email_parse_rejects_missing_domain() {
        let result = Email::parse("user@");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_validate_password_rejects_weak() {
        assert!(validate_password(&Password::from("")).is_err());
        assert!(validate_password(&Password::from("short")).is_err());
        assert!(validate_password(&Password::from("alllettersnodigits")).is_err());
        assert!(validate_password(&Password::from("12345678")).is_err());
    }

    #[test]
    fn test_validate_password_accepts_strong() {
        assert!(validate_password(&Password::from("Password1")).is_ok());
    }

    #[test]
    fn test_validate_password_error_names_rule() {
        let err = validate_password(&Password::from("12345678")).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("password must contain at least one letter")
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::from("Password1");
        let rendered = format!("{:?}", password);
        assert!(!rendered.contains("Password1"));
        assert!(rendered.contains("REDACTED"));
    }
}
