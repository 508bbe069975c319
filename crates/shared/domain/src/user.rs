//! User aggregate root.

use chrono::{DateTime, Utc};

use crate::error::{DomainError, DomainResult};
use crate::password::{CredentialHasher, PasswordHash};
use crate::value::{validate_password, Email, Password};

/// User domain entity
///
/// Fields are private: a user is created through [`User::new`], rebuilt by a
/// repository through [`User::from_storage`], and changed only inside a
/// repository update callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: String,
    email: Email,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Register a new user.
    ///
    /// Empty fields are rejected before any hashing happens. Then the email
    /// shape and password policy are checked and the password is hashed.
    ///
    /// # Errors
    /// Returns a validation error for bad input, a hashing error if the
    /// hasher fails.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        password: &Password,
        hasher: &CredentialHasher,
    ) -> DomainResult<Self> {
        let id = id.into();
        let email = email.into();

        if id.is_empty() {
            return Err(DomainError::validation("expected not empty id"));
        }
        if email.is_empty() {
            return Err(DomainError::validation("expected not empty email"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("expected not empty password"));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hasher.hash(password)?;

        let now = Utc::now();
        Ok(Self {
            id,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a user from persisted fields. Repository read path only.
    ///
    /// # Errors
    /// Returns a validation error if any field is empty or zero, or if the
    /// timestamps are out of order.
    pub fn from_storage(
        id: String,
        email: String,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if id.is_empty() {
            return Err(DomainError::validation("expected not empty id"));
        }
        if email.is_empty() {
            return Err(DomainError::validation("expected not empty email"));
        }
        if password_hash.is_empty() {
            return Err(DomainError::validation("expected not empty password hash"));
        }
        if created_at == DateTime::<Utc>::default() {
            return Err(DomainError::validation("expected not empty created_at"));
        }
        if updated_at == DateTime::<Utc>::default() {
            return Err(DomainError::validation("expected not empty updated_at"));
        }
        if updated_at < created_at {
            return Err(DomainError::validation("updated_at precedes created_at"));
        }

        Ok(Self {
            id,
            email: Email::parse(email)?,
            password_hash,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Check a candidate password.
    ///
    /// A mismatch is always [`DomainError::InvalidCredentials`], with no hint
    /// about why.
    ///
    /// # Errors
    /// Returns a hashing error if the stored hash is corrupt.
    pub fn match_password(
        &self,
        candidate: &Password,
        hasher: &CredentialHasher,
    ) -> DomainResult<()> {
        if hasher.verify(&self.password_hash, candidate)? {
            Ok(())
        } else {
            Err(DomainError::InvalidCredentials)
        }
    }

    /// Replace the email address.
    pub fn change_email(&mut self, email: Email) {
        self.email = email;
    }

    /// Replace the password after checking the policy.
    ///
    /// # Errors
    /// Returns a validation error for a weak password.
    pub fn change_password(
        &mut self,
        password: &Password,
        hasher: &CredentialHasher,
    ) -> DomainResult<()> {
        validate_password(password)?;
        self.password_hash = hasher.hash(password)?;
        Ok(())
    }

    /// Refresh `updated_at`. Called by repositories when persisting an update.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}
