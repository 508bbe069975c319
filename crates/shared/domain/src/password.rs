//! Credential hasher - one-way password hashing and verification.
//!
//! Argon2id with a tunable work factor. Hashes are stored as PHC strings, so
//! each hash carries its own salt and cost parameters and stays verifiable
//! after the configured cost changes.

use std::fmt;

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PhcError, PasswordHash as PhcHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::constants::{DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM};
use crate::error::{DomainError, DomainResult};
use crate::value::Password;

/// Salt and digest of the placeholder hash used by [`CredentialHasher::equalize_timing`].
/// Syntactically valid, matches no password.
const DUMMY_SALT: &str = "c29tZXNhbHRzb21lc2FsdA";
const DUMMY_DIGEST: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Opaque output of the one-way hasher. Safe to persist and compare.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

// Don't expose hash in debug output (security)
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordHash").field(&"[REDACTED]").finish()
    }
}

impl PasswordHash {
    /// Wrap a hash read back from storage.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Argon2id password hasher with configurable cost.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher {
    /// Create a hasher with explicit cost parameters.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Number of lanes
    ///
    /// # Errors
    /// Returns a validation error if Argon2 rejects the parameters.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| DomainError::validation(format!("Invalid hash parameters: {}", e)))?;
        Ok(Self { params })
    }

    /// Hasher with the production defaults.
    pub fn recommended() -> Self {
        Self::new(
            DEFAULT_HASH_MEMORY_KIB,
            DEFAULT_HASH_ITERATIONS,
            DEFAULT_HASH_PARALLELISM,
        )
        .unwrap_or_default()
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    /// Returns a hashing error only on internal failure (e.g. no entropy).
    pub fn hash(&self, password: &Password) -> DomainResult<PasswordHash> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(format!("Password hash failed: {}", e)))?;
        Ok(PasswordHash(hash.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns `Ok(false)` for a mismatch. The digest comparison is constant-time.
    ///
    /// # Errors
    /// Returns a hashing error if the stored hash is malformed.
    pub fn verify(&self, hash: &PasswordHash, password: &Password) -> DomainResult<bool> {
        let parsed = PhcHash::new(hash.as_str())
            .map_err(|e| DomainError::hashing(format!("Invalid hash format: {}", e)))?;

        match self
            .argon2()
            .verify_password(password.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(e) => Err(DomainError::hashing(format!("Password verify failed: {}", e))),
        }
    }

    /// Spend the same work as a real verification without a stored hash.
    ///
    /// Used on lookups that found no user so both login failures cost the same.
    pub fn equalize_timing(&self, password: &Password) {
        let dummy = PasswordHash(format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            self.params.m_cost(),
            self.params.t_cost(),
            self.params.p_cost(),
            DUMMY_SALT,
            DUMMY_DIGEST
        ));
        // Always a mismatch; only the elapsed time matters.
        let _ = self.verify(&dummy, password);
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}
