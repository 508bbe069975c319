//! Auth service configuration.

use std::env;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use common::{DatabaseConfig, HashConfig, JwtConfig, MetricsConfig, ServiceConfig};
use domain::{CredentialHasher, DomainResult, MAX_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Auth service configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub metrics: MetricsConfig,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.jwt.secret = lookup("JWT_SECRET")
            .or_else(|| lookup("AUTH_SERVICE_JWT_SECRET"))
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if config.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!("must be at least {} bytes", MIN_JWT_SECRET_LENGTH),
            });
        }

        config.database = database_from_lookup(&lookup);
        if let Some(hours) = parse(&lookup, "JWT_EXPIRATION_HOURS")? {
            if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours)
                || Duration::try_hours(hours).is_none()
            {
                return Err(ConfigError::Invalid {
                    key: "JWT_EXPIRATION_HOURS",
                    reason: format!("must be between 1 and {}", MAX_JWT_EXPIRATION_HOURS),
                });
            }
            config.jwt.expiration_hours = hours;
        }
        if let Some(host) = lookup("AUTH_SERVICE_HOST") {
            config.service.host = host;
        }
        if let Some(port) = parse(&lookup, "AUTH_SERVICE_PORT")? {
            config.service.port = port;
        }
        if let Some(enabled) = parse(&lookup, "METRICS_ENABLED")? {
            config.metrics.enabled = enabled;
        }
        if let Some(memory) = parse(&lookup, "HASH_MEMORY_KIB")? {
            config.hash.memory_kib = memory;
        }
        if let Some(iterations) = parse(&lookup, "HASH_ITERATIONS")? {
            config.hash.iterations = iterations;
        }
        if let Some(parallelism) = parse(&lookup, "HASH_PARALLELISM")? {
            config.hash.parallelism = parallelism;
        }

        config
            .hasher()
            .map_err(|e| ConfigError::Invalid {
                key: "HASH_*",
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Get JWT secret as bytes.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }

    /// Token lifetime, clamped to the configurable range.
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.jwt.expiration_hours.clamp(1, MAX_JWT_EXPIRATION_HOURS))
    }

    pub fn hasher(&self) -> DomainResult<CredentialHasher> {
        CredentialHasher::new(
            self.hash.memory_kib,
            self.hash.iterations,
            self.hash.parallelism,
        )
    }
}

/// Database settings alone, for commands that never issue tokens.
pub fn database_from_env() -> DatabaseConfig {
    database_from_lookup(&|key: &str| env::var(key).ok())
}

fn database_from_lookup<F>(lookup: &F) -> DatabaseConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut database = DatabaseConfig::default();
    if let Some(url) = lookup("DATABASE_URL") {
        database.url = url;
    }
    database
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        })
        .transpose()
}
