//! Domain-level constants.
//!
//! These constants define credential rules and token defaults.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Hashing
// =============================================================================

/// Default Argon2 memory cost in KiB
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;

/// Default Argon2 iteration count
pub const DEFAULT_HASH_ITERATIONS: u32 = 2;

/// Default Argon2 lane count
pub const DEFAULT_HASH_PARALLELISM: u32 = 1;

// =============================================================================
// Authentication
// =============================================================================

/// Default access token lifetime in hours (one week)
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24 * 7;

/// Longest configurable access token lifetime in hours (ten years)
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365 * 10;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
