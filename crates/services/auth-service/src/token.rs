//! Bearer token issuer.
//!
//! Stateless HS256 JWTs carrying the user id as `sub`. Nothing is stored;
//! a token is valid iff its signature verifies and `exp` has not passed.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use domain::TokenError;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// A signed, time-bounded access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Seconds until expiry, never negative
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// Mints and parses access tokens with a process-wide secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

// Keys stay out of debug output
impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer from the signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user_id` that expires `ttl` from now.
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<AccessToken, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Issue("token expiry is out of range".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Issue(e.to_string()))?;

        Ok(AccessToken {
            token,
            subject: claims.sub,
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Verify a token and return its subject.
    ///
    /// The signature is checked before expiry, so a forged token is reported
    /// as [`TokenError::InvalidSignature`] even when it is also expired.
    pub fn parse(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            },
        )?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-for-testing-only-32chars";

    #[test]
    fn test_issue_and_parse() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("u1", Duration::hours(1)).unwrap();

        assert_eq!(token.subject, "u1");
        assert_eq!(issuer.parse(token.as_str()).unwrap(), "u1");
        assert!(token.expires_in() > 3500);
    }

    #[test]
    fn test_expired_token() {
        let issuer = TokenIssuer::new(SECRET);
        let token = issuer.issue("u1", Duration::seconds(-120)).unwrap();

        assert_eq!(issuer.parse(token.as_str()), Err(TokenError::Expired));
        assert_eq!(token.expires_in(), 0);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let issuer = TokenIssuer::new(SECRET);

        assert!(matches!(
            issuer.issue("u1", Duration::days(1_000_000_000)),
            Err(TokenError::Issue(_))
        ));
    }

    #[test]
    fn test_foreign_secret_is_invalid_signature() {
        let token = TokenIssuer::new(b"another-secret-key-that-is-32-chars!!")
            .issue("u1", Duration::hours(1))
            .unwrap();

        let result = TokenIssuer::new(SECRET).parse(token.as_str());
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_forged_and_expired_reports_signature() {
        let token = TokenIssuer::new(b"another-secret-key-that-is-32-chars!!")
            .issue("u1", Duration::seconds(-120))
            .unwrap();

        let result = TokenIssuer::new(SECRET).parse(token.as_str());
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let issuer = TokenIssuer::new(SECRET);

        assert!(matches!(issuer.parse("not-a-token"), Err(TokenError::Malformed(_))));
        assert!(matches!(issuer.parse(""), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_debug_hides_keys() {
        let rendered = format!("{:?}", TokenIssuer::new(SECRET));
        assert!(!rendered.contains("test-secret"));
    }
}
