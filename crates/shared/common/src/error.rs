//! Unified error handling.
//!
//! Every handler failure is classified into one [`AppError`] variant. The
//! transport layer matches on the variant to pick a status code; nothing
//! downstream inspects error messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError, TokenError};
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Caller input
    #[error("{0}")]
    Validation(String),

    // Resource errors
    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("User with email {0} not found")]
    UserEmailNotFound(String),

    // Authentication
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    // Mechanism failures
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Operation cancelled")]
    Cancelled,

    // Internal
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Stable error code for clients, logs and metric labels
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UserAlreadyExists => "USER_ALREADY_EXISTS",
            AppError::UserNotFound(_) => "USER_NOT_FOUND",
            AppError::UserEmailNotFound(_) => "USER_EMAIL_NOT_FOUND",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Token(TokenError::Expired) => "TOKEN_EXPIRED",
            AppError::Token(TokenError::InvalidSignature) => "TOKEN_INVALID_SIGNATURE",
            AppError::Token(TokenError::Malformed(_)) => "TOKEN_MALFORMED",
            AppError::Token(TokenError::Issue(_)) => "TOKEN_ISSUE_FAILED",
            AppError::Hashing(_) => "HASHING_ERROR",
            AppError::Cancelled => "CANCELLED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            AppError::UserNotFound(_) | AppError::UserEmailNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Token(TokenError::Issue(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Hashing(_) | AppError::Cancelled | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for failures the caller cannot fix by changing input
    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::UserNotFound(_) | AppError::UserEmailNotFound(_) => {
                "User not found".to_string()
            }
            AppError::Token(TokenError::Issue(_)) => "An internal error occurred".to_string(),
            AppError::Token(_) => "Invalid or expired token".to_string(),

            // Hide details for internal/security errors
            AppError::Hashing(msg) => {
                tracing::error!("Hashing error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::Hashing(msg) => AppError::Hashing(msg),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UserAlreadyExists => AppError::UserAlreadyExists,
            RepositoryError::UserNotFound { id } => AppError::UserNotFound(id),
            RepositoryError::UserEmailNotFound { email } => AppError::UserEmailNotFound(email),
            RepositoryError::Cancelled => AppError::Cancelled,
            RepositoryError::Mutation(e) => AppError::from(e),
            RepositoryError::InvalidRecord(e) => {
                AppError::Internal(format!("invalid stored user: {}", e))
            }
            RepositoryError::Storage(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UserAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::UserNotFound("u1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UserEmailNotFound("a@b.com".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Token(TokenError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Cancelled.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_keeps_kind() {
        assert_eq!(
            AppError::from(RepositoryError::not_found("u1")),
            AppError::UserNotFound("u1".into())
        );
        assert_eq!(
            AppError::from(RepositoryError::email_not_found("a@b.com")),
            AppError::UserEmailNotFound("a@b.com".into())
        );
        assert_eq!(
            AppError::from(RepositoryError::Cancelled),
            AppError::Cancelled
        );
        assert_eq!(
            AppError::from(RepositoryError::Mutation(DomainError::validation("weak"))),
            AppError::Validation("weak".into())
        );
        assert!(matches!(
            AppError::from(RepositoryError::storage("connection reset")),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let err = AppError::internal("password column missing");
        assert_eq!(err.user_message(), "An internal error occurred");
        assert!(err.is_internal());
    }

    #[test]
    fn test_token_codes_are_distinct() {
        assert_ne!(
            AppError::Token(TokenError::Expired).code(),
            AppError::Token(TokenError::InvalidSignature).code()
        );
        assert_ne!(
            AppError::Token(TokenError::InvalidSignature).code(),
            AppError::Token(TokenError::Malformed("x".into())).code()
        );
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AppError::UserAlreadyExists.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "USER_ALREADY_EXISTS");
    }
}
