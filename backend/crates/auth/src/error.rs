//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::crypto::CryptoError;
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::rate_limit::RateLimitError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Account not found")]
    AccountNotFound,

    #[error("Token not found")]
    TokenNotFound,

    #[error("An account with this email already exists")]
    EmailAlreadyRegistered,

    /// Unknown email and wrong password are deliberately the same error
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Please use OAuth login method")]
    WrongAuthMethod,

    /// Unknown value or wrong token kind
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidRegistrationMethod(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Duration },

    /// Every attempt to draw an unused token value collided
    #[error("Could not generate a unique token")]
    GenerationExhausted,

    #[error("Authorization token required")]
    MissingToken,

    #[error("Invalid authorization format")]
    InvalidAuthFormat,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::EmailAlreadyRegistered => ErrorKind::Conflict,
            AuthError::TokenNotFound
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::MissingToken
            | AuthError::InvalidAuthFormat => ErrorKind::Unauthorized,
            AuthError::AccountDeactivated => ErrorKind::Forbidden,
            AuthError::WrongAuthMethod
            | AuthError::Validation(_)
            | AuthError::InvalidRegistrationMethod(_)
            | AuthError::InvalidRequest(_) => ErrorKind::BadRequest,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::GenerationExhausted => ErrorKind::ServiceUnavailable,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable code rendered to clients
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AuthError::EmailAlreadyRegistered => "USER_ALREADY_EXISTS",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            AuthError::WrongAuthMethod => "WRONG_AUTH_METHOD",
            AuthError::TokenNotFound | AuthError::InvalidToken | AuthError::TokenExpired => {
                "INVALID_TOKEN"
            }
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::InvalidRegistrationMethod(_) => "INVALID_REGISTRATION_METHOD",
            AuthError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            AuthError::GenerationExhausted => "TOKEN_GENERATION_EXHAUSTED",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidAuthFormat => "INVALID_AUTH_FORMAT",
            AuthError::InvalidRequest(_) => "INVALID_REQUEST",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to AppError
    ///
    /// Token failures collapse into one message so clients cannot tell an
    /// expired token from an unknown one. Internal details never leave.
    pub fn to_app_error(&self) -> AppError {
        let message = match self {
            AuthError::TokenNotFound | AuthError::InvalidToken | AuthError::TokenExpired => {
                "Invalid or expired token".to_string()
            }
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self {
            AuthError::RateLimited { retry_after } => err.with_retry_after(*retry_after),
            AuthError::WrongAuthMethod => err.with_action("Sign in with the provider you registered with"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::GenerationExhausted => {
                tracing::error!("Token generation exhausted its retries");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountDeactivated => {
                tracing::warn!("Access attempt on deactivated account");
            }
            _ => {
                tracing::debug!(error = %self, code = self.code(), "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<CryptoError> for AuthError {
    fn from(err: CryptoError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<RateLimitError> for AuthError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::Exceeded { retry_after, .. } => AuthError::RateLimited { retry_after },
            RateLimitError::StoreUnavailable(msg) => AuthError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_are_conflated() {
        let expired = AuthError::TokenExpired.to_app_error();
        let invalid = AuthError::InvalidToken.to_app_error();
        assert_eq!(expired.status_code(), 401);
        assert_eq!(expired.message(), invalid.message());
        assert_eq!(expired.code(), invalid.code());
    }

    #[test]
    fn test_internal_message_is_not_leaked() {
        let err = AuthError::Internal("argon2 blew up".to_string()).to_app_error();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let err = AuthError::from(RateLimitError::Exceeded {
            keyspace: platform::rate_limit::Keyspace::Identity,
            retry_after: Duration::from_secs(12),
        });
        let app = err.to_app_error();
        assert_eq!(app.status_code(), 429);
        assert_eq!(app.retry_after_secs(), Some(12));
        assert_eq!(app.code(), Some("RATE_LIMIT_EXCEEDED"));
    }

    #[test]
    fn test_policy_error_becomes_validation() {
        let err = AuthError::from(PasswordPolicyError::MissingDigit);
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_string(), "Password must contain at least one number");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::EmailAlreadyRegistered.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::AccountDeactivated.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::GenerationExhausted.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
