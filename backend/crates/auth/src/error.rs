//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! `InvalidCredentials` and `InvalidRefreshToken` each stand for several
//! root causes. The cause is logged, never rendered.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::hashing::HashError;
use thiserror::Error;

use crate::application::token::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input that slipped past request validation
    #[error("{0}")]
    Validation(String),

    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Username already in use")]
    DuplicateUsername,

    /// Unknown email, wrong password or inactive account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed or forged access token
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Access Token expired")]
    AccessTokenExpired,

    /// Empty, expired, forged, wrong-kind, unknown or already rotated
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Missing OrgId")]
    MissingOrg,

    #[error("Not a member of organization")]
    NotMember,

    #[error("Insufficient role")]
    InsufficientRole,

    /// An entity resolved under one tenant belongs to another
    #[error("Cross-tenant write blocked")]
    CrossTenantWrite,

    #[error("Credential hashing failed: {0}")]
    Hashing(#[from] HashError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Wrap a value-object validation failure.
    pub fn validation(err: AppError) -> Self {
        AuthError::Validation(err.message().to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::MissingOrg => ErrorKind::BadRequest,
            AuthError::DuplicateEmail | AuthError::DuplicateUsername => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::AccessTokenExpired
            | AuthError::InvalidRefreshToken => ErrorKind::Unauthorized,
            AuthError::NotMember | AuthError::InsufficientRole => ErrorKind::Forbidden,
            AuthError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            AuthError::CrossTenantWrite
            | AuthError::Hashing(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_FAILED",
            AuthError::DuplicateEmail => "EMAIL_TAKEN",
            AuthError::DuplicateUsername => "USERNAME_TAKEN",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::AccessTokenExpired => "ACCESS_TOKEN_EXPIRED",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::MissingOrg => "MISSING_ORG",
            AuthError::NotMember => "NOT_MEMBER",
            AuthError::InsufficientRole => "INSUFFICIENT_ROLE",
            AuthError::CrossTenantWrite => "CROSS_TENANT_WRITE",
            AuthError::Hashing(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                self.kind().default_code()
            }
        }
    }

    /// Convert to AppError. Server faults never expose their source.
    pub fn to_app_error(&self) -> AppError {
        let message = match self {
            AuthError::Hashing(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                self.kind().as_str().to_string()
            }
            other => other.to_string(),
        };
        let err = AppError::new(self.kind(), message).with_code(self.code());
        match self {
            AuthError::AccessTokenExpired => err.with_action("Refresh the session and retry"),
            AuthError::MissingOrg => err.with_action("Send the organization id in the x-org-id header"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Hashing(e) => {
                tracing::error!(error = %e, "Credential hashing error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::CrossTenantWrite => {
                tracing::error!("Cross-tenant write blocked");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidRefreshToken => {
                tracing::warn!("Invalid refresh token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
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

/// Token errors only reach this conversion when signing fails.
/// Verification failures are mapped explicitly at each call site.
impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MissingOrg.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AccessTokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NotMember.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InsufficientRole.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::CrossTenantWrite.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_codes_are_distinct_for_client_errors() {
        let errors = [
            AuthError::Validation("x".into()),
            AuthError::DuplicateEmail,
            AuthError::DuplicateUsername,
            AuthError::InvalidCredentials,
            AuthError::Unauthenticated,
            AuthError::AccessTokenExpired,
            AuthError::InvalidRefreshToken,
            AuthError::MissingOrg,
            AuthError::NotMember,
            AuthError::InsufficientRole,
            AuthError::CrossTenantWrite,
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AuthError::Internal("pool exploded at 10.0.0.3".into());
        let app = err.to_app_error();
        assert_eq!(app.message(), "Internal Server Error");
        assert_eq!(app.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_expired_message_is_distinct() {
        let expired = AuthError::AccessTokenExpired.to_app_error();
        let invalid = AuthError::Unauthenticated.to_app_error();
        assert_ne!(expired.message(), invalid.message());
        assert!(expired.action().is_some());
    }
}
