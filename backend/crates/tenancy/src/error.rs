//! Tenancy Error Types
//!
//! Tenant-domain errors. Authorization failures raised by the auth crate
//! pass through unchanged in [`TenancyError::Auth`].

use auth::AuthError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::patch::EmptyPatch;
use thiserror::Error;

/// Tenancy-specific result type alias
pub type TenancyResult<T> = Result<T, TenancyError>;

#[derive(Debug, Error)]
pub enum TenancyError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("Nothing to update")]
    NothingToUpdate,

    #[error("Organization not found")]
    OrganizationNotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Membership not found")]
    MemberNotFound,

    #[error("Service staff link not found")]
    StaffAssignmentNotFound,

    #[error("Weekly rule not found")]
    WeeklyRuleNotFound,

    #[error("Only staff members can be assigned")]
    NotAssignable,

    #[error("Staff member is not assigned to this service")]
    StaffNotAssigned,

    #[error("Slug already in use")]
    SlugTaken,

    #[error("Could not generate a unique slug")]
    SlugExhausted,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TenancyError {
    /// Wrap a value-object validation failure.
    pub fn validation(err: AppError) -> Self {
        TenancyError::Validation(err.message().to_string())
    }

    /// A row resolved under one tenant belongs to another.
    pub fn cross_tenant() -> Self {
        TenancyError::Auth(AuthError::CrossTenantWrite)
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TenancyError::Auth(e) => e.kind(),
            TenancyError::Validation(_)
            | TenancyError::NothingToUpdate
            | TenancyError::NotAssignable
            | TenancyError::StaffNotAssigned => ErrorKind::BadRequest,
            TenancyError::OrganizationNotFound
            | TenancyError::ServiceNotFound
            | TenancyError::MemberNotFound
            | TenancyError::StaffAssignmentNotFound
            | TenancyError::WeeklyRuleNotFound => ErrorKind::NotFound,
            TenancyError::SlugTaken | TenancyError::SlugExhausted => ErrorKind::Conflict,
            TenancyError::Database(sqlx::Error::PoolTimedOut) => ErrorKind::ServiceUnavailable,
            TenancyError::Database(_) | TenancyError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            TenancyError::Auth(e) => e.code(),
            TenancyError::Validation(_) => "VALIDATION_FAILED",
            TenancyError::NothingToUpdate => "NOTHING_TO_UPDATE",
            TenancyError::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            TenancyError::ServiceNotFound => "SERVICE_NOT_FOUND",
            TenancyError::MemberNotFound => "MEMBER_NOT_FOUND",
            TenancyError::StaffAssignmentNotFound => "STAFF_ASSIGNMENT_NOT_FOUND",
            TenancyError::WeeklyRuleNotFound => "WEEKLY_RULE_NOT_FOUND",
            TenancyError::NotAssignable => "STAFF_NOT_ASSIGNABLE",
            TenancyError::StaffNotAssigned => "STAFF_NOT_ASSIGNED",
            TenancyError::SlugTaken => "SLUG_TAKEN",
            TenancyError::SlugExhausted => "SLUG_EXHAUSTED",
            TenancyError::Database(_) | TenancyError::Internal(_) => self.kind().default_code(),
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            TenancyError::Auth(e) => e.to_app_error(),
            TenancyError::Database(_) | TenancyError::Internal(_) => {
                AppError::new(self.kind(), self.kind().as_str()).with_code(self.code())
            }
            other => AppError::new(other.kind(), other.to_string()).with_code(other.code()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            TenancyError::Auth(e) => e.log(),
            TenancyError::Database(e) => {
                tracing::error!(error = %e, "Tenancy database error");
            }
            TenancyError::Internal(msg) => {
                tracing::error!(message = %msg, "Tenancy internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Tenancy error");
            }
        }
    }
}

impl IntoResponse for TenancyError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<EmptyPatch> for TenancyError {
    fn from(_: EmptyPatch) -> Self {
        TenancyError::NothingToUpdate
    }
}
