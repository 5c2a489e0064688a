//! Auth (Authentication & Authorization) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Token codec, session manager, membership authorizer
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, authorization gate
//!
//! ## Features
//! - Registration and email + password login
//! - Access / refresh token pairs (HS256, independent keys)
//! - Single-use refresh tokens: every refresh rotates, reuse is rejected
//! - Organization-scoped roles (Owner, Admin, Staff, Customer)
//! - Audit entries committed in the same transaction as the write
//!
//! ## Security Model
//! - Passwords and refresh tokens hashed with Argon2id on the blocking pool
//! - Refresh tokens stored only as hashes and matched by verification
//! - Login and refresh failures do not reveal their cause
//! - Rotation is a conditional update, so concurrent reuse succeeds once

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, AuthSettings};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::InMemoryAuthStore, postgres::PgAuthRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod gate {
    pub use crate::presentation::gate::*;
}
