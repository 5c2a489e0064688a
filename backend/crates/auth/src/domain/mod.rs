//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{AuditAction, AuditEntry, Membership, RefreshTokenRecord, User};
pub use repository::{AuthStore, MembershipRepository, RefreshTokenRepository, UserRepository};
