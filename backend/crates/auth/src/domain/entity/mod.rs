//! Entities

pub mod audit_entry;
pub mod membership;
pub mod refresh_token;
pub mod user;

pub use audit_entry::{AuditAction, AuditEntry};
pub use membership::Membership;
pub use refresh_token::RefreshTokenRecord;
pub use user::User;
