//! Typed identifiers
//!
//! Ids shared with other domains come from `kernel::id`; the ones below
//! never leave the auth crate.

pub use kernel::id::{MembershipId, OrganizationId, UserId};

use kernel::id::Id;

pub mod markers {
    pub struct RefreshToken;
    pub struct AuditEntry;
}

pub type RefreshTokenId = Id<markers::RefreshToken>;
pub type AuditEntryId = Id<markers::AuditEntry>;
