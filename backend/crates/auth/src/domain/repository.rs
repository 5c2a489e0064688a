//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer (`infra::postgres`, `infra::memory`).
//!
//! Every write that must be audited takes its [`AuditEntry`] as an argument
//! and appends it in the same transaction as the write itself.

use chrono::{DateTime, Utc};

use crate::domain::entity::{AuditEntry, Membership, RefreshTokenRecord, User};
use crate::domain::value_object::{
    email::Email,
    ids::{OrganizationId, RefreshTokenId, UserId},
    username::Username,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and its registration audit entry atomically.
    ///
    /// Unique violations surface as `DuplicateEmail` / `DuplicateUsername`.
    async fn create(&self, user: &User, audit: &AuditEntry) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<User>>;
}

/// Refresh token repository trait
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    /// Insert a new record, with its audit entry when one is given.
    async fn create(
        &self,
        record: &RefreshTokenRecord,
        audit: Option<&AuditEntry>,
    ) -> AuthResult<()>;

    /// Usable records of a user, newest first, at most `limit`.
    async fn find_usable(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> AuthResult<Vec<RefreshTokenRecord>>;

    /// Revoke `id` if it is still usable, insert `replacement` and append
    /// `audit`, all in one transaction.
    ///
    /// Returns `false` (and writes nothing) when the record was already
    /// revoked or expired, e.g. by a concurrent rotation.
    async fn rotate(
        &self,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
        replacement: &RefreshTokenRecord,
        audit: &AuditEntry,
    ) -> AuthResult<bool>;

    /// Revoke `id` if it is still usable and append `audit`.
    ///
    /// Returns `false` (and writes nothing) when nothing was revoked.
    async fn revoke(
        &self,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
        audit: &AuditEntry,
    ) -> AuthResult<bool>;
}

/// Membership lookup
#[trait_variant::make(MembershipRepository: Send)]
pub trait LocalMembershipRepository {
    async fn find_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> AuthResult<Option<Membership>>;
}

/// Everything the auth HTTP surface needs from one store
pub trait AuthStore:
    UserRepository + RefreshTokenRepository + MembershipRepository + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository + RefreshTokenRepository + MembershipRepository + Send + Sync + 'static
{
}
