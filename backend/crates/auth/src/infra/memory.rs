//! In-memory Repository Implementations
//!
//! All tables sit behind one async mutex, so every repository method is a
//! single atomic step. Conditional revocation and duplicate checks behave
//! like their Postgres counterparts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::entity::{AuditEntry, Membership, RefreshTokenRecord, User};
use crate::domain::repository::{MembershipRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    ids::{OrganizationId, RefreshTokenId, UserId},
    user_status::UserStatus,
    username::Username,
};
use crate::error::{AuthError, AuthResult};

/// Rows of the auth tables
#[derive(Debug, Default)]
pub struct AuthTables {
    pub users: Vec<User>,
    pub refresh_tokens: Vec<RefreshTokenRecord>,
    pub memberships: Vec<Membership>,
    pub audit_logs: Vec<AuditEntry>,
}

impl AuthTables {
    fn revoke_if_usable(&mut self, id: &RefreshTokenId, now: DateTime<Utc>) -> bool {
        match self
            .refresh_tokens
            .iter_mut()
            .find(|r| r.id == *id && r.is_usable(now))
        {
            Some(record) => {
                record.revoked_at = Some(now);
                true
            }
            None => false,
        }
    }

    pub fn membership(&self, user_id: &UserId, organization_id: &OrganizationId) -> Option<&Membership> {
        self.memberships
            .iter()
            .find(|m| m.user_id == *user_id && m.organization_id == *organization_id)
    }
}

/// In-memory auth store
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthStore {
    tables: Arc<Mutex<AuthTables>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the tables. Other domains use this to run their own writes in
    /// the same atomic step as the auth rows they touch.
    pub async fn lock(&self) -> MutexGuard<'_, AuthTables> {
        self.tables.lock().await
    }

    /// Insert a membership. Fails with `Internal` on a duplicate pair.
    pub async fn insert_membership(&self, membership: Membership) -> AuthResult<()> {
        let mut tables = self.tables.lock().await;
        if tables
            .membership(&membership.user_id, &membership.organization_id)
            .is_some()
        {
            return Err(AuthError::Internal("Duplicate membership".to_string()));
        }
        tables.memberships.push(membership);
        Ok(())
    }

    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.tables.lock().await.audit_logs.clone()
    }

    pub async fn refresh_records(&self, user_id: &UserId) -> Vec<RefreshTokenRecord> {
        self.tables
            .lock()
            .await
            .refresh_tokens
            .iter()
            .filter(|r| r.user_id == *user_id)
            .cloned()
            .collect()
    }

    pub async fn set_user_status(&self, user_id: &UserId, status: UserStatus) {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == *user_id) {
            user.status = status;
            user.updated_at = Utc::now();
        }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for InMemoryAuthStore {
    async fn create(&self, user: &User, audit: &AuditEntry) -> AuthResult<()> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        if let Some(username) = &user.username
            && tables
                .users
                .iter()
                .any(|u| u.username.as_ref() == Some(username))
        {
            return Err(AuthError::DuplicateUsername);
        }

        tables.users.push(user.clone());
        tables.audit_logs.push(audit.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == *user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == *email).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username.as_ref() == Some(username))
            .cloned())
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

impl RefreshTokenRepository for InMemoryAuthStore {
    async fn create(
        &self,
        record: &RefreshTokenRecord,
        audit: Option<&AuditEntry>,
    ) -> AuthResult<()> {
        let mut tables = self.tables.lock().await;
        tables.refresh_tokens.push(record.clone());
        if let Some(audit) = audit {
            tables.audit_logs.push(audit.clone());
        }
        Ok(())
    }

    async fn find_usable(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> AuthResult<Vec<RefreshTokenRecord>> {
        let tables = self.tables.lock().await;
        let mut records: Vec<_> = tables
            .refresh_tokens
            .iter()
            .filter(|r| r.user_id == *user_id && r.is_usable(now))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn rotate(
        &self,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
        replacement: &RefreshTokenRecord,
        audit: &AuditEntry,
    ) -> AuthResult<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.revoke_if_usable(id, now) {
            return Ok(false);
        }
        tables.refresh_tokens.push(replacement.clone());
        tables.audit_logs.push(audit.clone());
        Ok(true)
    }

    async fn revoke(
        &self,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
        audit: &AuditEntry,
    ) -> AuthResult<bool> {
        let mut tables = self.tables.lock().await;
        if !tables.revoke_if_usable(id, now) {
            return Ok(false);
        }
        tables.audit_logs.push(audit.clone());
        Ok(true)
    }
}

// ============================================================================
// Membership Repository Implementation
// ============================================================================

impl MembershipRepository for InMemoryAuthStore {
    async fn find_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> AuthResult<Option<Membership>> {
        let tables = self.tables.lock().await;
        Ok(tables.membership(user_id, organization_id).cloned())
    }
}
