//! Membership Authorizer
//!
//! Read-only checks of the (user, organization, role) edge. Every
//! organization-scoped operation runs one of these before touching tenant
//! data, even behind a role-guarded route.

use std::sync::Arc;

use crate::domain::entity::Membership;
use crate::domain::repository::MembershipRepository;
use crate::domain::value_object::{
    ids::{OrganizationId, UserId},
    membership_role::RoleSet,
};
use crate::error::{AuthError, AuthResult};

pub struct MembershipAuthorizer<M> {
    repo: Arc<M>,
}

impl<M> Clone for MembershipAuthorizer<M> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<M: MembershipRepository> MembershipAuthorizer<M> {
    pub fn new(repo: Arc<M>) -> Self {
        Self { repo }
    }

    /// Fails with `NotMember` when the pair has no membership.
    pub async fn require_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> AuthResult<Membership> {
        self.repo
            .find_membership(user_id, organization_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %user_id, organization_id = %organization_id, "Not a member");
                AuthError::NotMember
            })
    }

    /// Fails with `NotMember`, then with `InsufficientRole` when the role is
    /// not in `allowed`.
    pub async fn require_role(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
        allowed: RoleSet,
    ) -> AuthResult<Membership> {
        let membership = self.require_membership(user_id, organization_id).await?;
        if let Err(err) = membership.ensure_role(allowed) {
            tracing::debug!(
                user_id = %user_id,
                organization_id = %organization_id,
                role = %membership.role,
                allowed = ?allowed,
                "Insufficient role"
            );
            return Err(err);
        }
        Ok(membership)
    }

    /// `true` when the user is a member holding one of `allowed`.
    pub async fn has_role(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
        allowed: RoleSet,
    ) -> AuthResult<bool> {
        Ok(self
            .repo
            .find_membership(user_id, organization_id)
            .await?
            .is_some_and(|m| m.has_role(allowed)))
    }
}
