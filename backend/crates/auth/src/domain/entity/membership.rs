//! Membership Entity
//!
//! The (user, organization, role) authorization edge. At most one per pair.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_object::{
    ids::{MembershipId, OrganizationId, UserId},
    membership_role::{MembershipRole, RoleSet},
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user_id: UserId, organization_id: OrganizationId, role: MembershipRole) -> Self {
        Self {
            id: MembershipId::new(),
            user_id,
            organization_id,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn has_role(&self, allowed: RoleSet) -> bool {
        allowed.contains(self.role)
    }

    /// Fails with `InsufficientRole` when the role is not in `allowed`.
    pub fn ensure_role(&self, allowed: RoleSet) -> AuthResult<()> {
        if self.has_role(allowed) {
            Ok(())
        } else {
            Err(AuthError::InsufficientRole)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_role() {
        let staff = Membership::new(UserId::new(), OrganizationId::new(), MembershipRole::Staff);
        assert!(staff.ensure_role(RoleSet::STAFF_OR_ABOVE).is_ok());
        assert!(matches!(
            staff.ensure_role(RoleSet::MANAGERS),
            Err(AuthError::InsufficientRole)
        ));
    }
}
