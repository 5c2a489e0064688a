//! Audit Log Entry
//!
//! Immutable record of an accepted state change. Entries are built before
//! the mutation and handed to the repository method that performs it; the
//! repository appends the entry in the same transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_object::ids::{AuditEntryId, OrganizationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Register,
    Login,
    Logout,
    Rotate,
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Register => "REGISTER",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Rotate => "ROTATE",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub action: AuditAction,
    pub actor_id: UserId,
    /// `None` for actions outside any tenant (register, login, ...)
    pub organization_id: Option<OrganizationId>,
    pub entity_type: &'static str,
    pub entity_id: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn record(
        action: AuditAction,
        actor_id: UserId,
        organization_id: Option<OrganizationId>,
        entity_type: &'static str,
        entity_id: impl ToString,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            action,
            actor_id,
            organization_id,
            entity_type,
            entity_id: entity_id.to_string(),
            metadata,
            created_at: Utc::now(),
        }
    }
}
