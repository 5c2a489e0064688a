//! Membership Role Value Objects
//!
//! A membership carries exactly one role per (user, organization) pair.
//! Operations declare the roles they accept as a [`RoleSet`].

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// MembershipRole
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i16)]
pub enum MembershipRole {
    #[display("OWNER")]
    Owner = 0,
    #[display("ADMIN")]
    Admin = 1,
    #[display("STAFF")]
    Staff = 2,
    #[display("CUSTOMER")]
    Customer = 3,
}

impl MembershipRole {
    pub const ALL: [MembershipRole; 4] = [Self::Owner, Self::Admin, Self::Staff, Self::Customer];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Customer => "CUSTOMER",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

// ============================================================================
// RoleSet
// ============================================================================

/// Set of roles accepted by an operation
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: Self = Self(0);

    /// Organization owner only (archive, unarchive)
    pub const OWNER: Self = Self::EMPTY.with(MembershipRole::Owner);

    /// Owner or admin (writes to tenant data)
    pub const MANAGERS: Self = Self::OWNER.with(MembershipRole::Admin);

    /// Everyone except customers (reads of tenant data)
    pub const STAFF_OR_ABOVE: Self = Self::MANAGERS.with(MembershipRole::Staff);

    #[inline]
    pub const fn with(self, role: MembershipRole) -> Self {
        Self(self.0 | role.bit())
    }

    #[inline]
    pub const fn contains(self, role: MembershipRole) -> bool {
        self.0 & role.bit() != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn of(roles: &[MembershipRole]) -> Self {
        roles.iter().fold(Self::EMPTY, |set, role| set.with(*role))
    }

    pub fn iter(self) -> impl Iterator<Item = MembershipRole> {
        MembershipRole::ALL
            .into_iter()
            .filter(move |role| self.contains(*role))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|r| r.code())).finish()
    }
}
