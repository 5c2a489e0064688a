//! Domain Layer
//!
//! Contains entities, value objects, domain services, and repository traits.

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;

// Re-exports
pub use entities::{
    AssignedStaff, MemberOrganization, Organization, OrganizationPatch, Service, ServicePatch,
    ServiceStaff, StaffMember, StatusChange, WeeklyRule, WeeklyRulePatch,
};
pub use repository::{
    Memberships, OrganizationRepository, ServicePage, ServiceQuery, ServiceRepository, StaffRepository,
    TenancyStore, WeeklyRuleQuery, WeeklyRuleRepository,
};
