//! Repository Traits
//!
//! Every tenant-scoped read filters on the organization id. Every write that
//! must be audited takes its [`AuditEntry`] and appends it in the same
//! transaction as the write.

use auth::domain::repository::MembershipRepository;
use auth::models::{AuditEntry, Membership};
use kernel::patch::Changes;

use crate::domain::entities::{
    AssignedStaff, MemberOrganization, Organization, OrganizationPatch, Service, ServicePatch,
    ServiceStaff, StaffMember, StatusChange, WeeklyRule, WeeklyRulePatch,
};
use crate::domain::value_objects::{
    MembershipId, OrganizationId, ServiceId, ServiceStatus, Slug, UserId, Weekday, WeeklyRuleId,
};
use crate::error::TenancyResult;

/// Filters and paging for the service list
#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub status: Option<ServiceStatus>,
    /// Case-insensitive name substring
    pub q: Option<String>,
    pub take: u32,
    pub skip: u32,
}

/// A page of services plus the total matching count
#[derive(Debug, Clone)]
pub struct ServicePage {
    pub items: Vec<Service>,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct WeeklyRuleQuery {
    pub service_id: ServiceId,
    pub staff_membership_id: Option<MembershipId>,
    pub weekday: Option<Weekday>,
}

/// Organization repository trait
#[trait_variant::make(OrganizationRepository: Send)]
pub trait LocalOrganizationRepository {
    /// Insert the organization, the creator's OWNER membership and the
    /// audit entry in one unit of work. A taken slug fails with `SlugTaken`.
    async fn create(
        &self,
        organization: &Organization,
        owner: &Membership,
        audit: &AuditEntry,
    ) -> TenancyResult<()>;

    async fn slug_exists(&self, slug: &Slug) -> TenancyResult<bool>;

    async fn find_organization(&self, id: &OrganizationId) -> TenancyResult<Option<Organization>>;

    /// Organizations `user_id` belongs to, newest first.
    async fn list_for_member(
        &self,
        user_id: &UserId,
        is_active: Option<bool>,
    ) -> TenancyResult<Vec<MemberOrganization>>;

    /// Apply `changes` and append `audit`. `None` when the row is gone.
    async fn update_organization(
        &self,
        id: &OrganizationId,
        changes: &Changes<OrganizationPatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<Organization>>;
}

/// Service catalog repository trait
#[trait_variant::make(ServiceRepository: Send)]
pub trait LocalServiceRepository {
    async fn list_services(
        &self,
        organization_id: &OrganizationId,
        query: &ServiceQuery,
    ) -> TenancyResult<ServicePage>;

    async fn find_service(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
    ) -> TenancyResult<Option<Service>>;

    async fn create_service(&self, service: &Service, audit: &AuditEntry) -> TenancyResult<()>;

    /// Apply `changes` to the service and append `audit`.
    ///
    /// The row's organization is re-read inside the transaction; a mismatch
    /// with `organization_id` rolls back and fails with `CrossTenantWrite`.
    async fn update_service(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
        changes: &Changes<ServicePatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<Service>>;

    /// Set the status. `audit` is appended only when the status changes.
    async fn set_service_status(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
        status: ServiceStatus,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<StatusChange>>;
}

/// Service staff repository trait
#[trait_variant::make(StaffRepository: Send)]
pub trait LocalStaffRepository {
    /// Membership `membership_id` if it belongs to `organization_id`.
    async fn find_member(
        &self,
        organization_id: &OrganizationId,
        membership_id: &MembershipId,
    ) -> TenancyResult<Option<StaffMember>>;

    async fn list_staff(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
    ) -> TenancyResult<Vec<AssignedStaff>>;

    async fn find_assignment(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
        membership_id: &MembershipId,
    ) -> TenancyResult<Option<ServiceStaff>>;

    /// Insert the link unless it exists. Returns the stored link and whether
    /// it was inserted; `audit` is appended only on insert.
    async fn assign_staff(
        &self,
        link: &ServiceStaff,
        audit: &AuditEntry,
    ) -> TenancyResult<(ServiceStaff, bool)>;

    /// Delete the link and append `audit`. `false` when there was none.
    async fn unassign_staff(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
        membership_id: &MembershipId,
        audit: &AuditEntry,
    ) -> TenancyResult<bool>;
}

/// Weekly availability repository trait
#[trait_variant::make(WeeklyRuleRepository: Send)]
pub trait LocalWeeklyRuleRepository {
    /// Rules of one service ordered by weekday, then start.
    async fn list_rules(
        &self,
        organization_id: &OrganizationId,
        query: &WeeklyRuleQuery,
    ) -> TenancyResult<Vec<WeeklyRule>>;

    async fn find_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
    ) -> TenancyResult<Option<WeeklyRule>>;

    async fn create_rule(&self, rule: &WeeklyRule, audit: &AuditEntry) -> TenancyResult<()>;

    /// Apply `changes` and append `audit`, with the same cross-tenant check
    /// as [`LocalServiceRepository::update_service`].
    async fn update_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
        changes: &Changes<WeeklyRulePatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<WeeklyRule>>;

    /// Delete and append `audit`. `false` when there was nothing to delete.
    async fn delete_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
        audit: &AuditEntry,
    ) -> TenancyResult<bool>;
}

/// Everything the tenancy routers need from one store
pub trait TenancyStore:
    OrganizationRepository
    + ServiceRepository
    + StaffRepository
    + WeeklyRuleRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> TenancyStore for T where
    T: OrganizationRepository
        + ServiceRepository
        + StaffRepository
        + WeeklyRuleRepository
        + Send
        + Sync
        + 'static
{
}

/// Membership lookups shared with the authorization gate
pub trait Memberships: MembershipRepository + Send + Sync + 'static {}

impl<T> Memberships for T where T: MembershipRepository + Send + Sync + 'static {}
