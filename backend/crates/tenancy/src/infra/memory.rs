//! In-memory Repository Implementations
//!
//! Tenant tables sit behind their own mutex; memberships and audit entries
//! live in the shared [`InMemoryAuthStore`]. Writes lock the auth tables
//! first, then the tenant tables, so each repository method stays one
//! atomic step.

use std::sync::Arc;

use auth::InMemoryAuthStore;
use auth::infra::memory::AuthTables;
use auth::models::{AuditEntry, Membership};
use chrono::Utc;
use kernel::patch::Changes;
use tokio::sync::Mutex;

use crate::domain::entities::{
    AssignedStaff, MemberOrganization, Organization, OrganizationPatch, Service, ServicePatch,
    ServiceStaff, StaffMember, StatusChange, WeeklyRule, WeeklyRulePatch,
};
use crate::domain::repository::{
    OrganizationRepository, ServicePage, ServiceQuery, ServiceRepository, StaffRepository,
    WeeklyRuleQuery, WeeklyRuleRepository,
};
use crate::domain::value_objects::{
    MembershipId, OrganizationId, ServiceId, ServiceStatus, Slug, UserId, WeeklyRuleId,
};
use crate::error::{TenancyError, TenancyResult};

/// Rows of the tenant tables
#[derive(Debug, Default)]
pub struct TenancyTables {
    pub organizations: Vec<Organization>,
    pub services: Vec<Service>,
    pub service_staff: Vec<ServiceStaff>,
    pub weekly_rules: Vec<WeeklyRule>,
}

/// Tenant check shared by the update paths: `Ok(None)` for an unknown id,
/// `CrossTenantWrite` for a row of another organization.
fn owned_by<'a, T>(
    row: Option<&'a mut T>,
    owner: impl Fn(&T) -> OrganizationId,
    organization_id: &OrganizationId,
) -> TenancyResult<Option<&'a mut T>> {
    match row {
        None => Ok(None),
        Some(row) if owner(&*row) == *organization_id => Ok(Some(row)),
        Some(row) => {
            tracing::error!(
                row_organization_id = %owner(&*row),
                tenant_organization_id = %organization_id,
                "Cross-tenant write blocked"
            );
            Err(TenancyError::cross_tenant())
        }
    }
}

fn staff_member(
    auth: &AuthTables,
    organization_id: &OrganizationId,
    id: &MembershipId,
) -> Option<StaffMember> {
    auth.memberships
        .iter()
        .find(|m| m.id == *id && m.organization_id == *organization_id)
        .map(|m| StaffMember {
            membership_id: m.id,
            user_id: m.user_id,
            role: m.role,
        })
}

/// In-memory tenancy store
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenancyStore {
    auth: InMemoryAuthStore,
    tables: Arc<Mutex<TenancyTables>>,
}

impl InMemoryTenancyStore {
    /// Store sharing memberships and audit entries with `auth`.
    pub fn new(auth: InMemoryAuthStore) -> Self {
        Self {
            auth,
            tables: Arc::default(),
        }
    }

    pub fn auth(&self) -> &InMemoryAuthStore {
        &self.auth
    }
}

// ============================================================================
// Organization Repository Implementation
// ============================================================================

impl OrganizationRepository for InMemoryTenancyStore {
    async fn create(
        &self,
        organization: &Organization,
        owner: &Membership,
        audit: &AuditEntry,
    ) -> TenancyResult<()> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        if tables
            .organizations
            .iter()
            .any(|o| o.slug == organization.slug)
        {
            return Err(TenancyError::SlugTaken);
        }
        if auth.membership(&owner.user_id, &owner.organization_id).is_some() {
            return Err(TenancyError::Internal("Duplicate membership".to_string()));
        }

        tables.organizations.push(organization.clone());
        auth.memberships.push(owner.clone());
        auth.audit_logs.push(audit.clone());
        Ok(())
    }

    async fn slug_exists(&self, slug: &Slug) -> TenancyResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.organizations.iter().any(|o| o.slug == *slug))
    }

    async fn find_organization(&self, id: &OrganizationId) -> TenancyResult<Option<Organization>> {
        let tables = self.tables.lock().await;
        Ok(tables.organizations.iter().find(|o| o.id == *id).cloned())
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
        is_active: Option<bool>,
    ) -> TenancyResult<Vec<MemberOrganization>> {
        let auth = self.auth.lock().await;
        let tables = self.tables.lock().await;

        let mut items: Vec<_> = auth
            .memberships
            .iter()
            .filter(|m| m.user_id == *user_id)
            .filter_map(|m| {
                tables
                    .organizations
                    .iter()
                    .find(|o| o.id == m.organization_id)
                    .filter(|o| is_active.is_none_or(|active| o.is_active == active))
                    .map(|o| MemberOrganization {
                        organization: o.clone(),
                        role: m.role,
                    })
            })
            .collect();
        items.sort_by(|a, b| b.organization.created_at.cmp(&a.organization.created_at));
        Ok(items)
    }

    async fn update_organization(
        &self,
        id: &OrganizationId,
        changes: &Changes<OrganizationPatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<Organization>> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        if let Some(slug) = &changes.patch().slug {
            if tables
                .organizations
                .iter()
                .any(|o| o.slug == *slug && o.id != *id)
            {
                return Err(TenancyError::SlugTaken);
            }
        }

        let Some(organization) = tables.organizations.iter_mut().find(|o| o.id == *id) else {
            return Ok(None);
        };
        organization.apply(changes.patch(), Utc::now());
        let updated = organization.clone();

        auth.audit_logs.push(audit.clone());
        Ok(Some(updated))
    }
}

// ============================================================================
// Service Repository Implementation
// ============================================================================

impl ServiceRepository for InMemoryTenancyStore {
    async fn list_services(
        &self,
        organization_id: &OrganizationId,
        query: &ServiceQuery,
    ) -> TenancyResult<ServicePage> {
        let tables = self.tables.lock().await;

        let mut matching: Vec<_> = tables
            .services
            .iter()
            .filter(|s| s.organization_id == *organization_id)
            .filter(|s| query.status.is_none_or(|status| s.status == status))
            .filter(|s| query.q.as_deref().is_none_or(|q| s.name.matches(q)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.skip as usize)
            .take(query.take as usize)
            .collect();

        Ok(ServicePage { items, total })
    }

    async fn find_service(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
    ) -> TenancyResult<Option<Service>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .services
            .iter()
            .find(|s| s.id == *id && s.organization_id == *organization_id)
            .cloned())
    }

    async fn create_service(&self, service: &Service, audit: &AuditEntry) -> TenancyResult<()> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        tables.services.push(service.clone());
        auth.audit_logs.push(audit.clone());
        Ok(())
    }

    async fn update_service(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
        changes: &Changes<ServicePatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<Service>> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        let row = tables.services.iter_mut().find(|s| s.id == *id);
        let Some(service) = owned_by(row, |s| s.organization_id, organization_id)? else {
            return Ok(None);
        };
        service.apply(changes.patch(), Utc::now());
        let updated = service.clone();

        auth.audit_logs.push(audit.clone());
        Ok(Some(updated))
    }

    async fn set_service_status(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
        status: ServiceStatus,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<StatusChange>> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        let row = tables.services.iter_mut().find(|s| s.id == *id);
        let Some(service) = owned_by(row, |s| s.organization_id, organization_id)? else {
            return Ok(None);
        };
        let changed = service.set_status(status, Utc::now());
        let service = service.clone();

        if changed {
            auth.audit_logs.push(audit.clone());
        }
        Ok(Some(StatusChange { service, changed }))
    }
}

// ============================================================================
// Staff Repository Implementation
// ============================================================================

impl StaffRepository for InMemoryTenancyStore {
    async fn find_member(
        &self,
        organization_id: &OrganizationId,
        membership_id: &MembershipId,
    ) -> TenancyResult<Option<StaffMember>> {
        let auth = self.auth.lock().await;
        Ok(staff_member(&auth, organization_id, membership_id))
    }

    async fn list_staff(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
    ) -> TenancyResult<Vec<AssignedStaff>> {
        let auth = self.auth.lock().await;
        let tables = self.tables.lock().await;

        let mut links: Vec<_> = tables
            .service_staff
            .iter()
            .filter(|l| l.organization_id == *organization_id && l.service_id == *service_id)
            .filter_map(|l| {
                staff_member(&auth, organization_id, &l.membership_id).map(|member| AssignedStaff {
                    link: l.clone(),
                    member,
                })
            })
            .collect();
        links.sort_by(|a, b| a.link.created_at.cmp(&b.link.created_at));
        Ok(links)
    }

    async fn find_assignment(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
        membership_id: &MembershipId,
    ) -> TenancyResult<Option<ServiceStaff>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .service_staff
            .iter()
            .find(|l| {
                l.organization_id == *organization_id
                    && l.service_id == *service_id
                    && l.membership_id == *membership_id
            })
            .cloned())
    }

    async fn assign_staff(
        &self,
        link: &ServiceStaff,
        audit: &AuditEntry,
    ) -> TenancyResult<(ServiceStaff, bool)> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        if let Some(existing) = tables
            .service_staff
            .iter()
            .find(|l| l.service_id == link.service_id && l.membership_id == link.membership_id)
        {
            return Ok((existing.clone(), false));
        }

        tables.service_staff.push(link.clone());
        auth.audit_logs.push(audit.clone());
        Ok((link.clone(), true))
    }

    async fn unassign_staff(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
        membership_id: &MembershipId,
        audit: &AuditEntry,
    ) -> TenancyResult<bool> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        let before = tables.service_staff.len();
        tables.service_staff.retain(|l| {
            !(l.organization_id == *organization_id
                && l.service_id == *service_id
                && l.membership_id == *membership_id)
        });
        if tables.service_staff.len() == before {
            return Ok(false);
        }

        auth.audit_logs.push(audit.clone());
        Ok(true)
    }
}

// ============================================================================
// Weekly Rule Repository Implementation
// ============================================================================

impl WeeklyRuleRepository for InMemoryTenancyStore {
    async fn list_rules(
        &self,
        organization_id: &OrganizationId,
        query: &WeeklyRuleQuery,
    ) -> TenancyResult<Vec<WeeklyRule>> {
        let tables = self.tables.lock().await;

        let mut rules: Vec<_> = tables
            .weekly_rules
            .iter()
            .filter(|r| r.organization_id == *organization_id && r.service_id == query.service_id)
            .filter(|r| {
                query
                    .staff_membership_id
                    .is_none_or(|id| r.staff_membership_id == Some(id))
            })
            .filter(|r| query.weekday.is_none_or(|day| r.weekday == day))
            .cloned()
            .collect();
        rules.sort_by_key(|r| (r.weekday, r.window.start()));
        Ok(rules)
    }

    async fn find_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
    ) -> TenancyResult<Option<WeeklyRule>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .weekly_rules
            .iter()
            .find(|r| r.id == *id && r.organization_id == *organization_id)
            .cloned())
    }

    async fn create_rule(&self, rule: &WeeklyRule, audit: &AuditEntry) -> TenancyResult<()> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        tables.weekly_rules.push(rule.clone());
        auth.audit_logs.push(audit.clone());
        Ok(())
    }

    async fn update_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
        changes: &Changes<WeeklyRulePatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<WeeklyRule>> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        let row = tables.weekly_rules.iter_mut().find(|r| r.id == *id);
        let Some(rule) = owned_by(row, |r| r.organization_id, organization_id)? else {
            return Ok(None);
        };
        let merged = rule
            .merged(changes.patch(), Utc::now())
            .map_err(TenancyError::validation)?;
        *rule = merged.clone();

        auth.audit_logs.push(audit.clone());
        Ok(Some(merged))
    }

    async fn delete_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
        audit: &AuditEntry,
    ) -> TenancyResult<bool> {
        let mut auth = self.auth.lock().await;
        let mut tables = self.tables.lock().await;

        let before = tables.weekly_rules.len();
        tables
            .weekly_rules
            .retain(|r| !(r.id == *id && r.organization_id == *organization_id));
        if tables.weekly_rules.len() == before {
            return Ok(false);
        }

        auth.audit_logs.push(audit.clone());
        Ok(true)
    }
}
