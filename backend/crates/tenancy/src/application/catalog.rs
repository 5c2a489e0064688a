//! Service Catalog Use Case
//!
//! Services and their staff assignments. Every operation receives the
//! membership the gate resolved for the tenant header and re-checks its
//! role before touching tenant data.

use std::sync::Arc;

use auth::models::{AuditAction, AuditEntry, Membership, RoleSet};
use kernel::patch::Changes;
use serde_json::json;

use crate::application::config::TenancyConfig;
use crate::domain::entities::{AssignedStaff, Service, ServicePatch, ServiceStaff, StatusChange};
use crate::domain::repository::{ServiceQuery, ServiceRepository, StaffRepository};
use crate::domain::value_objects::{
    Currency, Description, DurationMinutes, MembershipId, PriceCents, ServiceId, ServiceName,
    ServiceStatus,
};
use crate::error::{TenancyError, TenancyResult};

const SERVICE_ENTITY: &str = "Service";
const SERVICE_STAFF_ENTITY: &str = "ServiceStaff";

#[derive(Debug, Clone, Default)]
pub struct ListServicesInput {
    pub status: Option<ServiceStatus>,
    pub q: Option<String>,
    pub take: Option<u32>,
    pub skip: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ServiceList {
    pub items: Vec<Service>,
    pub total: u64,
    pub take: u32,
    pub skip: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CreateServiceInput {
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateServiceInput {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub duration_min: Option<i32>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
}

impl UpdateServiceInput {
    fn into_patch(self) -> TenancyResult<ServicePatch> {
        Ok(ServicePatch {
            name: self
                .name
                .as_deref()
                .map(ServiceName::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            description: self
                .description
                .map(|d| Description::parse_optional(d.as_deref()))
                .transpose()
                .map_err(TenancyError::validation)?,
            duration: self
                .duration_min
                .map(DurationMinutes::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            price: self
                .price_cents
                .map(PriceCents::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            currency: self
                .currency
                .as_deref()
                .map(Currency::new)
                .transpose()
                .map_err(TenancyError::validation)?,
        })
    }
}

pub struct Catalog<R> {
    repo: Arc<R>,
    config: Arc<TenancyConfig>,
}

impl<R> Catalog<R>
where
    R: ServiceRepository + StaffRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<TenancyConfig>) -> Self {
        Self { repo, config }
    }

    async fn require_service(&self, actor: &Membership, id: &ServiceId) -> TenancyResult<Service> {
        self.repo
            .find_service(&actor.organization_id, id)
            .await?
            .ok_or(TenancyError::ServiceNotFound)
    }

    // ========================================================================
    // Services
    // ========================================================================

    pub async fn list(
        &self,
        actor: &Membership,
        input: ListServicesInput,
    ) -> TenancyResult<ServiceList> {
        actor.ensure_role(RoleSet::STAFF_OR_ABOVE)?;

        let (take, skip) = self.config.paging(input.take, input.skip)?;
        let query = ServiceQuery {
            status: input.status,
            q: input.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
            take,
            skip,
        };
        let page = self
            .repo
            .list_services(&actor.organization_id, &query)
            .await?;

        Ok(ServiceList {
            items: page.items,
            total: page.total,
            take,
            skip,
        })
    }

    pub async fn get(&self, actor: &Membership, id: &ServiceId) -> TenancyResult<Service> {
        actor.ensure_role(RoleSet::STAFF_OR_ABOVE)?;
        self.require_service(actor, id).await
    }

    pub async fn create(
        &self,
        actor: &Membership,
        input: CreateServiceInput,
    ) -> TenancyResult<Service> {
        actor.ensure_role(RoleSet::MANAGERS)?;

        let service = Service::new(
            actor.organization_id,
            ServiceName::new(&input.name).map_err(TenancyError::validation)?,
            Description::parse_optional(input.description.as_deref())
                .map_err(TenancyError::validation)?,
            DurationMinutes::new(input.duration_min).map_err(TenancyError::validation)?,
            PriceCents::new(input.price_cents.unwrap_or(0)).map_err(TenancyError::validation)?,
            match input.currency.as_deref() {
                Some(raw) => Currency::new(raw).map_err(TenancyError::validation)?,
                None => Currency::default(),
            },
        );
        let audit = AuditEntry::record(
            AuditAction::Create,
            actor.user_id,
            Some(actor.organization_id),
            SERVICE_ENTITY,
            service.id,
            json!({
                "name": service.name.as_str(),
                "durationMin": service.duration.get(),
                "priceCents": service.price.get(),
                "currency": service.currency.as_str(),
            }),
        );

        self.repo.create_service(&service, &audit).await?;

        tracing::info!(
            organization_id = %actor.organization_id,
            service_id = %service.id,
            "Service created"
        );
        Ok(service)
    }

    pub async fn update(
        &self,
        actor: &Membership,
        id: &ServiceId,
        input: UpdateServiceInput,
    ) -> TenancyResult<Service> {
        actor.ensure_role(RoleSet::MANAGERS)?;

        let changes = Changes::new(input.into_patch()?)?;
        self.require_service(actor, id).await?;

        let audit = AuditEntry::record(
            AuditAction::Update,
            actor.user_id,
            Some(actor.organization_id),
            SERVICE_ENTITY,
            id,
            json!({ "fields": changes.fields() }),
        );
        let service = self
            .repo
            .update_service(&actor.organization_id, id, &changes, &audit)
            .await?
            .ok_or(TenancyError::ServiceNotFound)?;

        tracing::info!(service_id = %id, fields = ?changes.fields(), "Service updated");
        Ok(service)
    }

    pub async fn disable(&self, actor: &Membership, id: &ServiceId) -> TenancyResult<Service> {
        self.set_status(actor, id, ServiceStatus::Disabled).await
    }

    pub async fn enable(&self, actor: &Membership, id: &ServiceId) -> TenancyResult<Service> {
        self.set_status(actor, id, ServiceStatus::Active).await
    }

    async fn set_status(
        &self,
        actor: &Membership,
        id: &ServiceId,
        status: ServiceStatus,
    ) -> TenancyResult<Service> {
        actor.ensure_role(RoleSet::MANAGERS)?;

        let audit = AuditEntry::record(
            AuditAction::Update,
            actor.user_id,
            Some(actor.organization_id),
            SERVICE_ENTITY,
            id,
            json!({ "status": status.code() }),
        );
        let StatusChange { service, changed } = self
            .repo
            .set_service_status(&actor.organization_id, id, status, &audit)
            .await?
            .ok_or(TenancyError::ServiceNotFound)?;

        if changed {
            tracing::info!(service_id = %id, status = %status, "Service status changed");
        }
        Ok(service)
    }

    // ========================================================================
    // Staff
    // ========================================================================

    pub async fn list_staff(
        &self,
        actor: &Membership,
        service_id: &ServiceId,
    ) -> TenancyResult<Vec<AssignedStaff>> {
        actor.ensure_role(RoleSet::STAFF_OR_ABOVE)?;
        self.require_service(actor, service_id).await?;
        self.repo
            .list_staff(&actor.organization_id, service_id)
            .await
    }

    pub async fn assign_staff(
        &self,
        actor: &Membership,
        service_id: &ServiceId,
        membership_id: &MembershipId,
    ) -> TenancyResult<AssignedStaff> {
        actor.ensure_role(RoleSet::MANAGERS)?;
        self.require_service(actor, service_id).await?;

        let member = self
            .repo
            .find_member(&actor.organization_id, membership_id)
            .await?
            .ok_or(TenancyError::MemberNotFound)?;
        if !member.is_assignable() {
            return Err(TenancyError::NotAssignable);
        }

        let link = ServiceStaff::new(actor.organization_id, *service_id, *membership_id);
        let audit = AuditEntry::record(
            AuditAction::Create,
            actor.user_id,
            Some(actor.organization_id),
            SERVICE_STAFF_ENTITY,
            link.id,
            json!({
                "serviceId": service_id.to_string(),
                "memberId": membership_id.to_string(),
            }),
        );

        let (link, inserted) = self.repo.assign_staff(&link, &audit).await?;
        if inserted {
            tracing::info!(service_id = %service_id, membership_id = %membership_id, "Staff assigned");
        }
        Ok(AssignedStaff { link, member })
    }

    pub async fn unassign_staff(
        &self,
        actor: &Membership,
        service_id: &ServiceId,
        membership_id: &MembershipId,
    ) -> TenancyResult<()> {
        actor.ensure_role(RoleSet::MANAGERS)?;
        self.require_service(actor, service_id).await?;

        let link = self
            .repo
            .find_assignment(&actor.organization_id, service_id, membership_id)
            .await?
            .ok_or(TenancyError::StaffAssignmentNotFound)?;
        let audit = AuditEntry::record(
            AuditAction::Delete,
            actor.user_id,
            Some(actor.organization_id),
            SERVICE_STAFF_ENTITY,
            link.id,
            json!({
                "serviceId": service_id.to_string(),
                "memberId": membership_id.to_string(),
            }),
        );

        if !self
            .repo
            .unassign_staff(&actor.organization_id, service_id, membership_id, &audit)
            .await?
        {
            return Err(TenancyError::StaffAssignmentNotFound);
        }

        tracing::info!(service_id = %service_id, membership_id = %membership_id, "Staff unassigned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_validates_each_field() {
        let input = UpdateServiceInput {
            duration_min: Some(2),
            ..Default::default()
        };
        assert!(matches!(input.into_patch(), Err(TenancyError::Validation(_))));

        let input = UpdateServiceInput {
            description: Some(None),
            currency: Some("usd".into()),
            ..Default::default()
        };
        let patch = input.into_patch().unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.currency.unwrap().as_str(), "USD");
    }

    #[test]
    fn test_blank_description_clears() {
        let input = UpdateServiceInput {
            description: Some(Some("  ".into())),
            ..Default::default()
        };
        assert_eq!(input.into_patch().unwrap().description, Some(None));
    }
}
