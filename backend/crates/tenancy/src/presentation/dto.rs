//! API DTOs (Data Transfer Objects)

use auth::models::MembershipRole;
use chrono::{DateTime, Utc};
use kernel::patch::nullable;
use serde::{Deserialize, Serialize};

use crate::application::{
    CreateOrganizationInput, CreateServiceInput, CreateWeeklyRuleInput, ListServicesInput,
    ListWeeklyRulesInput, ServiceList, UpdateOrganizationInput, UpdateServiceInput,
    UpdateWeeklyRuleInput,
};
use crate::domain::entities::{AssignedStaff, MemberOrganization, Organization, Service, WeeklyRule};
use crate::domain::value_objects::{
    MembershipId, OrganizationId, ServiceId, ServiceStaffId, ServiceStatus, UserId, WeeklyRuleId,
};

// ============================================================================
// Organizations
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub slug: Option<String>,
    pub timezone: Option<String>,
}

impl From<CreateOrganizationRequest> for CreateOrganizationInput {
    fn from(req: CreateOrganizationRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            timezone: req.timezone,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrganizationsQuery {
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateOrganizationRequest> for UpdateOrganizationInput {
    fn from(req: UpdateOrganizationRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
            timezone: req.timezone,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: OrganizationId,
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MembershipRole>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.as_str().to_string(),
            slug: org.slug.as_str().to_string(),
            timezone: org.timezone.as_str().to_string(),
            is_active: org.is_active,
            role: None,
            created_at: org.created_at,
            updated_at: org.updated_at,
        }
    }
}

impl From<MemberOrganization> for OrganizationResponse {
    fn from(item: MemberOrganization) -> Self {
        Self {
            role: Some(item.role),
            ..item.organization.into()
        }
    }
}

// ============================================================================
// Services
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesQuery {
    pub status: Option<ServiceStatus>,
    pub q: Option<String>,
    pub take: Option<u32>,
    pub skip: Option<u32>,
}

impl From<ListServicesQuery> for ListServicesInput {
    fn from(query: ListServicesQuery) -> Self {
        Self {
            status: query.status,
            q: query.q,
            take: query.take,
            skip: query.skip,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
}

impl From<CreateServiceRequest> for CreateServiceInput {
    fn from(req: CreateServiceRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            duration_min: req.duration_min,
            price_cents: req.price_cents,
            currency: req.currency,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    /// `null` clears the description, an absent key leaves it unchanged
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub duration_min: Option<i32>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
}

impl From<UpdateServiceRequest> for UpdateServiceInput {
    fn from(req: UpdateServiceRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            duration_min: req.duration_min,
            price_cents: req.price_cents,
            currency: req.currency,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: ServiceId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub price_cents: i64,
    pub currency: String,
    pub status: ServiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            organization_id: service.organization_id,
            name: service.name.as_str().to_string(),
            description: service.description.map(|d| d.as_str().to_string()),
            duration_min: service.duration.get(),
            price_cents: service.price.get(),
            currency: service.currency.as_str().to_string(),
            status: service.status,
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListResponse {
    pub items: Vec<ServiceResponse>,
    pub total: u64,
    pub take: u32,
    pub skip: u32,
}

impl From<ServiceList> for ServiceListResponse {
    fn from(list: ServiceList) -> Self {
        Self {
            items: list.items.into_iter().map(Into::into).collect(),
            total: list.total,
            take: list.take,
            skip: list.skip,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffRequest {
    pub member_id: MembershipId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStaffResponse {
    pub id: ServiceStaffId,
    pub service_id: ServiceId,
    pub member_id: MembershipId,
    pub user_id: UserId,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
}

impl From<AssignedStaff> for ServiceStaffResponse {
    fn from(staff: AssignedStaff) -> Self {
        Self {
            id: staff.link.id,
            service_id: staff.link.service_id,
            member_id: staff.member.membership_id,
            user_id: staff.member.user_id,
            role: staff.member.role,
            created_at: staff.link.created_at,
        }
    }
}

// ============================================================================
// Weekly availability
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWeeklyRulesQuery {
    pub service_id: ServiceId,
    pub staff_member_id: Option<MembershipId>,
    pub weekday: Option<i16>,
}

impl From<ListWeeklyRulesQuery> for ListWeeklyRulesInput {
    fn from(query: ListWeeklyRulesQuery) -> Self {
        Self {
            service_id: query.service_id,
            staff_member_id: query.staff_member_id,
            weekday: query.weekday,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWeeklyRuleRequest {
    pub service_id: ServiceId,
    pub weekday: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub slot_size_min: Option<i32>,
    pub staff_member_id: Option<MembershipId>,
}

impl From<CreateWeeklyRuleRequest> for CreateWeeklyRuleInput {
    fn from(req: CreateWeeklyRuleRequest) -> Self {
        Self {
            service_id: req.service_id,
            weekday: req.weekday,
            start_min: req.start_min,
            end_min: req.end_min,
            slot_size_min: req.slot_size_min,
            staff_member_id: req.staff_member_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeeklyRuleRequest {
    pub weekday: Option<i16>,
    pub start_min: Option<i32>,
    pub end_min: Option<i32>,
    pub slot_size_min: Option<i32>,
    /// `null` makes the rule apply to every staff member
    #[serde(default, deserialize_with = "nullable")]
    pub staff_member_id: Option<Option<MembershipId>>,
}

impl From<UpdateWeeklyRuleRequest> for UpdateWeeklyRuleInput {
    fn from(req: UpdateWeeklyRuleRequest) -> Self {
        Self {
            weekday: req.weekday,
            start_min: req.start_min,
            end_min: req.end_min,
            slot_size_min: req.slot_size_min,
            staff_member_id: req.staff_member_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRuleResponse {
    pub id: WeeklyRuleId,
    pub service_id: ServiceId,
    pub staff_member_id: Option<MembershipId>,
    pub weekday: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub slot_size_min: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WeeklyRule> for WeeklyRuleResponse {
    fn from(rule: WeeklyRule) -> Self {
        Self {
            id: rule.id,
            service_id: rule.service_id,
            staff_member_id: rule.staff_membership_id,
            weekday: rule.weekday.get(),
            start_min: rule.window.start(),
            end_min: rule.window.end(),
            slot_size_min: rule.slot_size.get(),
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }
}
