//! Domain Entities
//!
//! Tenant-scoped entities and the partial updates that apply to them.
//! Every entity below carries its `organization_id`; repositories filter on
//! it for every read and re-check it for every write.

use auth::models::MembershipRole;
use chrono::{DateTime, Utc};
use kernel::error::app_error::AppResult;
use kernel::patch::Patch;

use crate::domain::value_objects::{
    Currency, Description, DurationMinutes, MembershipId, OrganizationId, OrganizationName,
    PriceCents, ServiceId, ServiceName, ServiceStaffId, ServiceStatus, SlotSize, Slug, TimeWindow,
    Timezone, UserId, Weekday, WeeklyRuleId,
};

// ============================================================================
// Organization
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: OrganizationName,
    pub slug: Slug,
    pub timezone: Timezone,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: OrganizationName, slug: Slug, timezone: Timezone) -> Self {
        let now = Utc::now();
        Self {
            id: OrganizationId::new(),
            name,
            slug,
            timezone,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &OrganizationPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(timezone) = &patch.timezone {
            self.timezone = timezone.clone();
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationPatch {
    pub name: Option<OrganizationName>,
    pub slug: Option<Slug>,
    pub timezone: Option<Timezone>,
    pub is_active: Option<bool>,
}

impl Patch for OrganizationPatch {
    fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.slug.is_some() {
            fields.push("slug");
        }
        if self.timezone.is_some() {
            fields.push("timezone");
        }
        if self.is_active.is_some() {
            fields.push("isActive");
        }
        fields
    }
}

/// An organization together with the caller's role in it
#[derive(Debug, Clone)]
pub struct MemberOrganization {
    pub organization: Organization,
    pub role: MembershipRole,
}

// ============================================================================
// Service
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,
    pub organization_id: OrganizationId,
    pub name: ServiceName,
    pub description: Option<Description>,
    pub duration: DurationMinutes,
    pub price: PriceCents,
    pub currency: Currency,
    pub status: ServiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(
        organization_id: OrganizationId,
        name: ServiceName,
        description: Option<Description>,
        duration: DurationMinutes,
        price: PriceCents,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            organization_id,
            name,
            description,
            duration,
            price,
            currency,
            status: ServiceStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &ServicePatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(currency) = &patch.currency {
            self.currency = currency.clone();
        }
        self.updated_at = now;
    }

    /// Returns `false` when the service already had `status`.
    pub fn set_status(&mut self, status: ServiceStatus, now: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.updated_at = now;
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub name: Option<ServiceName>,
    /// `Some(None)` clears the description
    pub description: Option<Option<Description>>,
    pub duration: Option<DurationMinutes>,
    pub price: Option<PriceCents>,
    pub currency: Option<Currency>,
}

impl Patch for ServicePatch {
    fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.duration.is_some() {
            fields.push("durationMin");
        }
        if self.price.is_some() {
            fields.push("priceCents");
        }
        if self.currency.is_some() {
            fields.push("currency");
        }
        fields
    }
}

/// Result of an enable / disable request
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub service: Service,
    pub changed: bool,
}

// ============================================================================
// Staff
// ============================================================================

/// Link between a service and a staff membership of the same organization
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStaff {
    pub id: ServiceStaffId,
    pub organization_id: OrganizationId,
    pub service_id: ServiceId,
    pub membership_id: MembershipId,
    pub created_at: DateTime<Utc>,
}

impl ServiceStaff {
    pub fn new(
        organization_id: OrganizationId,
        service_id: ServiceId,
        membership_id: MembershipId,
    ) -> Self {
        Self {
            id: ServiceStaffId::new(),
            organization_id,
            service_id,
            membership_id,
            created_at: Utc::now(),
        }
    }
}

/// A membership seen from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub membership_id: MembershipId,
    pub user_id: UserId,
    pub role: MembershipRole,
}

impl StaffMember {
    pub fn is_assignable(&self) -> bool {
        self.role != MembershipRole::Customer
    }
}

#[derive(Debug, Clone)]
pub struct AssignedStaff {
    pub link: ServiceStaff,
    pub member: StaffMember,
}

// ============================================================================
// Weekly availability
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRule {
    pub id: WeeklyRuleId,
    pub organization_id: OrganizationId,
    pub service_id: ServiceId,
    /// `None` applies to every staff member of the service
    pub staff_membership_id: Option<MembershipId>,
    pub weekday: Weekday,
    pub window: TimeWindow,
    pub slot_size: SlotSize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklyRule {
    pub fn new(
        organization_id: OrganizationId,
        service_id: ServiceId,
        staff_membership_id: Option<MembershipId>,
        weekday: Weekday,
        window: TimeWindow,
        slot_size: SlotSize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WeeklyRuleId::new(),
            organization_id,
            service_id,
            staff_membership_id,
            weekday,
            window,
            slot_size,
            created_at: now,
            updated_at: now,
        }
    }

    /// The rule after `patch`. Fails when the merged window is invalid.
    pub fn merged(&self, patch: &WeeklyRulePatch, now: DateTime<Utc>) -> AppResult<Self> {
        let window = TimeWindow::new(
            patch.start.unwrap_or(self.window.start()),
            patch.end.unwrap_or(self.window.end()),
        )?;
        Ok(Self {
            weekday: patch.weekday.unwrap_or(self.weekday),
            window,
            slot_size: patch.slot_size.unwrap_or(self.slot_size),
            staff_membership_id: patch
                .staff_membership_id
                .unwrap_or(self.staff_membership_id),
            updated_at: now,
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeeklyRulePatch {
    pub weekday: Option<Weekday>,
    pub start: Option<i32>,
    pub end: Option<i32>,
    pub slot_size: Option<SlotSize>,
    /// `Some(None)` turns the rule into a service-wide rule
    pub staff_membership_id: Option<Option<MembershipId>>,
}

impl Patch for WeeklyRulePatch {
    fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.weekday.is_some() {
            fields.push("weekday");
        }
        if self.start.is_some() {
            fields.push("startMin");
        }
        if self.end.is_some() {
            fields.push("endMin");
        }
        if self.slot_size.is_some() {
            fields.push("slotSizeMin");
        }
        if self.staff_membership_id.is_some() {
            fields.push("staffMemberId");
        }
        fields
    }
}
