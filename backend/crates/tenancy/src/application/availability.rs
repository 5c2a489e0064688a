//! Weekly Availability Use Case
//!
//! Rules are stored and validated only; slot computation happens elsewhere.

use std::sync::Arc;

use auth::models::{AuditAction, AuditEntry, Membership, RoleSet};
use chrono::Utc;
use kernel::patch::Changes;
use serde_json::json;

use crate::domain::entities::{WeeklyRule, WeeklyRulePatch};
use crate::domain::repository::{
    ServiceRepository, StaffRepository, WeeklyRuleQuery, WeeklyRuleRepository,
};
use crate::domain::value_objects::{
    MembershipId, ServiceId, SlotSize, TimeWindow, Weekday, WeeklyRuleId,
};
use crate::error::{TenancyError, TenancyResult};

const WEEKLY_RULE_ENTITY: &str = "WeeklyAvailabilityRule";

#[derive(Debug, Clone)]
pub struct ListWeeklyRulesInput {
    pub service_id: ServiceId,
    pub staff_member_id: Option<MembershipId>,
    pub weekday: Option<i16>,
}

#[derive(Debug, Clone)]
pub struct CreateWeeklyRuleInput {
    pub service_id: ServiceId,
    pub weekday: i16,
    pub start_min: i32,
    pub end_min: i32,
    pub slot_size_min: Option<i32>,
    pub staff_member_id: Option<MembershipId>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWeeklyRuleInput {
    pub weekday: Option<i16>,
    pub start_min: Option<i32>,
    pub end_min: Option<i32>,
    pub slot_size_min: Option<i32>,
    pub staff_member_id: Option<Option<MembershipId>>,
}

fn rule_meta(rule: &WeeklyRule) -> serde_json::Value {
    json!({
        "serviceId": rule.service_id.to_string(),
        "weekday": rule.weekday.get(),
        "startMin": rule.window.start(),
        "endMin": rule.window.end(),
        "staffMemberId": rule.staff_membership_id.map(|id| id.to_string()),
    })
}

pub struct Availability<R> {
    repo: Arc<R>,
}

impl<R> Availability<R>
where
    R: ServiceRepository + StaffRepository + WeeklyRuleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn require_service(&self, actor: &Membership, id: &ServiceId) -> TenancyResult<()> {
        self.repo
            .find_service(&actor.organization_id, id)
            .await?
            .map(|_| ())
            .ok_or(TenancyError::ServiceNotFound)
    }

    /// The member must belong to the organization, must not be a customer
    /// and must be assigned to the service.
    async fn require_assigned_staff(
        &self,
        actor: &Membership,
        service_id: &ServiceId,
        membership_id: &MembershipId,
    ) -> TenancyResult<()> {
        let member = self
            .repo
            .find_member(&actor.organization_id, membership_id)
            .await?
            .ok_or(TenancyError::MemberNotFound)?;
        if !member.is_assignable() {
            return Err(TenancyError::NotAssignable);
        }
        self.repo
            .find_assignment(&actor.organization_id, service_id, membership_id)
            .await?
            .map(|_| ())
            .ok_or(TenancyError::StaffNotAssigned)
    }

    async fn require_rule(&self, actor: &Membership, id: &WeeklyRuleId) -> TenancyResult<WeeklyRule> {
        self.repo
            .find_rule(&actor.organization_id, id)
            .await?
            .ok_or(TenancyError::WeeklyRuleNotFound)
    }

    pub async fn list(
        &self,
        actor: &Membership,
        input: ListWeeklyRulesInput,
    ) -> TenancyResult<Vec<WeeklyRule>> {
        actor.ensure_role(RoleSet::STAFF_OR_ABOVE)?;

        let weekday = input
            .weekday
            .map(Weekday::new)
            .transpose()
            .map_err(TenancyError::validation)?;
        self.require_service(actor, &input.service_id).await?;

        let query = WeeklyRuleQuery {
            service_id: input.service_id,
            staff_membership_id: input.staff_member_id,
            weekday,
        };
        self.repo.list_rules(&actor.organization_id, &query).await
    }

    pub async fn create(
        &self,
        actor: &Membership,
        input: CreateWeeklyRuleInput,
    ) -> TenancyResult<WeeklyRule> {
        actor.ensure_role(RoleSet::MANAGERS)?;

        let weekday = Weekday::new(input.weekday).map_err(TenancyError::validation)?;
        let window =
            TimeWindow::new(input.start_min, input.end_min).map_err(TenancyError::validation)?;
        let slot_size = input
            .slot_size_min
            .map(SlotSize::new)
            .transpose()
            .map_err(TenancyError::validation)?
            .unwrap_or_default();

        self.require_service(actor, &input.service_id).await?;
        if let Some(membership_id) = &input.staff_member_id {
            self.require_assigned_staff(actor, &input.service_id, membership_id)
                .await?;
        }

        let rule = WeeklyRule::new(
            actor.organization_id,
            input.service_id,
            input.staff_member_id,
            weekday,
            window,
            slot_size,
        );
        let audit = AuditEntry::record(
            AuditAction::Create,
            actor.user_id,
            Some(actor.organization_id),
            WEEKLY_RULE_ENTITY,
            rule.id,
            rule_meta(&rule),
        );

        self.repo.create_rule(&rule, &audit).await?;

        tracing::info!(rule_id = %rule.id, service_id = %rule.service_id, "Weekly rule created");
        Ok(rule)
    }

    pub async fn update(
        &self,
        actor: &Membership,
        id: &WeeklyRuleId,
        input: UpdateWeeklyRuleInput,
    ) -> TenancyResult<WeeklyRule> {
        actor.ensure_role(RoleSet::MANAGERS)?;

        let patch = WeeklyRulePatch {
            weekday: input
                .weekday
                .map(Weekday::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            start: input.start_min,
            end: input.end_min,
            slot_size: input
                .slot_size_min
                .map(SlotSize::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            staff_membership_id: input.staff_member_id,
        };
        let changes = Changes::new(patch)?;

        let current = self.require_rule(actor, id).await?;
        current
            .merged(changes.patch(), Utc::now())
            .map_err(TenancyError::validation)?;
        if let Some(Some(membership_id)) = &changes.patch().staff_membership_id {
            self.require_assigned_staff(actor, &current.service_id, membership_id)
                .await?;
        }

        let audit = AuditEntry::record(
            AuditAction::Update,
            actor.user_id,
            Some(actor.organization_id),
            WEEKLY_RULE_ENTITY,
            id,
            json!({ "fields": changes.fields() }),
        );
        let rule = self
            .repo
            .update_rule(&actor.organization_id, id, &changes, &audit)
            .await?
            .ok_or(TenancyError::WeeklyRuleNotFound)?;

        tracing::info!(rule_id = %id, fields = ?changes.fields(), "Weekly rule updated");
        Ok(rule)
    }

    pub async fn delete(&self, actor: &Membership, id: &WeeklyRuleId) -> TenancyResult<()> {
        actor.ensure_role(RoleSet::MANAGERS)?;

        let rule = self.require_rule(actor, id).await?;
        let audit = AuditEntry::record(
            AuditAction::Delete,
            actor.user_id,
            Some(actor.organization_id),
            WEEKLY_RULE_ENTITY,
            id,
            rule_meta(&rule),
        );

        if !self
            .repo
            .delete_rule(&actor.organization_id, id, &audit)
            .await?
        {
            return Err(TenancyError::WeeklyRuleNotFound);
        }

        tracing::info!(rule_id = %id, "Weekly rule deleted");
        Ok(())
    }
}
