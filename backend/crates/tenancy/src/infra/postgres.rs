//! PostgreSQL Repository Implementations

use auth::infra::postgres::{MembershipRow, append_audit, insert_membership};
use auth::models::{AuditEntry, Membership, MembershipRole};
use chrono::{DateTime, Utc};
use kernel::patch::Changes;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{
    AssignedStaff, MemberOrganization, Organization, OrganizationPatch, Service, ServicePatch,
    ServiceStaff, StaffMember, StatusChange, WeeklyRule, WeeklyRulePatch,
};
use crate::domain::repository::{
    OrganizationRepository, ServicePage, ServiceQuery, ServiceRepository, StaffRepository,
    WeeklyRuleQuery, WeeklyRuleRepository,
};
use crate::domain::value_objects::{
    Currency, Description, DurationMinutes, MembershipId, OrganizationId, OrganizationName,
    PriceCents, ServiceId, ServiceName, ServiceStaffId, ServiceStatus, SlotSize, Slug, TimeWindow,
    Timezone, UserId, Weekday, WeeklyRuleId,
};
use crate::error::{TenancyError, TenancyResult};

const ORGANIZATION_COLUMNS: &str = "id, name, slug, timezone, is_active, created_at, updated_at";
const SERVICE_COLUMNS: &str = "id, organization_id, name, description, duration_min, price_cents, \
     currency, status, created_at, updated_at";
const SERVICE_STAFF_COLUMNS: &str = "id, organization_id, service_id, membership_id, created_at";
const WEEKLY_RULE_COLUMNS: &str = "id, organization_id, service_id, staff_membership_id, weekday, \
     start_min, end_min, slot_size_min, created_at, updated_at";

/// PostgreSQL-backed tenancy repository
#[derive(Clone)]
pub struct PgTenancyRepository {
    pool: PgPool,
}

impl PgTenancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map the organization slug unique violation to `SlugTaken`.
fn map_organization_write_error(err: sqlx::Error) -> TenancyError {
    if let sqlx::Error::Database(db) = &err {
        if db.constraint() == Some("organizations_slug_key") {
            return TenancyError::SlugTaken;
        }
    }
    TenancyError::Database(err)
}

/// Lock the row `id` of `table` and check that it belongs to
/// `organization_id`.
///
/// `Ok(false)` when the row does not exist. A row owned by another
/// organization is an integrity fault: `CrossTenantWrite`.
async fn lock_tenant_row(
    conn: &mut PgConnection,
    table: &'static str,
    id: Uuid,
    organization_id: &OrganizationId,
) -> TenancyResult<bool> {
    let owner: Option<Uuid> = sqlx::query_scalar(&format!(
        "SELECT organization_id FROM {table} WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match owner {
        None => Ok(false),
        Some(owner) if owner == *organization_id.as_uuid() => Ok(true),
        Some(owner) => {
            tracing::error!(
                table,
                row_id = %id,
                row_organization_id = %owner,
                tenant_organization_id = %organization_id,
                "Cross-tenant write blocked"
            );
            Err(TenancyError::cross_tenant())
        }
    }
}

/// `%` and `_` in user input match literally.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// ============================================================================
// Organization Repository Implementation
// ============================================================================

impl OrganizationRepository for PgTenancyRepository {
    async fn create(
        &self,
        organization: &Organization,
        owner: &Membership,
        audit: &AuditEntry,
    ) -> TenancyResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, slug, timezone, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(organization.id.as_uuid())
        .bind(organization.name.as_str())
        .bind(organization.slug.as_str())
        .bind(organization.timezone.as_str())
        .bind(organization.is_active)
        .bind(organization.created_at)
        .bind(organization.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_organization_write_error)?;

        insert_membership(&mut tx, owner).await?;
        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn slug_exists(&self, slug: &Slug) -> TenancyResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM organizations WHERE slug = $1)")
                .bind(slug.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_organization(&self, id: &OrganizationId) -> TenancyResult<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrganizationRow::into_organization))
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
        is_active: Option<bool>,
    ) -> TenancyResult<Vec<MemberOrganization>> {
        let rows = sqlx::query_as::<_, MemberOrganizationRow>(
            r#"
            SELECT
                o.id,
                o.name,
                o.slug,
                o.timezone,
                o.is_active,
                o.created_at,
                o.updated_at,
                m.role
            FROM organizations o
            JOIN memberships m ON m.organization_id = o.id
            WHERE m.user_id = $1
              AND ($2::boolean IS NULL OR o.is_active = $2)
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(is_active)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(MemberOrganizationRow::into_member_organization)
            .collect()
    }

    async fn update_organization(
        &self,
        id: &OrganizationId,
        changes: &Changes<OrganizationPatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<Organization>> {
        let patch = changes.patch();
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE organizations SET ");
        let mut set = qb.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.as_str().to_string());
        }
        if let Some(slug) = &patch.slug {
            set.push("slug = ").push_bind_unseparated(slug.as_str().to_string());
        }
        if let Some(timezone) = &patch.timezone {
            set.push("timezone = ")
                .push_bind_unseparated(timezone.as_str().to_string());
        }
        if let Some(is_active) = patch.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ")
            .push_bind(id.into_uuid())
            .push(format!(" RETURNING {ORGANIZATION_COLUMNS}"));

        let mut tx = self.pool.begin().await?;
        let row = qb
            .build_query_as::<OrganizationRow>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_organization_write_error)?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(Some(row.into_organization()))
    }
}

// ============================================================================
// Service Repository Implementation
// ============================================================================

impl ServiceRepository for PgTenancyRepository {
    async fn list_services(
        &self,
        organization_id: &OrganizationId,
        query: &ServiceQuery,
    ) -> TenancyResult<ServicePage> {
        let status = query.status.map(|s| s.code());
        let pattern = query.q.as_deref().map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM services
            WHERE organization_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(status)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
            SELECT {SERVICE_COLUMNS}
            FROM services
            WHERE organization_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(organization_id.as_uuid())
        .bind(status)
        .bind(pattern.as_deref())
        .bind(i64::from(query.take))
        .bind(i64::from(query.skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(ServicePage {
            items: rows
                .into_iter()
                .map(ServiceRow::into_service)
                .collect::<TenancyResult<_>>()?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn find_service(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
    ) -> TenancyResult<Option<Service>> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1 AND organization_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ServiceRow::into_service).transpose()
    }

    async fn create_service(&self, service: &Service, audit: &AuditEntry) -> TenancyResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO services (
                id,
                organization_id,
                name,
                description,
                duration_min,
                price_cents,
                currency,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(service.id.as_uuid())
        .bind(service.organization_id.as_uuid())
        .bind(service.name.as_str())
        .bind(service.description.as_ref().map(|d| d.as_str()))
        .bind(service.duration.get())
        .bind(service.price.get())
        .bind(service.currency.as_str())
        .bind(service.status.code())
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&mut *tx)
        .await?;

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn update_service(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
        changes: &Changes<ServicePatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<Service>> {
        let patch = changes.patch();
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE services SET ");
        let mut set = qb.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ").push_bind_unseparated(name.as_str().to_string());
        }
        if let Some(description) = &patch.description {
            set.push("description = ")
                .push_bind_unseparated(description.as_ref().map(|d| d.as_str().to_string()));
        }
        if let Some(duration) = patch.duration {
            set.push("duration_min = ").push_bind_unseparated(duration.get());
        }
        if let Some(price) = patch.price {
            set.push("price_cents = ").push_bind_unseparated(price.get());
        }
        if let Some(currency) = &patch.currency {
            set.push("currency = ")
                .push_bind_unseparated(currency.as_str().to_string());
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ")
            .push_bind(id.into_uuid())
            .push(" AND organization_id = ")
            .push_bind(organization_id.into_uuid())
            .push(format!(" RETURNING {SERVICE_COLUMNS}"));

        let mut tx = self.pool.begin().await?;
        if !lock_tenant_row(&mut tx, "services", id.into_uuid(), organization_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = qb
            .build_query_as::<ServiceRow>()
            .fetch_one(&mut *tx)
            .await?;

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        row.into_service().map(Some)
    }

    async fn set_service_status(
        &self,
        organization_id: &OrganizationId,
        id: &ServiceId,
        status: ServiceStatus,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<StatusChange>> {
        let mut tx = self.pool.begin().await?;
        if !lock_tenant_row(&mut tx, "services", id.into_uuid(), organization_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, ServiceRow>(&format!(
            r#"
            UPDATE services
            SET status = $1, updated_at = $2
            WHERE id = $3 AND organization_id = $4 AND status <> $1
            RETURNING {SERVICE_COLUMNS}
            "#
        ))
        .bind(status.code())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let (row, changed) = match updated {
            Some(row) => {
                append_audit(&mut tx, audit).await?;
                (row, true)
            }
            None => {
                let row = sqlx::query_as::<_, ServiceRow>(&format!(
                    "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
                ))
                .bind(id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
                (row, false)
            }
        };
        tx.commit().await?;

        Ok(Some(StatusChange {
            service: row.into_service()?,
            changed,
        }))
    }
}

// ============================================================================
// Staff Repository Implementation
// ============================================================================

impl StaffRepository for PgTenancyRepository {
    async fn find_member(
        &self,
        organization_id: &OrganizationId,
        membership_id: &MembershipId,
    ) -> TenancyResult<Option<StaffMember>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, user_id, organization_id, role, created_at
            FROM memberships
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(membership_id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let membership = row.into_membership()?;
        Ok(Some(StaffMember {
            membership_id: membership.id,
            user_id: membership.user_id,
            role: membership.role,
        }))
    }

    async fn list_staff(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
    ) -> TenancyResult<Vec<AssignedStaff>> {
        let rows = sqlx::query_as::<_, AssignedStaffRow>(
            r#"
            SELECT
                s.id,
                s.organization_id,
                s.service_id,
                s.membership_id,
                s.created_at,
                m.user_id,
                m.role
            FROM service_staff s
            JOIN memberships m ON m.id = s.membership_id
            WHERE s.organization_id = $1 AND s.service_id = $2
            ORDER BY s.created_at ASC
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(service_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AssignedStaffRow::into_assigned).collect()
    }

    async fn find_assignment(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
        membership_id: &MembershipId,
    ) -> TenancyResult<Option<ServiceStaff>> {
        let row = sqlx::query_as::<_, ServiceStaffRow>(&format!(
            r#"
            SELECT {SERVICE_STAFF_COLUMNS}
            FROM service_staff
            WHERE organization_id = $1 AND service_id = $2 AND membership_id = $3
            "#
        ))
        .bind(organization_id.as_uuid())
        .bind(service_id.as_uuid())
        .bind(membership_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ServiceStaffRow::into_link))
    }

    async fn assign_staff(
        &self,
        link: &ServiceStaff,
        audit: &AuditEntry,
    ) -> TenancyResult<(ServiceStaff, bool)> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, ServiceStaffRow>(&format!(
            r#"
            INSERT INTO service_staff (id, organization_id, service_id, membership_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (service_id, membership_id) DO NOTHING
            RETURNING {SERVICE_STAFF_COLUMNS}
            "#
        ))
        .bind(link.id.as_uuid())
        .bind(link.organization_id.as_uuid())
        .bind(link.service_id.as_uuid())
        .bind(link.membership_id.as_uuid())
        .bind(link.created_at)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(row) => {
                append_audit(&mut tx, audit).await?;
                (row.into_link(), true)
            }
            None => {
                let row = sqlx::query_as::<_, ServiceStaffRow>(&format!(
                    r#"
                    SELECT {SERVICE_STAFF_COLUMNS}
                    FROM service_staff
                    WHERE service_id = $1 AND membership_id = $2
                    "#
                ))
                .bind(link.service_id.as_uuid())
                .bind(link.membership_id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
                (row.into_link(), false)
            }
        };
        tx.commit().await?;

        Ok(result)
    }

    async fn unassign_staff(
        &self,
        organization_id: &OrganizationId,
        service_id: &ServiceId,
        membership_id: &MembershipId,
        audit: &AuditEntry,
    ) -> TenancyResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            DELETE FROM service_staff
            WHERE organization_id = $1 AND service_id = $2 AND membership_id = $3
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(service_id.as_uuid())
        .bind(membership_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(true)
    }
}

// ============================================================================
// Weekly Rule Repository Implementation
// ============================================================================

impl WeeklyRuleRepository for PgTenancyRepository {
    async fn list_rules(
        &self,
        organization_id: &OrganizationId,
        query: &WeeklyRuleQuery,
    ) -> TenancyResult<Vec<WeeklyRule>> {
        let rows = sqlx::query_as::<_, WeeklyRuleRow>(&format!(
            r#"
            SELECT {WEEKLY_RULE_COLUMNS}
            FROM weekly_availability_rules
            WHERE organization_id = $1
              AND service_id = $2
              AND ($3::uuid IS NULL OR staff_membership_id = $3)
              AND ($4::smallint IS NULL OR weekday = $4)
            ORDER BY weekday ASC, start_min ASC
            "#
        ))
        .bind(organization_id.as_uuid())
        .bind(query.service_id.as_uuid())
        .bind(query.staff_membership_id.map(|id| id.into_uuid()))
        .bind(query.weekday.map(|d| d.get()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WeeklyRuleRow::into_rule).collect())
    }

    async fn find_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
    ) -> TenancyResult<Option<WeeklyRule>> {
        let row = sqlx::query_as::<_, WeeklyRuleRow>(&format!(
            r#"
            SELECT {WEEKLY_RULE_COLUMNS}
            FROM weekly_availability_rules
            WHERE id = $1 AND organization_id = $2
            "#
        ))
        .bind(id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(WeeklyRuleRow::into_rule))
    }

    async fn create_rule(&self, rule: &WeeklyRule, audit: &AuditEntry) -> TenancyResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO weekly_availability_rules (
                id,
                organization_id,
                service_id,
                staff_membership_id,
                weekday,
                start_min,
                end_min,
                slot_size_min,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(rule.id.as_uuid())
        .bind(rule.organization_id.as_uuid())
        .bind(rule.service_id.as_uuid())
        .bind(rule.staff_membership_id.map(|id| id.into_uuid()))
        .bind(rule.weekday.get())
        .bind(rule.window.start())
        .bind(rule.window.end())
        .bind(rule.slot_size.get())
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(&mut *tx)
        .await?;

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn update_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
        changes: &Changes<WeeklyRulePatch>,
        audit: &AuditEntry,
    ) -> TenancyResult<Option<WeeklyRule>> {
        let patch = changes.patch();
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE weekly_availability_rules SET ");
        let mut set = qb.separated(", ");
        if let Some(weekday) = patch.weekday {
            set.push("weekday = ").push_bind_unseparated(weekday.get());
        }
        if let Some(start) = patch.start {
            set.push("start_min = ").push_bind_unseparated(start);
        }
        if let Some(end) = patch.end {
            set.push("end_min = ").push_bind_unseparated(end);
        }
        if let Some(slot_size) = patch.slot_size {
            set.push("slot_size_min = ").push_bind_unseparated(slot_size.get());
        }
        if let Some(staff) = patch.staff_membership_id {
            set.push("staff_membership_id = ")
                .push_bind_unseparated(staff.map(|id| id.into_uuid()));
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ")
            .push_bind(id.into_uuid())
            .push(" AND organization_id = ")
            .push_bind(organization_id.into_uuid())
            .push(format!(" RETURNING {WEEKLY_RULE_COLUMNS}"));

        let mut tx = self.pool.begin().await?;
        if !lock_tenant_row(
            &mut tx,
            "weekly_availability_rules",
            id.into_uuid(),
            organization_id,
        )
        .await?
        {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = qb
            .build_query_as::<WeeklyRuleRow>()
            .fetch_one(&mut *tx)
            .await?;

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(Some(row.into_rule()))
    }

    async fn delete_rule(
        &self,
        organization_id: &OrganizationId,
        id: &WeeklyRuleId,
        audit: &AuditEntry,
    ) -> TenancyResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM weekly_availability_rules WHERE id = $1 AND organization_id = $2",
        )
        .bind(id.as_uuid())
        .bind(organization_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(true)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    slug: String,
    timezone: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self) -> Organization {
        Organization {
            id: OrganizationId::from_uuid(self.id),
            name: OrganizationName::from_db(self.name),
            slug: Slug::from_db(self.slug),
            timezone: Timezone::from_db(self.timezone),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberOrganizationRow {
    #[sqlx(flatten)]
    organization: OrganizationRow,
    role: String,
}

impl MemberOrganizationRow {
    fn into_member_organization(self) -> TenancyResult<MemberOrganization> {
        let role = MembershipRole::from_code(&self.role)
            .ok_or_else(|| TenancyError::Internal(format!("Invalid membership role: {}", self.role)))?;
        Ok(MemberOrganization {
            organization: self.organization.into_organization(),
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    description: Option<String>,
    duration_min: i32,
    price_cents: i64,
    currency: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> TenancyResult<Service> {
        let status = ServiceStatus::from_code(&self.status)
            .ok_or_else(|| TenancyError::Internal(format!("Invalid service status: {}", self.status)))?;

        Ok(Service {
            id: ServiceId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            name: ServiceName::from_db(self.name),
            description: self.description.map(Description::from_db),
            duration: DurationMinutes::from_db(self.duration_min),
            price: PriceCents::from_db(self.price_cents),
            currency: Currency::from_db(self.currency),
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ServiceStaffRow {
    id: Uuid,
    organization_id: Uuid,
    service_id: Uuid,
    membership_id: Uuid,
    created_at: DateTime<Utc>,
}

impl ServiceStaffRow {
    fn into_link(self) -> ServiceStaff {
        ServiceStaff {
            id: ServiceStaffId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            service_id: ServiceId::from_uuid(self.service_id),
            membership_id: MembershipId::from_uuid(self.membership_id),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignedStaffRow {
    #[sqlx(flatten)]
    link: ServiceStaffRow,
    user_id: Uuid,
    role: String,
}

impl AssignedStaffRow {
    fn into_assigned(self) -> TenancyResult<AssignedStaff> {
        let role = MembershipRole::from_code(&self.role)
            .ok_or_else(|| TenancyError::Internal(format!("Invalid membership role: {}", self.role)))?;
        let link = self.link.into_link();
        Ok(AssignedStaff {
            member: StaffMember {
                membership_id: link.membership_id,
                user_id: UserId::from_uuid(self.user_id),
                role,
            },
            link,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WeeklyRuleRow {
    id: Uuid,
    organization_id: Uuid,
    service_id: Uuid,
    staff_membership_id: Option<Uuid>,
    weekday: i16,
    start_min: i32,
    end_min: i32,
    slot_size_min: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WeeklyRuleRow {
    fn into_rule(self) -> WeeklyRule {
        WeeklyRule {
            id: WeeklyRuleId::from_uuid(self.id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            service_id: ServiceId::from_uuid(self.service_id),
            staff_membership_id: self.staff_membership_id.map(MembershipId::from_uuid),
            weekday: Weekday::from_db(self.weekday),
            window: TimeWindow::from_db(self.start_min, self.end_min),
            slot_size: SlotSize::from_db(self.slot_size_min),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
