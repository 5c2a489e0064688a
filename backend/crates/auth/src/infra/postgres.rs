//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::entity::{AuditEntry, Membership, RefreshTokenRecord, User};
use crate::domain::repository::{MembershipRepository, RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    full_name::FullName,
    ids::{MembershipId, OrganizationId, RefreshTokenId, UserId},
    membership_role::MembershipRole,
    user_status::UserStatus,
    username::Username,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// Shared writes (also used by other domains inside their own transactions)
// ============================================================================

/// Append an audit entry on the given connection or transaction.
pub async fn append_audit(conn: &mut PgConnection, entry: &AuditEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (
            id,
            action,
            actor_user_id,
            organization_id,
            entity_type,
            entity_id,
            meta,
            created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.action.code())
    .bind(entry.actor_id.as_uuid())
    .bind(entry.organization_id.map(|id| id.into_uuid()))
    .bind(entry.entity_type)
    .bind(&entry.entity_id)
    .bind(&entry.metadata)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert a membership on the given connection or transaction.
pub async fn insert_membership(
    conn: &mut PgConnection,
    membership: &Membership,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO memberships (id, user_id, organization_id, role, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(membership.id.as_uuid())
    .bind(membership.user_id.as_uuid())
    .bind(membership.organization_id.as_uuid())
    .bind(membership.role.code())
    .bind(membership.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Map unique violations on the users table to domain errors.
fn map_user_write_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err {
        match db.constraint() {
            Some("users_email_key") => return AuthError::DuplicateEmail,
            Some("users_username_key") => return AuthError::DuplicateUsername,
            _ => {}
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User, audit: &AuditEntry) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                username,
                full_name,
                password_hash,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.username.as_ref().map(|u| u.as_str()))
        .bind(user.full_name.as_ref().map(|n| n.as_str()))
        .bind(&user.password_hash)
        .bind(user.status.code())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_user_write_error)?;

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, full_name, password_hash, status, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, full_name, password_hash, status, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, full_name, password_hash, status, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

async fn insert_refresh_token(
    conn: &mut PgConnection,
    record: &RefreshTokenRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(record.user_id.as_uuid())
    .bind(&record.token_hash)
    .bind(record.expires_at)
    .bind(record.revoked_at)
    .bind(record.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Conditional revocation. Affects one row only if the record is still usable.
async fn revoke_if_usable(
    conn: &mut PgConnection,
    id: &RefreshTokenId,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked_at = $2
        WHERE id = $1
          AND revoked_at IS NULL
          AND expires_at > $2
        "#,
    )
    .bind(id.as_uuid())
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(affected == 1)
}

impl RefreshTokenRepository for PgAuthRepository {
    async fn create(
        &self,
        record: &RefreshTokenRecord,
        audit: Option<&AuditEntry>,
    ) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_refresh_token(&mut tx, record).await?;
        if let Some(audit) = audit {
            append_audit(&mut tx, audit).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_usable(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
        limit: u32,
    ) -> AuthResult<Vec<RefreshTokenRecord>> {
        let rows = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked_at, created_at
            FROM refresh_tokens
            WHERE user_id = $1
              AND revoked_at IS NULL
              AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RefreshTokenRow::into_record).collect())
    }

    async fn rotate(
        &self,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
        replacement: &RefreshTokenRecord,
        audit: &AuditEntry,
    ) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        if !revoke_if_usable(&mut tx, id, now).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_refresh_token(&mut tx, replacement).await?;
        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn revoke(
        &self,
        id: &RefreshTokenId,
        now: DateTime<Utc>,
        audit: &AuditEntry,
    ) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        if !revoke_if_usable(&mut tx, id, now).await? {
            tx.rollback().await?;
            return Ok(false);
        }

        append_audit(&mut tx, audit).await?;
        tx.commit().await?;

        Ok(true)
    }
}

// ============================================================================
// Membership Repository Implementation
// ============================================================================

impl MembershipRepository for PgAuthRepository {
    async fn find_membership(
        &self,
        user_id: &UserId,
        organization_id: &OrganizationId,
    ) -> AuthResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, user_id, organization_id, role, created_at
            FROM memberships
            WHERE user_id = $1 AND organization_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_membership()).transpose()
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: Option<String>,
    full_name: Option<String>,
    password_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let status = UserStatus::from_code(&self.status)
            .ok_or_else(|| AuthError::Internal(format!("Invalid user status: {}", self.status)))?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            username: self.username.map(Username::from_db),
            full_name: self.full_name.map(FullName::from_db),
            password_hash: self.password_hash,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl RefreshTokenRow {
    fn into_record(self) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id: RefreshTokenId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            revoked_at: self.revoked_at,
            created_at: self.created_at,
        }
    }
}

/// Membership row, shared with other domains that read memberships
#[derive(sqlx::FromRow)]
pub struct MembershipRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl MembershipRow {
    pub fn into_membership(self) -> AuthResult<Membership> {
        let role = MembershipRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid membership role: {}", self.role)))?;

        Ok(Membership {
            id: MembershipId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            organization_id: OrganizationId::from_uuid(self.organization_id),
            role,
            created_at: self.created_at,
        })
    }
}
