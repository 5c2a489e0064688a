//! Organizations Use Case
//!
//! Organization routes only require authentication; the organization comes
//! from the path, so every operation runs its own membership check.

use std::sync::Arc;

use auth::application::MembershipAuthorizer;
use auth::domain::repository::MembershipRepository;
use auth::models::{AuditAction, AuditEntry, Membership, MembershipRole, RoleSet};
use kernel::patch::Changes;
use serde_json::json;

use crate::application::config::TenancyConfig;
use crate::domain::entities::{MemberOrganization, Organization, OrganizationPatch};
use crate::domain::repository::OrganizationRepository;
use crate::domain::services::{slug_candidates, slugify};
use crate::domain::value_objects::{OrganizationId, OrganizationName, Slug, Timezone, UserId};
use crate::error::{TenancyError, TenancyResult};

const ORGANIZATION_ENTITY: &str = "Organization";

#[derive(Debug, Clone, Default)]
pub struct CreateOrganizationInput {
    pub name: String,
    pub slug: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOrganizationInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

pub struct Organizations<R, M> {
    repo: Arc<R>,
    authorizer: MembershipAuthorizer<M>,
    config: Arc<TenancyConfig>,
}

impl<R, M> Organizations<R, M>
where
    R: OrganizationRepository,
    M: MembershipRepository,
{
    pub fn new(
        repo: Arc<R>,
        authorizer: MembershipAuthorizer<M>,
        config: Arc<TenancyConfig>,
    ) -> Self {
        Self {
            repo,
            authorizer,
            config,
        }
    }

    /// Create an organization owned by `actor`.
    pub async fn create(
        &self,
        actor: &UserId,
        input: CreateOrganizationInput,
    ) -> TenancyResult<MemberOrganization> {
        let name = OrganizationName::new(&input.name).map_err(TenancyError::validation)?;
        let base = slugify(non_blank(input.slug.as_deref()).unwrap_or(name.as_str()));
        let timezone = match non_blank(input.timezone.as_deref()) {
            Some(raw) => Timezone::new(raw).map_err(TenancyError::validation)?,
            None => self.config.default_timezone()?,
        };

        let slug = self.free_slug(&base).await?;
        let organization = Organization::new(name, slug, timezone);
        let owner = Membership::new(*actor, organization.id, MembershipRole::Owner);
        let audit = AuditEntry::record(
            AuditAction::Create,
            *actor,
            Some(organization.id),
            ORGANIZATION_ENTITY,
            organization.id,
            json!({
                "name": organization.name.as_str(),
                "slug": organization.slug.as_str(),
            }),
        );

        self.repo.create(&organization, &owner, &audit).await?;

        tracing::info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            user_id = %actor,
            "Organization created"
        );

        Ok(MemberOrganization {
            organization,
            role: MembershipRole::Owner,
        })
    }

    /// First candidate of `base` not taken yet.
    async fn free_slug(&self, base: &Slug) -> TenancyResult<Slug> {
        for candidate in slug_candidates(base) {
            if !self.repo.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        tracing::debug!(base = %base, "Slug candidates exhausted");
        Err(TenancyError::SlugExhausted)
    }

    pub async fn list_mine(
        &self,
        actor: &UserId,
        is_active: Option<bool>,
    ) -> TenancyResult<Vec<MemberOrganization>> {
        self.repo.list_for_member(actor, is_active).await
    }

    pub async fn get(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> TenancyResult<MemberOrganization> {
        let membership = self
            .authorizer
            .require_membership(actor, organization_id)
            .await?;
        let organization = self
            .repo
            .find_organization(organization_id)
            .await?
            .ok_or(TenancyError::OrganizationNotFound)?;

        Ok(MemberOrganization {
            organization,
            role: membership.role,
        })
    }

    pub async fn update(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
        input: UpdateOrganizationInput,
    ) -> TenancyResult<Organization> {
        self.authorizer
            .require_role(actor, organization_id, RoleSet::MANAGERS)
            .await?;

        let patch = OrganizationPatch {
            name: input
                .name
                .as_deref()
                .map(OrganizationName::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            slug: non_blank(input.slug.as_deref()).map(slugify),
            timezone: input
                .timezone
                .as_deref()
                .map(Timezone::new)
                .transpose()
                .map_err(TenancyError::validation)?,
            is_active: input.is_active,
        };
        let changes = Changes::new(patch)?;

        if let Some(slug) = &changes.patch().slug {
            let current = self
                .repo
                .find_organization(organization_id)
                .await?
                .ok_or(TenancyError::OrganizationNotFound)?;
            if current.slug != *slug && self.repo.slug_exists(slug).await? {
                return Err(TenancyError::SlugTaken);
            }
        }

        let audit = AuditEntry::record(
            AuditAction::Update,
            *actor,
            Some(*organization_id),
            ORGANIZATION_ENTITY,
            organization_id,
            json!({ "fields": changes.fields() }),
        );

        let organization = self
            .repo
            .update_organization(organization_id, &changes, &audit)
            .await?
            .ok_or(TenancyError::OrganizationNotFound)?;

        tracing::info!(organization_id = %organization_id, fields = ?changes.fields(), "Organization updated");
        Ok(organization)
    }

    pub async fn archive(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> TenancyResult<Organization> {
        self.set_active(actor, organization_id, false).await
    }

    pub async fn unarchive(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
    ) -> TenancyResult<Organization> {
        self.set_active(actor, organization_id, true).await
    }

    async fn set_active(
        &self,
        actor: &UserId,
        organization_id: &OrganizationId,
        is_active: bool,
    ) -> TenancyResult<Organization> {
        self.authorizer
            .require_role(actor, organization_id, RoleSet::OWNER)
            .await?;

        let changes = Changes::new(OrganizationPatch {
            is_active: Some(is_active),
            ..Default::default()
        })?;
        let meta = if is_active {
            json!({ "unarchived": true })
        } else {
            json!({ "archived": true })
        };
        let audit = AuditEntry::record(
            AuditAction::Update,
            *actor,
            Some(*organization_id),
            ORGANIZATION_ENTITY,
            organization_id,
            meta,
        );

        let organization = self
            .repo
            .update_organization(organization_id, &changes, &audit)
            .await?
            .ok_or(TenancyError::OrganizationNotFound)?;

        tracing::info!(organization_id = %organization_id, is_active, "Organization activity changed");
        Ok(organization)
    }
}
