//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use auth::application::MembershipAuthorizer;
use auth::gate::{CurrentUser, OrgMembership};
use auth::models::OkResponse;

use crate::application::{Availability, Catalog, Organizations, TenancyConfig};
use crate::domain::repository::{Memberships, TenancyStore};
use crate::domain::value_objects::{MembershipId, OrganizationId, ServiceId, WeeklyRuleId};
use crate::error::TenancyResult;
use crate::presentation::dto::{
    AssignStaffRequest, CreateOrganizationRequest, CreateServiceRequest, CreateWeeklyRuleRequest,
    ListOrganizationsQuery, ListServicesQuery, ListWeeklyRulesQuery, OrganizationResponse,
    ServiceListResponse, ServiceResponse, ServiceStaffResponse, UpdateOrganizationRequest,
    UpdateServiceRequest, UpdateWeeklyRuleRequest, WeeklyRuleResponse,
};

/// Shared state for tenancy handlers
pub struct TenancyAppState<R, M> {
    pub repo: Arc<R>,
    pub authorizer: MembershipAuthorizer<M>,
    pub config: Arc<TenancyConfig>,
}

impl<R, M> Clone for TenancyAppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            authorizer: self.authorizer.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R, M> TenancyAppState<R, M>
where
    R: TenancyStore,
    M: Memberships,
{
    pub fn new(repo: Arc<R>, authorizer: MembershipAuthorizer<M>, config: Arc<TenancyConfig>) -> Self {
        Self {
            repo,
            authorizer,
            config,
        }
    }

    pub fn organizations(&self) -> Organizations<R, M> {
        Organizations::new(
            Arc::clone(&self.repo),
            self.authorizer.clone(),
            Arc::clone(&self.config),
        )
    }

    pub fn catalog(&self) -> Catalog<R> {
        Catalog::new(Arc::clone(&self.repo), Arc::clone(&self.config))
    }

    pub fn availability(&self) -> Availability<R> {
        Availability::new(Arc::clone(&self.repo))
    }
}

// ============================================================================
// Organizations
// ============================================================================

/// POST /api/organizations
pub async fn create_organization<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<CreateOrganizationRequest>,
) -> TenancyResult<(StatusCode, Json<OrganizationResponse>)> {
    let created = state.organizations().create(&user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/organizations
pub async fn list_organizations<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<ListOrganizationsQuery>,
) -> TenancyResult<Json<Vec<OrganizationResponse>>> {
    let items = state
        .organizations()
        .list_mine(&user_id, query.is_active)
        .await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// GET /api/organizations/{id}
pub async fn get_organization<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<OrganizationId>,
) -> TenancyResult<Json<OrganizationResponse>> {
    let item = state.organizations().get(&user_id, &id).await?;
    Ok(Json(item.into()))
}

/// PATCH /api/organizations/{id}
pub async fn update_organization<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<OrganizationId>,
    Json(req): Json<UpdateOrganizationRequest>,
) -> TenancyResult<Json<OrganizationResponse>> {
    let organization = state
        .organizations()
        .update(&user_id, &id, req.into())
        .await?;
    Ok(Json(organization.into()))
}

/// PATCH /api/organizations/{id}/archive
pub async fn archive_organization<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<OrganizationId>,
) -> TenancyResult<Json<OrganizationResponse>> {
    let organization = state.organizations().archive(&user_id, &id).await?;
    Ok(Json(organization.into()))
}

/// PATCH /api/organizations/{id}/unarchive
pub async fn unarchive_organization<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<OrganizationId>,
) -> TenancyResult<Json<OrganizationResponse>> {
    let organization = state.organizations().unarchive(&user_id, &id).await?;
    Ok(Json(organization.into()))
}

// ============================================================================
// Services
// ============================================================================

/// GET /api/services
pub async fn list_services<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Query(query): Query<ListServicesQuery>,
) -> TenancyResult<Json<ServiceListResponse>> {
    let list = state.catalog().list(&actor, query.into()).await?;
    Ok(Json(list.into()))
}

/// GET /api/services/{id}
pub async fn get_service<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<ServiceId>,
) -> TenancyResult<Json<ServiceResponse>> {
    let service = state.catalog().get(&actor, &id).await?;
    Ok(Json(service.into()))
}

/// POST /api/services
pub async fn create_service<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Json(req): Json<CreateServiceRequest>,
) -> TenancyResult<(StatusCode, Json<ServiceResponse>)> {
    let service = state.catalog().create(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(service.into())))
}

/// PATCH /api/services/{id}
pub async fn update_service<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<ServiceId>,
    Json(req): Json<UpdateServiceRequest>,
) -> TenancyResult<Json<ServiceResponse>> {
    let service = state.catalog().update(&actor, &id, req.into()).await?;
    Ok(Json(service.into()))
}

/// PATCH /api/services/{id}/disable
pub async fn disable_service<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<ServiceId>,
) -> TenancyResult<Json<ServiceResponse>> {
    let service = state.catalog().disable(&actor, &id).await?;
    Ok(Json(service.into()))
}

/// PATCH /api/services/{id}/enable
pub async fn enable_service<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<ServiceId>,
) -> TenancyResult<Json<ServiceResponse>> {
    let service = state.catalog().enable(&actor, &id).await?;
    Ok(Json(service.into()))
}

/// GET /api/services/{id}/staff
pub async fn list_service_staff<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<ServiceId>,
) -> TenancyResult<Json<Vec<ServiceStaffResponse>>> {
    let staff = state.catalog().list_staff(&actor, &id).await?;
    Ok(Json(staff.into_iter().map(Into::into).collect()))
}

/// POST /api/services/{id}/staff
pub async fn assign_service_staff<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<ServiceId>,
    Json(req): Json<AssignStaffRequest>,
) -> TenancyResult<Json<ServiceStaffResponse>> {
    let staff = state
        .catalog()
        .assign_staff(&actor, &id, &req.member_id)
        .await?;
    Ok(Json(staff.into()))
}

/// DELETE /api/services/{id}/staff/{member_id}
pub async fn unassign_service_staff<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path((id, member_id)): Path<(ServiceId, MembershipId)>,
) -> TenancyResult<Json<OkResponse>> {
    state
        .catalog()
        .unassign_staff(&actor, &id, &member_id)
        .await?;
    Ok(Json(OkResponse::OK))
}

// ============================================================================
// Weekly availability
// ============================================================================

/// GET /api/availability/weekly-rules
pub async fn list_weekly_rules<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Query(query): Query<ListWeeklyRulesQuery>,
) -> TenancyResult<Json<Vec<WeeklyRuleResponse>>> {
    let rules = state.availability().list(&actor, query.into()).await?;
    Ok(Json(rules.into_iter().map(Into::into).collect()))
}

/// POST /api/availability/weekly-rules
pub async fn create_weekly_rule<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Json(req): Json<CreateWeeklyRuleRequest>,
) -> TenancyResult<(StatusCode, Json<WeeklyRuleResponse>)> {
    let rule = state.availability().create(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(rule.into())))
}

/// PATCH /api/availability/weekly-rules/{id}
pub async fn update_weekly_rule<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<WeeklyRuleId>,
    Json(req): Json<UpdateWeeklyRuleRequest>,
) -> TenancyResult<Json<WeeklyRuleResponse>> {
    let rule = state.availability().update(&actor, &id, req.into()).await?;
    Ok(Json(rule.into()))
}

/// DELETE /api/availability/weekly-rules/{id}
pub async fn delete_weekly_rule<R: TenancyStore, M: Memberships>(
    State(state): State<TenancyAppState<R, M>>,
    OrgMembership(actor): OrgMembership,
    Path(id): Path<WeeklyRuleId>,
) -> TenancyResult<Json<OkResponse>> {
    state.availability().delete(&actor, &id).await?;
    Ok(Json(OkResponse::OK))
}
