//! Tenancy Routers
//!
//! Organization routes only require a caller; each handler resolves the
//! caller's membership for the organization in the path. Service and
//! availability routes name the tenant through the gate's header and carry
//! role policies.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

use auth::gate::{AuthorizationGate, PolicyRouter, RoutePolicy};
use auth::models::RoleSet;

use crate::domain::repository::{Memberships, TenancyStore};
use crate::presentation::handlers::{self, TenancyAppState};

const READERS: RoutePolicy = RoutePolicy::roles(RoleSet::STAFF_OR_ABOVE);
const MANAGERS: RoutePolicy = RoutePolicy::roles(RoleSet::MANAGERS);

/// Routes mounted under `/api/organizations`
pub fn organizations_router<R: TenancyStore, M: Memberships>(
    state: TenancyAppState<R, M>,
    gate: Arc<AuthorizationGate<M>>,
) -> Router {
    let authed = RoutePolicy::AUTHENTICATED;
    PolicyRouter::new(gate)
        .route("/", authed, post(handlers::create_organization::<R, M>))
        .route("/", authed, get(handlers::list_organizations::<R, M>))
        .route("/{id}", authed, get(handlers::get_organization::<R, M>))
        .route("/{id}", authed, patch(handlers::update_organization::<R, M>))
        .route("/{id}/archive", authed, patch(handlers::archive_organization::<R, M>))
        .route("/{id}/unarchive", authed, patch(handlers::unarchive_organization::<R, M>))
        .into_router()
        .with_state(state)
}

/// Routes mounted under `/api/services`
pub fn services_router<R: TenancyStore, M: Memberships>(
    state: TenancyAppState<R, M>,
    gate: Arc<AuthorizationGate<M>>,
) -> Router {
    PolicyRouter::new(gate)
        .route("/", READERS, get(handlers::list_services::<R, M>))
        .route("/", MANAGERS, post(handlers::create_service::<R, M>))
        .route("/{id}", READERS, get(handlers::get_service::<R, M>))
        .route("/{id}", MANAGERS, patch(handlers::update_service::<R, M>))
        .route("/{id}/disable", MANAGERS, patch(handlers::disable_service::<R, M>))
        .route("/{id}/enable", MANAGERS, patch(handlers::enable_service::<R, M>))
        .route("/{id}/staff", READERS, get(handlers::list_service_staff::<R, M>))
        .route("/{id}/staff", MANAGERS, post(handlers::assign_service_staff::<R, M>))
        .route(
            "/{id}/staff/{member_id}",
            MANAGERS,
            delete(handlers::unassign_service_staff::<R, M>),
        )
        .into_router()
        .with_state(state)
}

/// Routes mounted under `/api/availability`
pub fn availability_router<R: TenancyStore, M: Memberships>(
    state: TenancyAppState<R, M>,
    gate: Arc<AuthorizationGate<M>>,
) -> Router {
    PolicyRouter::new(gate)
        .route("/weekly-rules", READERS, get(handlers::list_weekly_rules::<R, M>))
        .route("/weekly-rules", MANAGERS, post(handlers::create_weekly_rule::<R, M>))
        .route("/weekly-rules/{id}", MANAGERS, patch(handlers::update_weekly_rule::<R, M>))
        .route("/weekly-rules/{id}", MANAGERS, delete(handlers::delete_weekly_rule::<R, M>))
        .into_router()
        .with_state(state)
}
