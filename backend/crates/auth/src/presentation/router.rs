//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::domain::repository::AuthStore;
use crate::presentation::gate::{AuthorizationGate, PolicyRouter, RoutePolicy};
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any store implementation
pub fn auth_router<R: AuthStore>(state: AuthAppState<R>, gate: Arc<AuthorizationGate<R>>) -> Router {
    PolicyRouter::new(gate)
        .route("/register", RoutePolicy::PUBLIC, post(handlers::register::<R>))
        .route("/login", RoutePolicy::PUBLIC, post(handlers::login::<R>))
        .route("/refresh", RoutePolicy::PUBLIC, post(handlers::refresh::<R>))
        .route("/public-ping", RoutePolicy::PUBLIC, get(handlers::public_ping))
        .route("/logout", RoutePolicy::AUTHENTICATED, post(handlers::logout::<R>))
        .route("/me", RoutePolicy::AUTHENTICATED, get(handlers::me::<R>))
        .into_router()
        .with_state(state)
}
