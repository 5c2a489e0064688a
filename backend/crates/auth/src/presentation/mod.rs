//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and the authorization gate.

pub mod dto;
pub mod gate;
pub mod handlers;
pub mod router;

pub use gate::{
    AuthorizationGate, CurrentUser, Identity, OrgMembership, PolicyRouter, RoutePolicy,
};
pub use handlers::AuthAppState;
pub use router::auth_router;
