//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::TenancyAppState;
pub use router::{availability_router, organizations_router, services_router};
