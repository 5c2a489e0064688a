//! Tenancy Backend Module
//!
//! Organizations and everything scoped to one: the service catalog, staff
//! assignments and weekly availability rules.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, slug rules, repository traits
//! - `application/` - Organization, catalog and availability use cases
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Tenant Isolation
//! - Every read and write is filtered by the caller's organization
//! - Ids from another organization are reported as not found
//! - Updates re-read the row's organization inside the transaction and
//!   refuse to write across tenants
//! - Every mutation appends an audit entry in the same transaction

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::TenancyConfig;
pub use error::{TenancyError, TenancyResult};
pub use infra::{memory::InMemoryTenancyStore, postgres::PgTenancyRepository};
pub use presentation::{
    TenancyAppState, availability_router, organizations_router, services_router,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
