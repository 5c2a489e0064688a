//! Infrastructure Layer
//!
//! Database implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTenancyStore;
pub use postgres::PgTenancyRepository;
