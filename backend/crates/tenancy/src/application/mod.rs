//! Application Layer
//!
//! Use cases and configuration.

pub mod availability;
pub mod catalog;
pub mod config;
pub mod organizations;

// Re-exports
pub use availability::{
    Availability, CreateWeeklyRuleInput, ListWeeklyRulesInput, UpdateWeeklyRuleInput,
};
pub use catalog::{
    Catalog, CreateServiceInput, ListServicesInput, ServiceList, UpdateServiceInput,
};
pub use config::TenancyConfig;
pub use organizations::{CreateOrganizationInput, Organizations, UpdateOrganizationInput};
