//! Application Configuration
//!
//! Configuration for the tenancy application layer.

use crate::domain::value_objects::Timezone;
use crate::error::{TenancyError, TenancyResult};

/// Tenancy application configuration
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Timezone of organizations created without one
    pub default_timezone: String,
    /// Page size when the client sends none
    pub default_take: u32,
    /// Largest accepted page size
    pub max_take: u32,
    /// Largest accepted offset
    pub max_skip: u32,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            default_timezone: "Europe/Istanbul".to_string(),
            default_take: 50,
            max_take: 100,
            max_skip: 10_000,
        }
    }
}

impl TenancyConfig {
    pub fn default_timezone(&self) -> TenancyResult<Timezone> {
        Timezone::new(&self.default_timezone).map_err(TenancyError::validation)
    }

    /// Validated `(take, skip)` with defaults applied.
    pub fn paging(&self, take: Option<u32>, skip: Option<u32>) -> TenancyResult<(u32, u32)> {
        let take = take.unwrap_or(self.default_take);
        if take == 0 || take > self.max_take {
            return Err(TenancyError::Validation(format!(
                "take must be between 1 and {}",
                self.max_take
            )));
        }
        let skip = skip.unwrap_or(0);
        if skip > self.max_skip {
            return Err(TenancyError::Validation(format!(
                "skip must be at most {}",
                self.max_skip
            )));
        }
        Ok((take, skip))
    }
}
