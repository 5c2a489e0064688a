//! Domain Value Objects
//!
//! Validated values of the tenant domain. Constructors return
//! `AppResult` so use cases can wrap the message into `TenancyError`.

use kernel::error::app_error::{AppError, AppResult};
use kernel::id::Id;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use kernel::id::{MembershipId, OrganizationId, UserId};

// ============================================================================
// Identifiers
// ============================================================================

pub mod markers {
    pub struct Service;
    pub struct ServiceStaff;
    pub struct WeeklyRule;
}

pub type ServiceId = Id<markers::Service>;
pub type ServiceStaffId = Id<markers::ServiceStaff>;
pub type WeeklyRuleId = Id<markers::WeeklyRule>;

// ============================================================================
// Text
// ============================================================================

fn bounded_text(raw: &str, field: &str, min: usize, max: usize) -> AppResult<String> {
    let value = raw.trim();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::bad_request(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(AppError::bad_request(format!(
            "{field} cannot contain control characters"
        )));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationName(String);

impl OrganizationName {
    pub const MIN: usize = 2;
    pub const MAX: usize = 80;

    pub fn new(raw: &str) -> AppResult<Self> {
        bounded_text(raw, "Organization name", Self::MIN, Self::MAX).map(Self)
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// URL-safe organization handle. Built by [`crate::domain::services::slugify`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub const MAX: usize = 60;
    pub const FALLBACK: &'static str = "org";

    pub(crate) fn from_normalized(value: String) -> Self {
        Self(value)
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// IANA zone name such as `Europe/Istanbul`. Only the shape is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timezone(String);

impl Timezone {
    pub const MAX: usize = 64;

    pub fn new(raw: &str) -> AppResult<Self> {
        let value = raw.trim();
        let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '+' | '-');
        if value.len() < 2 || value.len() > Self::MAX || !value.chars().all(valid_char) {
            return Err(AppError::bad_request("Invalid timezone"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub const MIN: usize = 2;
    pub const MAX: usize = 120;

    pub fn new(raw: &str) -> AppResult<Self> {
        bounded_text(raw, "Service name", Self::MIN, Self::MAX).map(Self)
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match used by list filters
    pub fn matches(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    pub const MAX: usize = 500;

    /// Absent or blank input yields `None`.
    pub fn parse_optional(raw: Option<&str>) -> AppResult<Option<Self>> {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if value.chars().count() > Self::MAX {
            return Err(AppError::bad_request(format!(
                "Description must be at most {} characters",
                Self::MAX
            )));
        }
        Ok(Some(Self(value.to_string())))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ISO 4217 style code, stored upper-case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub const DEFAULT: &'static str = "TRY";

    pub fn new(raw: &str) -> AppResult<Self> {
        let value = raw.trim();
        if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::bad_request("Currency must be a 3-letter code"));
        }
        Ok(Self(value.to_ascii_uppercase()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// Service duration in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationMinutes(i32);

impl DurationMinutes {
    pub const MIN: i32 = 5;
    pub const MAX: i32 = 24 * 60;

    pub fn new(minutes: i32) -> AppResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(AppError::bad_request(format!(
                "Duration must be between {} and {} minutes",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn from_db(minutes: i32) -> Self {
        Self(minutes)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceCents(i64);

impl PriceCents {
    pub fn new(cents: i64) -> AppResult<Self> {
        if cents < 0 {
            return Err(AppError::bad_request("Price cannot be negative"));
        }
        Ok(Self(cents))
    }

    pub fn from_db(cents: i64) -> Self {
        Self(cents)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

/// Day of week, 0 = Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weekday(i16);

impl Weekday {
    pub const MAX: i16 = 6;

    pub fn new(day: i16) -> AppResult<Self> {
        if (0..=Self::MAX).contains(&day) {
            Ok(Self(day))
        } else {
            Err(AppError::bad_request("Weekday must be between 0 and 6"))
        }
    }

    pub fn from_db(day: i16) -> Self {
        Self(day)
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

/// Opening window within one day, in minutes from midnight. `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeWindow {
    start: i32,
    end: i32,
}

impl TimeWindow {
    pub const DAY_MINUTES: i32 = 24 * 60;

    pub fn new(start: i32, end: i32) -> AppResult<Self> {
        if !(0..Self::DAY_MINUTES).contains(&start) {
            return Err(AppError::bad_request("Start must be between 0 and 1439"));
        }
        if !(1..=Self::DAY_MINUTES).contains(&end) {
            return Err(AppError::bad_request("End must be between 1 and 1440"));
        }
        if end <= start {
            return Err(AppError::bad_request("End must be greater than start"));
        }
        Ok(Self { start, end })
    }

    pub fn from_db(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }
}

/// Bookable slot length in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotSize(i32);

impl SlotSize {
    pub const DEFAULT: SlotSize = SlotSize(15);
    pub const MIN: i32 = 5;
    pub const MAX: i32 = 180;

    pub fn new(minutes: i32) -> AppResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(AppError::bad_request(format!(
                "Slot size must be between {} and {} minutes",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn from_db(minutes: i32) -> Self {
        Self(minutes)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl Default for SlotSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ============================================================================
// ServiceStatus
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i16)]
pub enum ServiceStatus {
    #[default]
    Active = 0,
    Disabled = 1,
}

impl ServiceStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Disabled => "DISABLED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ACTIVE" => Some(Self::Active),
            "DISABLED" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
