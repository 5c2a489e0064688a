//! Full Name Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const FULL_NAME_MAX_LENGTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FullName(String);

impl FullName {
    /// Absent or blank input yields `None`.
    pub fn parse_optional(raw: Option<&str>) -> AppResult<Option<Self>> {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if value.chars().count() > FULL_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Full name must be at most {} characters",
                FULL_NAME_MAX_LENGTH
            )));
        }
        if value.chars().any(char::is_control) {
            return Err(AppError::bad_request(
                "Full name cannot contain control characters",
            ));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(FullName::parse_optional(Some(" ")).unwrap(), None);
        let name = FullName::parse_optional(Some(" Ada Lovelace ")).unwrap().unwrap();
        assert_eq!(name.as_str(), "Ada Lovelace");
        assert!(FullName::parse_optional(Some(&"x".repeat(81))).is_err());
    }
}
