//! Username Value Object
//!
//! Optional, unique, case-sensitive handle. Only surrounding whitespace is
//! removed.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Parse an optional username. Absent or blank input yields `None`.
    pub fn parse_optional(raw: Option<&str>) -> AppResult<Option<Self>> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::new(value).map(Some),
        }
    }

    pub fn new(raw: &str) -> AppResult<Self> {
        let value = raw.trim();
        let len = value.chars().count();

        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
            return Err(AppError::bad_request(format!(
                "Username must be {}-{} characters",
                USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
            )));
        }
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AppError::bad_request(
                "Username cannot contain whitespace or control characters",
            ));
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

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_none() {
        assert_eq!(Username::parse_optional(None).unwrap(), None);
        assert_eq!(Username::parse_optional(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_trimmed_and_case_kept() {
        let name = Username::parse_optional(Some("  Ayse_K ")).unwrap().unwrap();
        assert_eq!(name.as_str(), "Ayse_K");
    }

    #[test]
    fn test_length_and_charset() {
        assert!(Username::new("ab").is_err());
        assert!(Username::new(&"a".repeat(31)).is_err());
        assert!(Username::new("two words").is_err());
        assert!(Username::new("çağrı").is_ok());
    }
}
