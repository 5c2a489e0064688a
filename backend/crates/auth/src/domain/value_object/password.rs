//! Password Value Object
//!
//! Passwords are NFKC-normalized before hashing and before verification so
//! that visually identical input from different keyboards hashes the same.
//! The clear text lives in a zeroize-on-drop buffer and is never logged.

use kernel::error::app_error::{AppError, AppResult};
use platform::hashing::ClearText;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

const PASSWORD_MIN_LENGTH: usize = 6;
const PASSWORD_MAX_LENGTH: usize = 128;

/// A new password that satisfies the registration policy
pub struct Password(ClearText);

impl Password {
    pub fn new(raw: &str) -> AppResult<Self> {
        let normalized: String = raw.nfkc().collect();
        let len = normalized.chars().count();

        if len < PASSWORD_MIN_LENGTH {
            return Err(AppError::bad_request(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_LENGTH
            )));
        }
        if len > PASSWORD_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Password must be at most {} characters",
                PASSWORD_MAX_LENGTH
            )));
        }
        if normalized.chars().any(char::is_control) {
            return Err(AppError::bad_request(
                "Password cannot contain control characters",
            ));
        }

        Ok(Self(ClearText::from(normalized)))
    }

    /// Normalize a login attempt. No policy is applied: a password that
    /// fails the policy simply does not verify.
    pub fn for_login(raw: &str) -> ClearText {
        ClearText::from(raw.nfkc().collect::<String>())
    }

    pub fn into_clear_text(self) -> ClearText {
        self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}
