//! Partial updates
//!
//! Update operations receive a patch struct whose fields are all optional.
//! [`Changes`] wraps a patch that carries at least one field, so repository
//! code never has to deal with an empty update.

use serde::{Deserialize, Deserializer};
use std::fmt;

use crate::error::app_error::AppError;

/// A set of optional field updates.
pub trait Patch {
    /// Names of the fields present in this patch, in declaration order.
    fn changed_fields(&self) -> Vec<&'static str>;
}

/// Returned when a patch carries no field at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPatch;

impl fmt::Display for EmptyPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nothing to update")
    }
}

impl std::error::Error for EmptyPatch {}

impl From<EmptyPatch> for AppError {
    fn from(err: EmptyPatch) -> Self {
        AppError::bad_request(err.to_string()).with_code("NOTHING_TO_UPDATE")
    }
}

/// A non-empty patch together with the list of fields it touches.
#[derive(Debug, Clone)]
pub struct Changes<P> {
    patch: P,
    fields: Vec<&'static str>,
}

impl<P: Patch> Changes<P> {
    pub fn new(patch: P) -> Result<Self, EmptyPatch> {
        let fields = patch.changed_fields();
        if fields.is_empty() {
            return Err(EmptyPatch);
        }
        Ok(Self { patch, fields })
    }
}

impl<P> Changes<P> {
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn patch(&self) -> &P {
        &self.patch
    }
}

/// Deserializer for nullable patch fields.
///
/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`). Use together with `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
