//! Request header helpers
//!
//! Extraction of the bearer credential and of plain single-value headers
//! such as the tenant header.

use axum::http::{HeaderMap, HeaderName, header};

/// Why a bearer credential could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Malformed Authorization header")]
    Malformed,
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; surrounding whitespace is
/// ignored.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?
        .trim();

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::Malformed);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Malformed);
    }
    Ok(token)
}

/// Trimmed value of a header, `None` when absent, blank or not visible ASCII.
pub fn extract_trimmed<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&with_auth("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer(&with_auth("bearer  abc ")), Ok("abc"));
    }

    #[test]
    fn test_extract_bearer_failures() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(BearerError::Missing));
        assert_eq!(
            extract_bearer(&with_auth("Basic dXNlcjpwYXNz")),
            Err(BearerError::Malformed)
        );
        assert_eq!(extract_bearer(&with_auth("Bearer")), Err(BearerError::Malformed));
        assert_eq!(extract_bearer(&with_auth("Bearer   ")), Err(BearerError::Malformed));
    }

    #[test]
    fn test_extract_trimmed() {
        let name = HeaderName::from_static("x-org-id");
        let mut headers = HeaderMap::new();
        assert_eq!(extract_trimmed(&headers, &name), None);

        headers.insert(name.clone(), HeaderValue::from_static("   "));
        assert_eq!(extract_trimmed(&headers, &name), None);

        headers.insert(name.clone(), HeaderValue::from_static(" org-1 "));
        assert_eq!(extract_trimmed(&headers, &name), Some("org-1"));
    }
}
