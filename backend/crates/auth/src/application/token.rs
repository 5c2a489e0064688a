//! Token Codec
//!
//! Two independent HS256 signing contexts, one per token kind. Each token
//! carries its kind in the `type` claim, so a token signed for one kind is
//! rejected as the other even if both contexts were given the same key.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::value_object::ids::UserId;

// ============================================================================
// Claims
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Makes two tokens issued in the same second for the same subject differ
    pub jti: Uuid,
}

impl TokenClaims {
    pub fn subject(&self) -> UserId {
        UserId::from_uuid(self.sub)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature or structure")]
    InvalidSignature,

    #[error("Expected a {expected} token, got a {found} token")]
    WrongKind { expected: TokenKind, found: TokenKind },

    #[error("Token lifetime out of range")]
    TtlOutOfRange,

    #[error("Token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

// ============================================================================
// Codec
// ============================================================================

struct SigningContext {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningContext {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

pub struct TokenCodec {
    access: SigningContext,
    refresh: SigningContext,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: SigningContext::new(&config.access_secret, config.access_ttl),
            refresh: SigningContext::new(&config.refresh_secret, config.refresh_ttl),
            validation,
        }
    }

    fn context(&self, kind: TokenKind) -> &SigningContext {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Configured lifetime of a token kind
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.context(kind).ttl
    }

    pub fn issue(&self, kind: TokenKind, subject: &UserId, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(kind, subject, ttl, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(
        &self,
        kind: TokenKind,
        subject: &UserId,
        ttl: Duration,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        let ttl = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::TtlOutOfRange)?;
        let exp = issued_at
            .checked_add(ttl)
            .ok_or(TokenError::TtlOutOfRange)?;

        let claims = TokenClaims {
            sub: *subject.as_uuid(),
            kind,
            iat: issued_at,
            exp,
            jti: Uuid::new_v4(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.context(kind).encoding,
        )?)
    }

    /// Verify signature, expiry and kind.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.context(kind).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })?;

        if data.claims.kind != kind {
            return Err(TokenError::WrongKind {
                expected: kind,
                found: data.claims.kind,
            });
        }
        Ok(data.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}
