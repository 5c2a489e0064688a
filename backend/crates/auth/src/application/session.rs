//! Session Manager
//!
//! Registration, login, refresh rotation and logout. The only writer of
//! refresh token records.
//!
//! Raw refresh tokens are returned to the caller once and stored only as
//! slow salted hashes, so a presented token is matched by verifying it
//! against the newest usable records of its subject.

use std::sync::Arc;

use chrono::Utc;
use platform::hashing::{ClearText, SecretHasher};
use serde_json::json;

use crate::application::config::AuthConfig;
use crate::application::token::{TokenCodec, TokenKind};
use crate::domain::entity::{AuditAction, AuditEntry, RefreshTokenRecord, User};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, full_name::FullName, ids::UserId, password::Password, username::Username,
};
use crate::error::{AuthError, AuthResult};

/// Entity type recorded for refresh token audit entries
const REFRESH_TOKEN_ENTITY: &str = "RefreshToken";

/// Entity type recorded for user audit entries
const USER_ENTITY: &str = "User";

/// Register input (shape already validated at the HTTP boundary)
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Access + refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Session manager
pub struct SessionManager<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    codec: Arc<TokenCodec>,
    hasher: SecretHasher,
    config: Arc<AuthConfig>,
}

impl<U, T> SessionManager<U, T>
where
    U: UserRepository,
    T: RefreshTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        token_repo: Arc<T>,
        codec: Arc<TokenCodec>,
        hasher: SecretHasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            token_repo,
            codec,
            hasher,
            config,
        }
    }

    // ========================================================================
    // Register / Login
    // ========================================================================

    pub async fn register(&self, input: RegisterInput) -> AuthResult<TokenPair> {
        let email = Email::new(&input.email).map_err(AuthError::validation)?;
        let username =
            Username::parse_optional(input.username.as_deref()).map_err(AuthError::validation)?;
        let full_name =
            FullName::parse_optional(input.full_name.as_deref()).map_err(AuthError::validation)?;
        let password = Password::new(&input.password).map_err(AuthError::validation)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }
        if let Some(username) = &username
            && self.user_repo.find_by_username(username).await?.is_some()
        {
            return Err(AuthError::DuplicateUsername);
        }

        let password_hash = self
            .hasher
            .hash_blocking(password.into_clear_text())
            .await?;

        let user = User::register(email, username, full_name, password_hash);
        let audit = AuditEntry::record(
            AuditAction::Register,
            user.id,
            None,
            USER_ENTITY,
            user.id,
            json!({ "email": user.email.as_str() }),
        );

        // Sign first so a signing failure leaves no account behind
        let (pair, record) = self.sign_pair(&user.id).await?;

        // Unique indexes catch a concurrent registration that passed the checks above
        self.user_repo.create(&user, &audit).await?;
        self.token_repo.create(&record, None).await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(pair)
    }

    /// Unknown account, wrong password and inactive account all fail with
    /// the same error after the same amount of hashing work.
    pub async fn login(&self, input: LoginInput) -> AuthResult<TokenPair> {
        let secret = Password::for_login(&input.password);

        let user = match Email::new(&input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            self.hasher.equalize_blocking(secret).await;
            tracing::warn!("Login failed: unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        let password_ok = self
            .hasher
            .verify_blocking(secret, user.password_hash.clone())
            .await;

        if !password_ok {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.can_login() {
            tracing::warn!(user_id = %user.id, status = %user.status, "Login failed: inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        let audit = AuditEntry::record(
            AuditAction::Login,
            user.id,
            None,
            USER_ENTITY,
            user.id,
            json!({}),
        );
        let pair = self.issue_token_pair(&user.id, Some(audit)).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(pair)
    }

    // ========================================================================
    // Token pair issuance
    // ========================================================================

    /// Sign a new pair and persist its refresh record, together with
    /// `audit` when one is given.
    pub async fn issue_token_pair(
        &self,
        user_id: &UserId,
        audit: Option<AuditEntry>,
    ) -> AuthResult<TokenPair> {
        let (pair, record) = self.sign_pair(user_id).await?;
        self.token_repo.create(&record, audit.as_ref()).await?;
        Ok(pair)
    }

    async fn sign_pair(&self, user_id: &UserId) -> AuthResult<(TokenPair, RefreshTokenRecord)> {
        let access_ttl = self.codec.ttl(TokenKind::Access);
        let refresh_ttl = self.codec.ttl(TokenKind::Refresh);

        let access_token = self.codec.issue(TokenKind::Access, user_id, access_ttl)?;
        let refresh_token = self.codec.issue(TokenKind::Refresh, user_id, refresh_ttl)?;

        let token_hash = self
            .hasher
            .hash_blocking(ClearText::from(refresh_token.as_str()))
            .await?;

        let ttl = chrono::Duration::from_std(refresh_ttl)
            .map_err(|e| AuthError::Internal(format!("Refresh TTL out of range: {e}")))?;
        let record = RefreshTokenRecord::issue(*user_id, token_hash, ttl, Utc::now())
            .ok_or_else(|| AuthError::Internal("Refresh token expiry out of range".into()))?;

        let pair = TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: access_ttl.as_secs(),
        };
        Ok((pair, record))
    }

    // ========================================================================
    // Refresh / Logout
    // ========================================================================

    /// Exchange a refresh token for a new pair. The presented token is
    /// revoked; presenting it again fails.
    pub async fn refresh(&self, raw: &str) -> AuthResult<TokenPair> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AuthError::InvalidRefreshToken);
        }

        let claims = self
            .codec
            .verify(TokenKind::Refresh, raw)
            .map_err(|e| {
                tracing::debug!(reason = %e, "Refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;
        let user_id = claims.subject();

        match self.user_repo.find_by_id(&user_id).await? {
            Some(user) if user.can_login() => {}
            _ => {
                tracing::warn!(user_id = %user_id, "Refresh for missing or inactive user");
                return Err(AuthError::InvalidRefreshToken);
            }
        }

        let Some(record) = self.find_record(&user_id, raw).await? else {
            tracing::warn!(user_id = %user_id, "Refresh token not usable (reused or unknown)");
            return Err(AuthError::InvalidRefreshToken);
        };

        let (pair, replacement) = self.sign_pair(&user_id).await?;
        let audit = AuditEntry::record(
            AuditAction::Rotate,
            user_id,
            None,
            REFRESH_TOKEN_ENTITY,
            record.id,
            json!({ "rotate": true, "replacedBy": replacement.id }),
        );

        let rotated = self
            .token_repo
            .rotate(&record.id, Utc::now(), &replacement, &audit)
            .await?;
        if !rotated {
            tracing::warn!(user_id = %user_id, token_id = %record.id, "Refresh token rotated concurrently");
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!(user_id = %user_id, token_id = %record.id, "Session rotated");

        Ok(pair)
    }

    /// Revoke a refresh token. Unknown, invalid or already revoked tokens
    /// are ignored.
    pub async fn logout(&self, raw: &str) -> AuthResult<()> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }

        let Ok(claims) = self.codec.verify(TokenKind::Refresh, raw) else {
            tracing::debug!("Logout with unverifiable refresh token ignored");
            return Ok(());
        };
        let user_id = claims.subject();

        let Some(record) = self.find_record(&user_id, raw).await? else {
            tracing::debug!(user_id = %user_id, "Logout with unknown refresh token ignored");
            return Ok(());
        };

        let audit = AuditEntry::record(
            AuditAction::Logout,
            user_id,
            None,
            REFRESH_TOKEN_ENTITY,
            record.id,
            json!({}),
        );
        if self.token_repo.revoke(&record.id, Utc::now(), &audit).await? {
            tracing::info!(user_id = %user_id, token_id = %record.id, "User logged out");
        }

        Ok(())
    }

    /// Newest usable record whose hash matches `raw`
    async fn find_record(
        &self,
        user_id: &UserId,
        raw: &str,
    ) -> AuthResult<Option<RefreshTokenRecord>> {
        let candidates = self
            .token_repo
            .find_usable(user_id, Utc::now(), self.config.refresh_candidate_limit)
            .await?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let hashes = candidates.iter().map(|r| r.token_hash.clone()).collect();
        let matched = self
            .hasher
            .find_match_blocking(ClearText::from(raw), hashes)
            .await;

        Ok(matched.and_then(|index| candidates.into_iter().nth(index)))
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub async fn me(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }
}
