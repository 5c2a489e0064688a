//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use platform::hashing::SecretHasher;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, MembershipAuthorizer, RegisterInput, SessionManager, TokenCodec,
};
use crate::domain::repository::AuthStore;
use crate::error::AuthResult;
use crate::presentation::dto::{
    LoginRequest, MeResponse, OkResponse, RefreshRequest, RegisterRequest, TokenPairResponse,
};
use crate::presentation::gate::{AuthorizationGate, CurrentUser};

/// Shared state for auth handlers
pub struct AuthAppState<R> {
    pub repo: Arc<R>,
    pub codec: Arc<TokenCodec>,
    pub hasher: SecretHasher,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            codec: Arc::clone(&self.codec),
            hasher: self.hasher.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: AuthStore> AuthAppState<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            codec: Arc::new(TokenCodec::new(&config)),
            hasher: SecretHasher::new(config.hash_cost),
            repo,
            config,
        }
    }

    pub fn sessions(&self) -> SessionManager<R, R> {
        SessionManager::new(
            Arc::clone(&self.repo),
            Arc::clone(&self.repo),
            Arc::clone(&self.codec),
            self.hasher.clone(),
            Arc::clone(&self.config),
        )
    }

    pub fn authorizer(&self) -> MembershipAuthorizer<R> {
        MembershipAuthorizer::new(Arc::clone(&self.repo))
    }

    /// Gate shared by every router of the application
    pub fn gate(&self) -> Arc<AuthorizationGate<R>> {
        Arc::new(AuthorizationGate::new(
            Arc::clone(&self.codec),
            self.authorizer(),
            self.config.tenant_header.clone(),
        ))
    }
}

// ============================================================================
// Public
// ============================================================================

/// POST /api/auth/register
pub async fn register<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<TokenPairResponse>)> {
    let pair = state
        .sessions()
        .register(RegisterInput {
            email: req.email,
            password: req.password,
            username: req.username,
            full_name: req.full_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(pair.into())))
}

/// POST /api/auth/login
pub async fn login<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenPairResponse>> {
    let pair = state
        .sessions()
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(pair.into()))
}

/// POST /api/auth/refresh
pub async fn refresh<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<TokenPairResponse>> {
    let pair = state.sessions().refresh(&req.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// GET /api/auth/public-ping
pub async fn public_ping() -> Json<OkResponse> {
    Json(OkResponse::OK)
}

// ============================================================================
// Authenticated
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<OkResponse>> {
    tracing::debug!(user_id = %user_id, "Logout requested");
    state.sessions().logout(&req.refresh_token).await?;
    Ok(Json(OkResponse::OK))
}

/// GET /api/auth/me
pub async fn me<R: AuthStore>(
    State(state): State<AuthAppState<R>>,
    CurrentUser(user_id): CurrentUser,
) -> AuthResult<Json<MeResponse>> {
    let user = state.sessions().me(&user_id).await?;
    Ok(Json(user.into()))
}
