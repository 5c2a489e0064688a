//! Request Authorization Gate
//!
//! Every route is registered through [`PolicyRouter`] together with a
//! [`RoutePolicy`]. The gate middleware runs two stages:
//!
//! 1. Identity: verify the bearer access token and attach [`Identity`].
//!    Skipped only for public routes.
//! 2. Role: when the policy names roles, resolve the organization from the
//!    tenant header and require one of the roles. The resolved
//!    [`Membership`] is attached for handlers.
//!
//! Routes that name no roles are authenticated only. Handlers of such
//! routes run their own organization checks through
//! [`MembershipAuthorizer`].

use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{HeaderMap, HeaderName, request::Parts};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use platform::headers::{extract_bearer, extract_trimmed};

use crate::application::authorize::MembershipAuthorizer;
use crate::application::token::{TokenCodec, TokenError, TokenKind};
use crate::domain::entity::Membership;
use crate::domain::repository::MembershipRepository;
use crate::domain::value_object::{
    ids::{OrganizationId, UserId},
    membership_role::RoleSet,
};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Policy
// ============================================================================

/// Per-route authorization policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub public: bool,
    pub required_roles: RoleSet,
}

impl RoutePolicy {
    /// No token required
    pub const PUBLIC: Self = Self {
        public: true,
        required_roles: RoleSet::EMPTY,
    };

    /// Valid access token required, no organization check
    pub const AUTHENTICATED: Self = Self {
        public: false,
        required_roles: RoleSet::EMPTY,
    };

    /// Valid access token plus one of `roles` in the tenant organization
    pub const fn roles(roles: RoleSet) -> Self {
        Self {
            public: false,
            required_roles: roles,
        }
    }
}

// ============================================================================
// Gate
// ============================================================================

/// Authenticated caller, attached to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
}

/// Outcome of a successful gate pass
#[derive(Debug, Default)]
pub struct Admission {
    pub identity: Option<Identity>,
    pub membership: Option<Membership>,
}

pub struct AuthorizationGate<M> {
    codec: Arc<TokenCodec>,
    authorizer: MembershipAuthorizer<M>,
    tenant_header: HeaderName,
}

impl<M: MembershipRepository> AuthorizationGate<M> {
    pub fn new(
        codec: Arc<TokenCodec>,
        authorizer: MembershipAuthorizer<M>,
        tenant_header: HeaderName,
    ) -> Self {
        Self {
            codec,
            authorizer,
            tenant_header,
        }
    }

    pub fn authorizer(&self) -> &MembershipAuthorizer<M> {
        &self.authorizer
    }

    /// Identity stage
    pub fn identify(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let token = extract_bearer(headers).map_err(|_| AuthError::Unauthenticated)?;
        let claims = self
            .codec
            .verify(TokenKind::Access, token)
            .map_err(|e| match e {
                TokenError::Expired => AuthError::AccessTokenExpired,
                _ => AuthError::Unauthenticated,
            })?;
        Ok(Identity {
            user_id: claims.subject(),
        })
    }

    /// Organization named by the tenant header.
    ///
    /// Absent or blank is `MissingOrg`. A value that is not an id cannot name
    /// any membership, so it is `NotMember`.
    pub fn tenant(&self, headers: &HeaderMap) -> AuthResult<OrganizationId> {
        let raw = extract_trimmed(headers, &self.tenant_header).ok_or(AuthError::MissingOrg)?;
        raw.parse().map_err(|_| AuthError::NotMember)
    }

    /// Role stage
    pub async fn authorize(
        &self,
        identity: &Identity,
        headers: &HeaderMap,
        roles: RoleSet,
    ) -> AuthResult<Membership> {
        let organization_id = self.tenant(headers)?;
        self.authorizer
            .require_role(&identity.user_id, &organization_id, roles)
            .await
    }

    pub async fn admit(&self, policy: RoutePolicy, headers: &HeaderMap) -> AuthResult<Admission> {
        if policy.public {
            return Ok(Admission::default());
        }

        let identity = self.identify(headers)?;
        let membership = if policy.required_roles.is_empty() {
            None
        } else {
            Some(self.authorize(&identity, headers, policy.required_roles).await?)
        };

        Ok(Admission {
            identity: Some(identity),
            membership,
        })
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware state: the shared gate plus one route's policy
pub struct PolicyGuard<M> {
    gate: Arc<AuthorizationGate<M>>,
    policy: RoutePolicy,
}

impl<M> Clone for PolicyGuard<M> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            policy: self.policy,
        }
    }
}

pub async fn enforce_policy<M>(
    State(guard): State<PolicyGuard<M>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    M: MembershipRepository + Send + Sync + 'static,
{
    if guard.policy.public {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let admission = guard.gate.admit(guard.policy, &parts.headers).await?;

    if let Some(identity) = admission.identity {
        parts.extensions.insert(identity);
    }
    if let Some(membership) = admission.membership {
        parts.extensions.insert(membership);
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

// ============================================================================
// Router
// ============================================================================

/// Router whose every route carries a [`RoutePolicy`]
pub struct PolicyRouter<S, M> {
    router: Router<S>,
    gate: Arc<AuthorizationGate<M>>,
}

impl<S, M> PolicyRouter<S, M>
where
    S: Clone + Send + Sync + 'static,
    M: MembershipRepository + Send + Sync + 'static,
{
    pub fn new(gate: Arc<AuthorizationGate<M>>) -> Self {
        Self {
            router: Router::new(),
            gate,
        }
    }

    /// Register `method_router` at `path` behind `policy`.
    ///
    /// Several calls with the same path and different methods are merged,
    /// each method keeping its own policy.
    pub fn route(mut self, path: &str, policy: RoutePolicy, method_router: MethodRouter<S>) -> Self {
        let guard = PolicyGuard {
            gate: Arc::clone(&self.gate),
            policy,
        };
        let guarded =
            method_router.route_layer(middleware::from_fn_with_state(guard, enforce_policy::<M>));
        self.router = self.router.route(path, guarded);
        self
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Caller identity. Available on every non-public route.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .map(|identity| CurrentUser(identity.user_id))
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Membership resolved by the role stage. Only available on routes
/// registered with [`RoutePolicy::roles`].
#[derive(Debug, Clone)]
pub struct OrgMembership(pub Membership);

impl<S: Send + Sync> FromRequestParts<S> for OrgMembership {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Membership>()
            .cloned()
            .map(OrgMembership)
            .ok_or_else(|| AuthError::Internal("Route has no role policy".to_string()))
    }
}
