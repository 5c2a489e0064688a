//! Flow tests for the auth crate
//!
//! Session lifecycle against the in-memory store, membership checks, and
//! the authorization gate driven over HTTP.

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use platform::hashing::HashCost;

    use crate::application::{AuthConfig, RegisterInput, SessionManager};
    use crate::infra::memory::InMemoryAuthStore;
    use crate::presentation::handlers::AuthAppState;

    pub type Sessions = SessionManager<InMemoryAuthStore, InMemoryAuthStore>;

    pub fn config() -> AuthConfig {
        AuthConfig::with_random_secrets().with_hash_cost(HashCost::MIN)
    }

    pub fn state_with(config: AuthConfig) -> AuthAppState<InMemoryAuthStore> {
        AuthAppState::new(Arc::new(InMemoryAuthStore::new()), Arc::new(config))
    }

    pub fn state() -> AuthAppState<InMemoryAuthStore> {
        state_with(config())
    }

    pub fn register_input(email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: password.to_string(),
            username: None,
            full_name: None,
        }
    }
}

#[cfg(test)]
mod session_tests {
    use chrono::Utc;
    use kernel::error::kind::ErrorKind;

    use super::support::*;
    use crate::application::{LoginInput, RegisterInput, TokenKind};
    use crate::domain::entity::AuditAction;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_status::UserStatus};
    use crate::error::AuthError;

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_login_refresh_scenario() {
        let state = state();
        let sessions = state.sessions();

        sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();

        let err = sessions.login(login("a@x.com", "wrongpass")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let pair = sessions.login(login("a@x.com", "secret1")).await.unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);

        let user = state
            .repo
            .find_by_email(&Email::new("a@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        let claims = state
            .codec
            .verify(TokenKind::Access, &pair.access_token)
            .unwrap();
        assert_eq!(claims.subject(), user.id);
        assert_eq!(claims.kind, TokenKind::Access);

        let rotated = sessions.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);
        assert_ne!(rotated.access_token, pair.access_token);

        let reuse = sessions.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(reuse, AuthError::InvalidRefreshToken));

        // The replacement is itself usable once
        sessions.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_registered_user_is_active_and_normalized() {
        let state = state();
        state
            .sessions()
            .register(RegisterInput {
                email: "  Mixed@Case.COM ".into(),
                password: "secret1".into(),
                username: Some("  ayse ".into()),
                full_name: Some("   ".into()),
            })
            .await
            .unwrap();

        let user = state
            .repo
            .find_by_email(&Email::new("mixed@case.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.username.as_ref().map(|u| u.as_str()), Some("ayse"));
        assert!(user.full_name.is_none());
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_duplicate_email_and_username() {
        let state = state();
        let sessions = state.sessions();

        sessions
            .register(RegisterInput {
                email: "A@X.com".into(),
                password: "secret1".into(),
                username: Some("ayse".into()),
                full_name: None,
            })
            .await
            .unwrap();

        let err = sessions
            .register(register_input(" a@x.COM ", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = sessions
            .register(RegisterInput {
                email: "b@x.com".into(),
                password: "secret1".into(),
                username: Some("ayse".into()),
                full_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let sessions = state().sessions();
        let err = sessions
            .register(register_input("not-an-email", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = sessions
            .register(register_input("a@x.com", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = state();
        let sessions = state.sessions();
        sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        sessions
            .register(register_input("off@x.com", "secret1"))
            .await
            .unwrap();

        let disabled = state
            .repo
            .find_by_email(&Email::new("off@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        state
            .repo
            .set_user_status(&disabled.id, UserStatus::Disabled)
            .await;

        let wrong_password = sessions.login(login("a@x.com", "wrongpass")).await.unwrap_err();
        let unknown = sessions.login(login("nobody@x.com", "secret1")).await.unwrap_err();
        let inactive = sessions.login(login("off@x.com", "secret1")).await.unwrap_err();
        let malformed = sessions.login(login("not-an-email", "secret1")).await.unwrap_err();

        let rendered: Vec<_> = [wrong_password, unknown, inactive, malformed]
            .iter()
            .map(|e| {
                let app = e.to_app_error();
                (app.status_code(), app.code(), app.message().to_string())
            })
            .collect();
        assert!(rendered.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(rendered[0].1, "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_refresh_rejects_bad_input() {
        let state = state();
        let sessions = state.sessions();
        let pair = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();

        for raw in ["", "   ", "garbage", pair.access_token.as_str()] {
            let err = sessions.refresh(raw).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidRefreshToken), "{raw}");
        }

        // Signed by another deployment
        let foreign = state_with(config())
            .sessions()
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        let err = sessions.refresh(&foreign.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_refresh_rejects_disabled_user() {
        let state = state();
        let sessions = state.sessions();
        let pair = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        let user = state
            .repo
            .find_by_email(&Email::new("a@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();

        state.repo.set_user_status(&user.id, UserStatus::Disabled).await;

        let err = sessions.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
    }

    #[tokio::test]
    async fn test_concurrent_refresh_succeeds_once() {
        let state = state();
        let sessions = state.sessions();
        let pair = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            sessions.refresh(&pair.refresh_token),
            sessions.refresh(&pair.refresh_token)
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        let failure = a.err().or(b.err()).unwrap();
        assert!(matches!(failure, AuthError::InvalidRefreshToken));

        let rotations = state
            .repo
            .audit_entries()
            .await
            .iter()
            .filter(|e| e.action == AuditAction::Rotate)
            .count();
        assert_eq!(rotations, 1);
    }

    #[tokio::test]
    async fn test_refresh_tokens_are_stored_hashed() {
        let state = state();
        let pair = state
            .sessions()
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        let claims = state
            .codec
            .verify(TokenKind::Refresh, &pair.refresh_token)
            .unwrap();

        let records = state.repo.refresh_records(&claims.subject()).await;
        assert_eq!(records.len(), 1);
        assert_ne!(records[0].token_hash, pair.refresh_token);
        assert!(records[0].token_hash.starts_with("$argon2id$"));
        assert!(records[0].is_usable(Utc::now()));
    }

    #[tokio::test]
    async fn test_unrepresentable_refresh_expiry_leaves_no_account() {
        let mut config = config();
        config.refresh_ttl = std::time::Duration::from_secs(100_000_000 * 86_400);
        let state = state_with(config);

        let err = state
            .sessions()
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(err.kind(), ErrorKind::InternalServerError);

        let email = Email::new("a@x.com").unwrap();
        assert!(state.repo.find_by_email(&email).await.unwrap().is_none());
        assert!(state.repo.audit_entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let state = state();
        let sessions = state.sessions();
        let pair = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();

        sessions.logout(&pair.refresh_token).await.unwrap();
        sessions.logout(&pair.refresh_token).await.unwrap();
        sessions.logout("garbage").await.unwrap();
        sessions.logout("").await.unwrap();

        let err = sessions.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));

        let logouts = state
            .repo
            .audit_entries()
            .await
            .iter()
            .filter(|e| e.action == AuditAction::Logout)
            .count();
        assert_eq!(logouts, 1);
    }

    #[tokio::test]
    async fn test_audit_exactly_once_per_accepted_change() {
        let state = state();
        let sessions = state.sessions();

        let pair = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        let _ = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap_err();
        let _ = sessions.login(login("a@x.com", "wrongpass")).await.unwrap_err();
        sessions.login(login("a@x.com", "secret1")).await.unwrap();
        let rotated = sessions.refresh(&pair.refresh_token).await.unwrap();
        let _ = sessions.refresh(&pair.refresh_token).await.unwrap_err();

        let entries = state.repo.audit_entries().await;
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![AuditAction::Register, AuditAction::Login, AuditAction::Rotate]
        );

        let register = &entries[0];
        assert_eq!(register.entity_type, "User");
        assert_eq!(register.metadata["email"], "a@x.com");
        assert!(register.organization_id.is_none());

        let rotate = &entries[2];
        assert_eq!(rotate.entity_type, "RefreshToken");
        assert_eq!(rotate.metadata["rotate"], true);

        let claims = state
            .codec
            .verify(TokenKind::Refresh, &rotated.refresh_token)
            .unwrap();
        let records = state.repo.refresh_records(&claims.subject()).await;
        let replaced_by = rotate.metadata["replacedBy"].as_str().unwrap();
        let replacement = records.iter().find(|r| r.id.to_string() == replaced_by);
        assert!(replacement.is_some_and(|r| r.revoked_at.is_none()));
    }

    #[tokio::test]
    async fn test_candidate_window_is_bounded() {
        let mut config = config();
        config.refresh_candidate_limit = 2;
        let sessions = state_with(config).sessions();

        let first = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        sessions.login(login("a@x.com", "secret1")).await.unwrap();
        let newest = sessions.login(login("a@x.com", "secret1")).await.unwrap();

        // Three usable sessions, only the two newest are scanned
        let err = sessions.refresh(&first.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
        sessions.refresh(&newest.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_me() {
        let state = state();
        let sessions = state.sessions();
        let pair = sessions
            .register(register_input("a@x.com", "secret1"))
            .await
            .unwrap();
        let user_id = state
            .codec
            .verify(TokenKind::Access, &pair.access_token)
            .unwrap()
            .subject();

        assert_eq!(sessions.me(&user_id).await.unwrap().email.as_str(), "a@x.com");
        assert!(matches!(
            sessions.me(&crate::domain::value_object::ids::UserId::new()).await,
            Err(AuthError::Unauthenticated)
        ));
    }
}

#[cfg(test)]
mod authorizer_tests {
    use super::support::*;
    use crate::domain::entity::Membership;
    use crate::domain::value_object::{
        ids::{OrganizationId, UserId},
        membership_role::{MembershipRole, RoleSet},
    };
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_require_role() {
        let state = state();
        let org = OrganizationId::new();
        let owner = UserId::new();
        let staff = UserId::new();
        let stranger = UserId::new();

        state
            .repo
            .insert_membership(Membership::new(owner, org, MembershipRole::Owner))
            .await
            .unwrap();
        state
            .repo
            .insert_membership(Membership::new(staff, org, MembershipRole::Staff))
            .await
            .unwrap();

        let authorizer = state.authorizer();

        let membership = authorizer.require_role(&owner, &org, RoleSet::OWNER).await.unwrap();
        assert_eq!(membership.role, MembershipRole::Owner);
        assert_eq!(membership.organization_id, org);

        let err = authorizer.require_role(&staff, &org, RoleSet::OWNER).await.unwrap_err();
        assert!(matches!(err, AuthError::InsufficientRole));

        let err = authorizer
            .require_role(&stranger, &org, RoleSet::OWNER)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotMember));

        let err = authorizer
            .require_membership(&owner, &OrganizationId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotMember));
    }

    #[tokio::test]
    async fn test_has_role() {
        let state = state();
        let org = OrganizationId::new();
        let staff = UserId::new();
        state
            .repo
            .insert_membership(Membership::new(staff, org, MembershipRole::Staff))
            .await
            .unwrap();

        let authorizer = state.authorizer();
        assert!(authorizer.has_role(&staff, &org, RoleSet::STAFF_OR_ABOVE).await.unwrap());
        assert!(!authorizer.has_role(&staff, &org, RoleSet::MANAGERS).await.unwrap());
        assert!(!authorizer.has_role(&UserId::new(), &org, RoleSet::STAFF_OR_ABOVE).await.unwrap());
    }

    #[tokio::test]
    async fn test_membership_pair_is_unique() {
        let state = state();
        let (user, org) = (UserId::new(), OrganizationId::new());
        state
            .repo
            .insert_membership(Membership::new(user, org, MembershipRole::Staff))
            .await
            .unwrap();
        assert!(state
            .repo
            .insert_membership(Membership::new(user, org, MembershipRole::Owner))
            .await
            .is_err());
    }
}

#[cfg(test)]
mod gate_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::{MembershipAuthorizer, TokenCodec, TokenKind};
    use crate::domain::entity::Membership;
    use crate::domain::repository::MembershipRepository;
    use crate::domain::value_object::{
        ids::{OrganizationId, UserId},
        membership_role::{MembershipRole, RoleSet},
    };
    use crate::error::AuthResult;
    use crate::infra::memory::InMemoryAuthStore;
    use crate::presentation::gate::{
        AuthorizationGate, CurrentUser, OrgMembership, PolicyRouter, RoutePolicy,
    };

    /// Membership store that counts lookups
    #[derive(Default)]
    struct CountingMemberships {
        inner: InMemoryAuthStore,
        lookups: AtomicUsize,
    }

    impl MembershipRepository for CountingMemberships {
        async fn find_membership(
            &self,
            user_id: &UserId,
            organization_id: &OrganizationId,
        ) -> AuthResult<Option<Membership>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_membership(user_id, organization_id).await
        }
    }

    struct Harness {
        app: Router,
        codec: Arc<TokenCodec>,
        memberships: Arc<CountingMemberships>,
    }

    async fn whoami(CurrentUser(user_id): CurrentUser) -> String {
        user_id.to_string()
    }

    async fn role(OrgMembership(membership): OrgMembership) -> String {
        membership.role.to_string()
    }

    fn harness() -> Harness {
        let config = config();
        let codec = Arc::new(TokenCodec::new(&config));
        let memberships = Arc::new(CountingMemberships::default());
        let gate = Arc::new(AuthorizationGate::new(
            Arc::clone(&codec),
            MembershipAuthorizer::new(Arc::clone(&memberships)),
            config.tenant_header.clone(),
        ));

        let app = PolicyRouter::new(gate)
            .route("/open", RoutePolicy::PUBLIC, get(|| async { "open" }))
            .route("/whoami", RoutePolicy::AUTHENTICATED, get(whoami))
            .route("/managers", RoutePolicy::roles(RoleSet::MANAGERS), get(role))
            .into_router();

        Harness {
            app,
            codec,
            memberships,
        }
    }

    impl Harness {
        fn access_token(&self, user_id: &UserId) -> String {
            self.codec
                .issue(TokenKind::Access, user_id, Duration::from_secs(60))
                .unwrap()
        }

        async fn join(&self, user_id: UserId, org: OrganizationId, role: MembershipRole) {
            self.memberships
                .inner
                .insert_membership(Membership::new(user_id, org, role))
                .await
                .unwrap();
        }

        async fn call(&self, uri: &str, token: Option<&str>, org: Option<&str>) -> (StatusCode, Value, String) {
            let mut req = Request::builder().uri(uri);
            if let Some(token) = token {
                req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            if let Some(org) = org {
                req = req.header("x-org-id", org);
            }
            let res = self
                .app
                .clone()
                .oneshot(req.body(Body::empty()).unwrap())
                .await
                .unwrap();
            let status = res.status();
            let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let text = String::from_utf8_lossy(&bytes).to_string();
            let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, json, text)
        }
    }

    #[tokio::test]
    async fn test_public_route_needs_no_token() {
        let h = harness();
        let (status, _, body) = h.call("/open", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "open");
    }

    #[tokio::test]
    async fn test_missing_or_invalid_token() {
        let h = harness();

        let (status, json, _) = h.call("/whoami", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHENTICATED");

        let (status, json, _) = h.call("/whoami", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHENTICATED");

        // A refresh token is not an access token
        let refresh = h
            .codec
            .issue(TokenKind::Refresh, &UserId::new(), Duration::from_secs(60))
            .unwrap();
        let (status, json, _) = h.call("/whoami", Some(&refresh), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_expired_token_is_distinguished() {
        let h = harness();
        let expired = h
            .codec
            .issue_at(
                TokenKind::Access,
                &UserId::new(),
                Duration::from_secs(10),
                Utc::now().timestamp() - 3600,
            )
            .unwrap();

        let (status, json, _) = h.call("/whoami", Some(&expired), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "ACCESS_TOKEN_EXPIRED");
        assert_eq!(json["detail"], "Access Token expired");
    }

    #[tokio::test]
    async fn test_authenticated_route_exposes_identity() {
        let h = harness();
        let user = UserId::new();
        let token = h.access_token(&user);

        let (status, _, body) = h.call("/whoami", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, user.to_string());
        assert_eq!(h.memberships.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_org_fails_before_role_check() {
        let h = harness();
        let user = UserId::new();
        let token = h.access_token(&user);

        let (status, json, _) = h.call("/managers", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MISSING_ORG");

        let (status, json, _) = h.call("/managers", Some(&token), Some("   ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "MISSING_ORG");

        assert_eq!(h.memberships.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identity_checked_before_tenant() {
        let h = harness();
        let (status, json, _) = h.call("/managers", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_role_stage() {
        let h = harness();
        let org = OrganizationId::new();
        let admin = UserId::new();
        let staff = UserId::new();
        h.join(admin, org, MembershipRole::Admin).await;
        h.join(staff, org, MembershipRole::Staff).await;
        let org_header = org.to_string();

        let (status, _, body) = h
            .call("/managers", Some(&h.access_token(&admin)), Some(&org_header))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ADMIN");

        let (status, json, _) = h
            .call("/managers", Some(&h.access_token(&staff)), Some(&org_header))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "INSUFFICIENT_ROLE");

        let (status, json, _) = h
            .call("/managers", Some(&h.access_token(&UserId::new())), Some(&org_header))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "NOT_MEMBER");

        let (status, json, _) = h
            .call("/managers", Some(&h.access_token(&admin)), Some("not-a-uuid"))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "NOT_MEMBER");
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::presentation::router::auth_router;

    async fn post(app: &axum::Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let res = app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_auth_endpoints() {
        let state = state();
        let gate = state.gate();
        let app = auth_router(state, Arc::clone(&gate));

        let (status, pair) = post(
            &app,
            "/register",
            None,
            json!({ "email": "a@x.com", "password": "secret1", "fullName": "Ada" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(pair["tokenType"], "Bearer");
        let access = pair["accessToken"].as_str().unwrap().to_string();
        let refresh = pair["refreshToken"].as_str().unwrap().to_string();

        let (status, err) = post(
            &app,
            "/register",
            None,
            json!({ "email": "A@x.com", "password": "secret1" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "EMAIL_TAKEN");

        let (status, err) = post(
            &app,
            "/login",
            None,
            json!({ "email": "a@x.com", "password": "wrongpass" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["code"], "INVALID_CREDENTIALS");

        let me = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {access}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        let me: Value = serde_json::from_slice(&to_bytes(me.into_body(), usize::MAX).await.unwrap()).unwrap();
        assert_eq!(me["email"], "a@x.com");
        assert_eq!(me["fullName"], "Ada");
        assert_eq!(me["status"], "ACTIVE");
        assert!(me.get("passwordHash").is_none());

        let (status, _) = post(&app, "/logout", None, json!({ "refreshToken": refresh })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, ok) = post(&app, "/logout", Some(&access), json!({ "refreshToken": refresh })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ok["ok"], true);

        let (status, err) = post(&app, "/refresh", None, json!({ "refreshToken": refresh })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["code"], "INVALID_REFRESH_TOKEN");
    }
}
