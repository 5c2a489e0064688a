//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::domain::repository::AuthStore;
use auth::presentation::AuthAppState;
use auth::{InMemoryAuthStore, PgAuthRepository, auth_router};
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tenancy::domain::repository::TenancyStore;
use tenancy::{
    InMemoryTenancyStore, PgTenancyRepository, TenancyAppState, TenancyConfig,
    availability_router, organizations_router, services_router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ApiConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Mount every domain router on one pair of stores
fn build_router<A: AuthStore, T: TenancyStore>(
    auth_repo: Arc<A>,
    tenancy_repo: Arc<T>,
    auth_config: Arc<auth::AuthConfig>,
    tenancy_config: Arc<TenancyConfig>,
) -> Router {
    let auth_state = AuthAppState::new(auth_repo, auth_config);
    let gate = auth_state.gate();
    let tenancy_state = TenancyAppState::new(tenancy_repo, auth_state.authorizer(), tenancy_config);

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_router(auth_state, Arc::clone(&gate)))
        .nest(
            "/api/organizations",
            organizations_router(tenancy_state.clone(), Arc::clone(&gate)),
        )
        .nest(
            "/api/services",
            services_router(tenancy_state.clone(), Arc::clone(&gate)),
        )
        .nest("/api/availability", availability_router(tenancy_state, gate))
}

fn cors_layer(origins: Vec<HeaderValue>, tenant_header: HeaderName) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            tenant_header,
        ]))
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tenancy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    let tenant_header = config.auth.tenant_header.clone();
    let auth_config = Arc::new(config.auth);
    let tenancy_config = Arc::new(config.tenancy);

    let router = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            build_router(
                Arc::new(PgAuthRepository::new(pool.clone())),
                Arc::new(PgTenancyRepository::new(pool)),
                auth_config,
                tenancy_config,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running on in-memory stores");
            let auth_store = InMemoryAuthStore::new();
            build_router(
                Arc::new(auth_store.clone()),
                Arc::new(InMemoryTenancyStore::new(auth_store)),
                auth_config,
                tenancy_config,
            )
        }
    };

    let app = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config.frontend_origins, tenant_header)),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
