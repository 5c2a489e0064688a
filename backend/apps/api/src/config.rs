//! Server Configuration
//!
//! Read once from the environment at startup. Everything downstream gets
//! its own config struct behind an `Arc`.

use std::env;

use anyhow::{Context, bail};
use auth::{AuthConfig, AuthSettings};
use axum::http::HeaderValue;
use platform::crypto::random_bytes;
use platform::hashing::HashCost;
use tenancy::TenancyConfig;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ACCESS_TTL: &str = "15m";
const DEFAULT_REFRESH_TTL: &str = "30d";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

pub struct ApiConfig {
    pub port: u16,
    /// `None` runs the server on the in-memory stores
    pub database_url: Option<String>,
    pub frontend_origins: Vec<HeaderValue>,
    pub auth: AuthConfig,
    pub tenancy: TenancyConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT is not a port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let hash_cost = match get("PASSWORD_HASH_COST") {
            Some(raw) => {
                let cost: u32 = raw
                    .parse()
                    .with_context(|| format!("PASSWORD_HASH_COST is not a number: {raw}"))?;
                HashCost::new(cost).context("PASSWORD_HASH_COST")?
            }
            None => HashCost::default(),
        };

        let secrets = (get("JWT_ACCESS_SECRET"), get("JWT_REFRESH_SECRET"));
        let mut auth = AuthConfig::from_settings(AuthSettings {
            access_secret: secrets.0.clone().unwrap_or_default(),
            refresh_secret: secrets.1.clone().unwrap_or_default(),
            access_ttl: get("JWT_ACCESS_TTL").unwrap_or_else(|| DEFAULT_ACCESS_TTL.to_string()),
            refresh_ttl: get("JWT_REFRESH_TTL").unwrap_or_else(|| DEFAULT_REFRESH_TTL.to_string()),
            hash_cost,
        });
        match secrets {
            (Some(access), Some(refresh)) if access == refresh => {
                bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
            }
            (Some(_), Some(_)) => {}
            _ if cfg!(debug_assertions) => {
                tracing::warn!("JWT secrets not set, using random secrets for this process");
                auth = auth.with_secrets(random_bytes(32), random_bytes(32));
            }
            _ => bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must be set"),
        }

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            frontend_origins,
            auth,
            tenancy: TenancyConfig::default(),
        })
    }
}
