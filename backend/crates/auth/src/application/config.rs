//! Application Configuration
//!
//! Built once at startup and shared read-only through `Arc<AuthConfig>`.

use std::fmt;
use std::time::Duration;

use axum::http::HeaderName;
use platform::crypto::random_bytes;
use platform::hashing::HashCost;

/// Fallback for unparseable TTL strings (15 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime (30 days)
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Longest TTL the grammar accepts (10 years). Longer values fall back.
pub const MAX_TTL: Duration = Duration::from_secs(3650 * 24 * 3600);

/// Default number of refresh records scanned per rotation
pub const DEFAULT_REFRESH_CANDIDATE_LIMIT: u32 = 25;

/// Default tenant header
pub const DEFAULT_TENANT_HEADER: &str = "x-org-id";

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 key for access tokens
    pub access_secret: Vec<u8>,
    /// HS256 key for refresh tokens, independent of the access key
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Work factor for password and refresh token hashes
    pub hash_cost: HashCost,
    /// Newest usable refresh records considered when matching a raw token.
    /// A user with more concurrently valid sessions than this cannot rotate
    /// the oldest ones.
    pub refresh_candidate_limit: u32,
    /// Header carrying the organization id on role-guarded routes
    pub tenant_header: HeaderName,
}

/// Raw settings as read from the environment
#[derive(Clone)]
pub struct AuthSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: String,
    pub refresh_ttl: String,
    pub hash_cost: HashCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: vec![0u8; 32],
            refresh_secret: vec![1u8; 32],
            access_ttl: DEFAULT_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
            hash_cost: HashCost::default(),
            refresh_candidate_limit: DEFAULT_REFRESH_CANDIDATE_LIMIT,
            tenant_header: HeaderName::from_static(DEFAULT_TENANT_HEADER),
        }
    }
}

impl AuthConfig {
    /// Config with random signing secrets (tokens do not survive a restart)
    pub fn with_random_secrets() -> Self {
        Self {
            access_secret: random_bytes(32),
            refresh_secret: random_bytes(32),
            ..Default::default()
        }
    }

    /// Build from raw settings. TTL strings use the `<n><s|m|h|d>` grammar;
    /// anything else falls back to [`DEFAULT_TTL`].
    pub fn from_settings(settings: AuthSettings) -> Self {
        Self {
            access_secret: settings.access_secret.into_bytes(),
            refresh_secret: settings.refresh_secret.into_bytes(),
            access_ttl: ttl_or_default(&settings.access_ttl),
            refresh_ttl: ttl_or_default(&settings.refresh_ttl),
            hash_cost: settings.hash_cost,
            ..Default::default()
        }
    }

    pub fn with_secrets(mut self, access: impl Into<Vec<u8>>, refresh: impl Into<Vec<u8>>) -> Self {
        self.access_secret = access.into();
        self.refresh_secret = refresh.into();
        self
    }

    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("hash_cost", &self.hash_cost)
            .field("refresh_candidate_limit", &self.refresh_candidate_limit)
            .field("tenant_header", &self.tenant_header)
            .finish()
    }
}

// ============================================================================
// TTL grammar
// ============================================================================

/// Parse `<digits><unit>` where unit is `s`, `m`, `h` or `d`, in either case.
///
/// Returns `None` for anything else, for zero, and above [`MAX_TTL`].
pub fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let unit = raw.chars().last()?;
    let digits = &raw[..raw.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit.to_ascii_lowercase() {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86_400,
        _ => return None,
    };

    let seconds = value.checked_mul(multiplier)?;
    (seconds > 0 && seconds <= MAX_TTL.as_secs()).then(|| Duration::from_secs(seconds))
}

/// [`parse_ttl`] with the 15 minute fallback.
pub fn ttl_or_default(raw: &str) -> Duration {
    parse_ttl(raw).unwrap_or(DEFAULT_TTL)
}
