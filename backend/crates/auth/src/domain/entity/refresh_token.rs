//! Refresh Token Record
//!
//! One record per issued refresh token. Only the hash of the raw token is
//! kept. Records are revoked, never deleted.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::ids::{RefreshTokenId, UserId};

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: RefreshTokenId,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// `None` when `now + ttl` is past the representable range.
    pub fn issue(
        user_id: UserId,
        token_hash: String,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        Some(Self {
            id: RefreshTokenId::new(),
            user_id,
            token_hash,
            expires_at: now.checked_add_signed(ttl)?,
            revoked_at: None,
            created_at: now,
        })
    }

    /// Presentable for rotation: not revoked and not yet expired
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_window() {
        let now = Utc::now();
        let mut record =
            RefreshTokenRecord::issue(UserId::new(), "h".into(), Duration::seconds(60), now)
                .unwrap();
        assert!(record.is_usable(now));
        assert!(!record.is_usable(now + Duration::seconds(60)));

        record.revoked_at = Some(now);
        assert!(!record.is_usable(now));
    }

    #[test]
    fn test_expiry_out_of_range() {
        let ttl = Duration::days(100_000_000);
        assert!(RefreshTokenRecord::issue(UserId::new(), "h".into(), ttl, Utc::now()).is_none());
    }
}
