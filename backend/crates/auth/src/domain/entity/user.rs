//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, full_name::FullName, ids::UserId, user_status::UserStatus, username::Username,
};

/// Identity record
///
/// `password_hash` is a PHC string and never leaves the auth crate.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Option<Username>,
    pub full_name: Option<FullName>,
    pub password_hash: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New active user
    pub fn register(
        email: Email,
        username: Option<Username>,
        full_name: Option<FullName>,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            username,
            full_name,
            password_hash,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }
}
