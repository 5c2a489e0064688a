//! Value Object Module

pub mod email;
pub mod full_name;
pub mod ids;
pub mod membership_role;
pub mod password;
pub mod user_status;
pub mod username;

pub use email::Email;
pub use full_name::FullName;
pub use ids::{AuditEntryId, MembershipId, OrganizationId, RefreshTokenId, UserId};
pub use membership_role::{MembershipRole, RoleSet};
pub use password::Password;
pub use user_status::UserStatus;
pub use username::Username;
