//! Application Layer
//!
//! Use cases and application services.

pub mod authorize;
pub mod config;
pub mod session;
pub mod token;

// Re-exports
pub use authorize::MembershipAuthorizer;
pub use config::{AuthConfig, AuthSettings};
pub use session::{LoginInput, RegisterInput, SessionManager, TokenPair};
pub use token::{TokenClaims, TokenCodec, TokenError, TokenKind};
