//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Slow salted hashing of passwords and refresh-token secrets (Argon2id)
//! - Random secret generation
//! - Request header helpers (bearer credentials, tenant header)

pub mod crypto;
pub mod hashing;
pub mod headers;
