//! Secret Hashing and Verification
//!
//! Slow, salted one-way hashing for login passwords and refresh-token
//! secrets:
//! - Argon2id, PHC string output (algorithm, parameters and salt embedded)
//! - Configurable work factor ([`HashCost`])
//! - Zeroization of clear text secrets
//! - Blocking-pool variants so hashing never stalls the async executor
//!
//! Verification never fails loudly: a malformed or foreign hash string
//! simply does not match.

use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Work factor
// ============================================================================

/// Clear text behind the dummy hash spent by `SecretHasher::equalize`
const DUMMY_SECRET: &str = "equalize-dummy-secret";

/// Argon2 iterations, fixed. The cost factor scales memory instead.
const ITERATIONS: u32 = 2;

/// Argon2 lanes
const PARALLELISM: u32 = 1;

/// Work factor for [`SecretHasher`].
///
/// Each step doubles the memory Argon2 has to fill, mirroring the
/// exponential meaning of a bcrypt cost: cost 8 uses 1 MiB, the default
/// cost 12 uses 16 MiB, the maximum cost 16 uses 256 MiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HashCost(u32);

impl HashCost {
    pub const MIN: Self = Self(8);
    pub const DEFAULT: Self = Self(12);
    pub const MAX: Self = Self(16);

    pub fn new(cost: u32) -> Result<Self, HashError> {
        if cost < Self::MIN.0 || cost > Self::MAX.0 {
            return Err(HashError::CostOutOfRange {
                cost,
                min: Self::MIN.0,
                max: Self::MAX.0,
            });
        }
        Ok(Self(cost))
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Argon2 memory cost in KiB
    #[inline]
    pub const fn memory_kib(self) -> u32 {
        1 << (self.0 + 2)
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for HashCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Hash cost {cost} is outside {min}..={max}")]
    CostOutOfRange { cost: u32, min: u32, max: u32 },

    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Hashing worker failed: {0}")]
    WorkerFailed(String),
}

// ============================================================================
// Clear text secret (Zeroized on drop)
// ============================================================================

/// Clear text secret with automatic memory zeroization
///
/// Does not implement `Clone`; debug output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearText(Vec<u8>);

impl ClearText {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for ClearText {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for ClearText {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for ClearText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearText").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id hasher bound to one work factor.
///
/// Cheap to clone; the lazily computed dummy hash used by [`equalize`] is
/// shared between clones.
///
/// [`equalize`]: SecretHasher::equalize
#[derive(Clone)]
pub struct SecretHasher {
    cost: HashCost,
    dummy: Arc<OnceLock<String>>,
}

impl SecretHasher {
    pub fn new(cost: HashCost) -> Self {
        Self {
            cost,
            dummy: Arc::new(OnceLock::new()),
        }
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    fn argon2(&self) -> Result<Argon2<'static>, HashError> {
        let params = Params::new(self.cost.memory_kib(), ITERATIONS, PARALLELISM, None)
            .map_err(|e| HashError::HashingFailed(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a secret with a fresh random salt. Returns a PHC string.
    pub fn hash(&self, secret: &ClearText) -> Result<String, HashError> {
        let salt = SaltString::generate(OsRng);
        let hash = self
            .argon2()?
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| HashError::HashingFailed(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a secret against a PHC string.
    ///
    /// Parameters are read from the stored hash, so hashes produced under
    /// an older cost keep verifying after the cost is changed.
    pub fn verify(&self, secret: &ClearText, phc: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }

    /// Index of the first candidate hash the secret verifies against.
    pub fn find_match(&self, secret: &ClearText, candidates: &[String]) -> Option<usize> {
        candidates
            .iter()
            .position(|candidate| self.verify(secret, candidate))
    }

    /// Spend one verification's worth of work without a real hash.
    ///
    /// Called when there is nothing to verify against (unknown account) so
    /// that response time does not reveal whether the account exists.
    ///
    /// A failure to build the dummy hash is logged and not cached, so the
    /// next call tries again.
    pub fn equalize(&self, secret: &ClearText) {
        if let Some(dummy) = self.dummy.get() {
            let _ = self.verify(secret, dummy);
            return;
        }
        match self.hash(&ClearText::from(DUMMY_SECRET)) {
            Ok(hash) => {
                let dummy = self.dummy.get_or_init(|| hash);
                let _ = self.verify(secret, dummy);
            }
            Err(e) => tracing::error!(error = %e, "Failed to build equalizer hash"),
        }
    }

    // ========================================================================
    // Blocking-pool variants
    // ========================================================================

    pub async fn hash_blocking(&self, secret: ClearText) -> Result<String, HashError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| HashError::WorkerFailed(e.to_string()))?
    }

    pub async fn verify_blocking(&self, secret: ClearText, phc: String) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &phc))
            .await
            .unwrap_or(false)
    }

    /// Scan all candidates on one blocking task.
    pub async fn find_match_blocking(
        &self,
        secret: ClearText,
        candidates: Vec<String>,
    ) -> Option<usize> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.find_match(&secret, &candidates))
            .await
            .ok()
            .flatten()
    }

    pub async fn equalize_blocking(&self, secret: ClearText) {
        let hasher = self.clone();
        let _ = tokio::task::spawn_blocking(move || hasher.equalize(&secret)).await;
    }
}

impl fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretHasher")
            .field("cost", &self.cost)
            .finish()
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self::new(HashCost::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> SecretHasher {
        SecretHasher::new(HashCost::MIN)
    }

    #[test]
    fn test_cost_bounds() {
        assert!(HashCost::new(7).is_err());
        assert!(HashCost::new(17).is_err());
        assert_eq!(HashCost::new(8).unwrap(), HashCost::MIN);
        assert_eq!(HashCost::default().get(), 12);
    }

    #[test]
    fn test_cost_doubles_memory() {
        assert_eq!(HashCost::MIN.memory_kib(), 1024);
        assert_eq!(HashCost::new(9).unwrap().memory_kib(), 2048);
        assert_eq!(HashCost::DEFAULT.memory_kib(), 16 * 1024);
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash(&ClearText::from("secret1")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=1024,t=2,p=1"));
        assert!(hasher.verify(&ClearText::from("secret1"), &hash));
        assert!(!hasher.verify(&ClearText::from("wrongpass"), &hash));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = hasher();
        let a = hasher.hash(&ClearText::from("same")).unwrap();
        let b = hasher.hash(&ClearText::from("same")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_does_not_match() {
        let hasher = hasher();
        assert!(!hasher.verify(&ClearText::from("secret1"), ""));
        assert!(!hasher.verify(&ClearText::from("secret1"), "not-a-phc-string"));
        assert!(!hasher.verify(&ClearText::from("secret1"), "$2b$12$bcryptlookingvalue"));
    }

    #[test]
    fn test_verify_uses_stored_parameters() {
        let old = SecretHasher::new(HashCost::new(9).unwrap());
        let hash = old.hash(&ClearText::from("secret1")).unwrap();
        assert!(hasher().verify(&ClearText::from("secret1"), &hash));
    }

    #[test]
    fn test_find_match() {
        let hasher = hasher();
        let candidates = vec![
            hasher.hash(&ClearText::from("a")).unwrap(),
            "garbage".to_string(),
            hasher.hash(&ClearText::from("b")).unwrap(),
        ];
        assert_eq!(hasher.find_match(&ClearText::from("b"), &candidates), Some(2));
        assert_eq!(hasher.find_match(&ClearText::from("c"), &candidates), None);
        assert_eq!(hasher.find_match(&ClearText::from("a"), &[]), None);
    }

    #[test]
    fn test_clear_text_debug_is_redacted() {
        let secret = ClearText::from("hunter22");
        assert!(!format!("{:?}", secret).contains("hunter22"));
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hasher = hasher();
        let hash = hasher
            .hash_blocking(ClearText::from("secret1"))
            .await
            .unwrap();
        assert!(
            hasher
                .verify_blocking(ClearText::from("secret1"), hash.clone())
                .await
        );
        assert_eq!(
            hasher
                .find_match_blocking(ClearText::from("secret1"), vec![hash])
                .await,
            Some(0)
        );
        hasher.equalize_blocking(ClearText::from("anything")).await;
    }

    #[test]
    fn test_equalize_caches_real_hash() {
        let hasher = hasher();
        let clone = hasher.clone();
        assert!(hasher.dummy.get().is_none());

        hasher.equalize(&ClearText::from("anything"));
        let dummy = clone.dummy.get().unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        assert!(hasher.verify(&ClearText::from(DUMMY_SECRET), dummy));
    }
}
