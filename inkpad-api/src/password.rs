//! Credential hashing.
//!
//! Passwords are hashed with bcrypt over `password ‖ user_id`, so two
//! accounts sharing a password still get unrelated hashes before bcrypt's
//! own salt is even applied.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use inkpad_core::UserId;

/// Default bcrypt work factor.
pub const DEFAULT_COST: u32 = 12;

/// Cost range bcrypt accepts.
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Plaintext behind the decoy hash. Never a valid password for anyone.
const DECOY_PASSWORD: &str = "inkpad-decoy-credential";

/// Hasher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    /// bcrypt cost, clamped to 4..=31
    pub cost: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl HasherConfig {
    /// Read `INKPAD_BCRYPT_COST` (default: 12).
    pub fn from_env() -> Self {
        let cost = std::env::var("INKPAD_BCRYPT_COST")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_COST);
        Self::with_cost(cost)
    }

    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    /// Cheapest cost bcrypt accepts. Test suites only.
    pub fn fast() -> Self {
        Self::with_cost(MIN_COST)
    }
}

/// Derives and checks password hashes bound to a user id.
///
/// Both operations are CPU-bound; async callers run them on the blocking
/// pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    config: HasherConfig,
    /// Checked against when the username does not exist. Built on first use.
    decoy: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(config: HasherConfig) -> Self {
        Self {
            config,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    pub fn cost(&self) -> u32 {
        self.config.cost
    }

    fn salted_input(password: &str, user_id: UserId) -> String {
        format!("{}{}", password, user_id.hyphenated())
    }

    /// Hash `password` for `user_id`.
    pub fn hash(&self, password: &str, user_id: UserId) -> ApiResult<String> {
        bcrypt::hash(Self::salted_input(password, user_id), self.config.cost).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::internal_error("Failed to process credentials")
        })
    }

    /// Check `password` against `stored_hash`. A malformed hash is a
    /// mismatch, not an error.
    pub fn verify(&self, password: &str, user_id: UserId, stored_hash: &str) -> bool {
        match bcrypt::verify(Self::salted_input(password, user_id), stored_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }

    /// Run a full bcrypt check that can never succeed.
    ///
    /// Login calls this for unknown usernames so they cost as much as a
    /// wrong password.
    pub fn verify_decoy(&self, password: &str) -> ApiResult<()> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash(DECOY_PASSWORD, Uuid::nil()))?;
        let _ = self.verify(password, Uuid::nil(), decoy);
        Ok(())
    }

    /// [`PasswordHasher::hash`] on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String, user_id: UserId) -> ApiResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password, user_id))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Hashing task failed");
                ApiError::internal_error("Failed to process credentials")
            })?
    }

    /// [`PasswordHasher::verify`] on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        password: String,
        user_id: UserId,
        stored_hash: String,
    ) -> ApiResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, user_id, &stored_hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Verification task failed");
                ApiError::internal_error("Failed to process credentials")
            })
    }

    /// [`PasswordHasher::verify_decoy`] on the blocking thread pool.
    pub async fn verify_decoy_blocking(&self, password: String) -> ApiResult<()> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify_decoy(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Verification task failed");
                ApiError::internal_error("Failed to process credentials")
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_core::new_entity_id;
    use proptest::prelude::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HasherConfig::fast())
    }

    #[test]
    fn test_hash_and_verify() -> ApiResult<()> {
        let hasher = hasher();
        let user_id = new_entity_id();

        let hash = hasher.hash("password1", user_id)?;
        assert!(hash.starts_with("$2"));
        assert!(!hash.contains("password1"));
        assert!(hasher.verify("password1", user_id, &hash));
        assert!(!hasher.verify("password2", user_id, &hash));
        assert!(!hasher.verify("password1", new_entity_id(), &hash));
        Ok(())
    }

    #[test]
    fn test_same_password_different_users() -> ApiResult<()> {
        let hasher = hasher();
        let a = new_entity_id();
        let b = new_entity_id();

        let hash_a = hasher.hash("password1", a)?;
        let hash_b = hasher.hash("password1", b)?;
        assert_ne!(hash_a, hash_b);
        assert!(!hasher.verify("password1", b, &hash_a));
        Ok(())
    }

    #[test]
    fn test_malformed_hash_is_mismatch() {
        let hasher = hasher();
        assert!(!hasher.verify("password1", new_entity_id(), "not-a-bcrypt-hash"));
        assert!(!hasher.verify("password1", new_entity_id(), ""));
    }

    #[test]
    fn test_cost_is_clamped() {
        assert_eq!(HasherConfig::with_cost(1).cost, 4);
        assert_eq!(HasherConfig::with_cost(99).cost, 31);
        assert_eq!(HasherConfig::fast().cost, 4);
        assert_eq!(HasherConfig::default().cost, DEFAULT_COST);
    }

    #[test]
    fn test_decoy_is_built_once_and_never_matches() -> ApiResult<()> {
        let hasher = hasher();
        let shared = hasher.clone();

        hasher.verify_decoy("password1")?;
        let first = hasher.decoy.get().cloned();
        assert!(first.as_deref().is_some_and(|h| h.starts_with("$2")));

        shared.verify_decoy(DECOY_PASSWORD)?;
        assert_eq!(shared.decoy.get().cloned(), first);
        Ok(())
    }

    #[tokio::test]
    async fn test_blocking_variants() -> ApiResult<()> {
        let hasher = hasher();
        let user_id = new_entity_id();

        let hash = hasher.hash_blocking("password1".to_string(), user_id).await?;
        assert!(
            hasher
                .verify_blocking("password1".to_string(), user_id, hash)
                .await?
        );
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_verify_roundtrip(password in "[ -~]{8,36}", mutation in "[a-z]{1,4}") {
            let hasher = hasher();
            let user_id = new_entity_id();
            let hash = hasher.hash(&password, user_id).map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert!(hasher.verify(&password, user_id, &hash));
            prop_assert!(!hasher.verify(&password, new_entity_id(), &hash));
            let mutated = format!("{}{}", password, mutation);
            prop_assert!(!hasher.verify(&mutated, user_id, &hash));
        }
    }
}
