//! Account Service
//!
//! Registration, login, account deletion, and the token-guarded activity
//! lookup.

use std::sync::Arc;

use chrono::Utc;
use inkpad_core::{new_entity_id, User, UserActivity, UserId};
use inkpad_storage::Store;

use crate::auth::TokenService;
use crate::error::{ApiError, ApiResult};
use crate::password::PasswordHasher;
use crate::services::ActivityService;
use crate::telemetry::metrics;
use crate::types::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse};
use crate::validation::{validate_email, validate_password, validate_username};

fn record_event(event: &str) {
    if let Some(metrics) = metrics() {
        metrics.record_account_event(event);
    }
}

pub struct AccountService {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    activity: Arc<ActivityService>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        activity: Arc<ActivityService>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            activity,
        }
    }

    /// Create a user and its zeroed counters.
    ///
    /// A taken username or email is reported as a conflict naming the field.
    /// Nothing is persisted on any failure.
    pub async fn register(&self, req: RegisterRequest) -> ApiResult<RegisterResponse> {
        validate_username(&req.username)?;
        validate_email(&req.email)?;
        validate_password(&req.password)?;

        let user_id = new_entity_id();
        let password_hash = self.hasher.hash_blocking(req.password, user_id).await?;

        let user = User {
            user_id,
            username: req.username,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.user_insert_with_activity(&user).await {
            tracing::info!(username = %user.username, error = %e, "Registration rejected");
            return Err(e.into());
        }

        tracing::info!(user_id = %user_id, username = %user.username, "User registered");
        record_event("registered");

        Ok(RegisterResponse {
            message: format!(
                "User '{}' registered successfully. Your user ID is {}.",
                user.username, user_id
            ),
            user_id,
        })
    }

    /// Check credentials, bump `times_logged_in`, and issue a token.
    ///
    /// Unknown usernames and wrong passwords produce the same error after the
    /// same bcrypt work; the distinction only shows up in the logs.
    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginResponse> {
        if req.username.is_empty() || req.password.is_empty() {
            return Err(ApiError::validation_failed("Username and password required."));
        }

        let Some(user) = self.store.user_get_by_username(&req.username).await? else {
            self.hasher.verify_decoy_blocking(req.password).await?;
            tracing::info!(username = %req.username, reason = "unknown_username", "Login failed");
            record_event("login_failed");
            return Err(ApiError::invalid_credentials());
        };

        let matches = self
            .hasher
            .verify_blocking(req.password, user.user_id, user.password_hash.clone())
            .await?;
        if !matches {
            tracing::info!(user_id = %user.user_id, reason = "password_mismatch", "Login failed");
            record_event("login_failed");
            return Err(ApiError::invalid_credentials());
        }

        let token = self.tokens.issue(user.user_id, &user.username)?;

        if !self.store.activity_record_login(user.user_id).await? {
            tracing::warn!(user_id = %user.user_id, "Login counter missing for user");
        }

        tracing::info!(user_id = %user.user_id, "User logged in");
        record_event("login_succeeded");

        Ok(LoginResponse {
            message: format!("Login successful! Welcome back, {}.", user.username),
            user_id: user.user_id,
            token,
        })
    }

    /// Delete a user together with their notes and counters.
    pub async fn delete_account(&self, user_id: UserId) -> ApiResult<MessageResponse> {
        if !self.store.user_delete(user_id).await? {
            return Err(ApiError::user_not_found(user_id));
        }

        tracing::info!(user_id = %user_id, "User deleted");
        record_event("deleted");

        Ok(MessageResponse::new(format!(
            "User '{}' deleted successfully.",
            user_id
        )))
    }

    /// Counters for `username`, provided `token` was issued to that username.
    pub async fn activity_for(&self, username: &str, token: &str) -> ApiResult<UserActivity> {
        let token_user = self.tokens.verify(token, username)?;
        let activity = self.activity.get_by_username(username).await?;

        // A token for a deleted-then-reregistered username carries the old id.
        if activity.user_id != token_user {
            tracing::debug!(username = %username, "Token subject does not match account");
            return Err(ApiError::invalid_token());
        }
        Ok(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, FixedClock, JwtSecret};
    use crate::error::ErrorCode;
    use crate::password::HasherConfig;
    use inkpad_core::UniqueField;
    use inkpad_storage::MemoryStore;

    const NOW: i64 = 1_800_000_000;

    struct Harness {
        store: Arc<MemoryStore>,
        accounts: AccountService,
    }

    fn harness() -> Result<Harness, Box<dyn std::error::Error>> {
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn Store> = store.clone();
        let tokens = Arc::new(TokenService::new(AuthConfig {
            jwt_secret: JwtSecret::new("unit-test-secret-that-is-long-enough!".to_string())?,
            clock: Arc::new(FixedClock(NOW)),
            ..AuthConfig::default()
        }));
        let activity = Arc::new(ActivityService::new(dyn_store.clone()));
        let accounts = AccountService::new(
            dyn_store,
            PasswordHasher::new(HasherConfig::fast()),
            tokens,
            activity,
        );
        Ok(Harness { store, accounts })
    }

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "password1".to_string(),
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        let registered = h.accounts.register(register_req("alice", "a@x.com")).await?;
        assert!(registered.message.contains("alice"));
        assert!(registered.message.contains(&registered.user_id.to_string()));

        let login = h.accounts.login(login_req("alice", "password1")).await?;
        assert_eq!(login.user_id, registered.user_id);
        assert_eq!(login.message, "Login successful! Welcome back, alice.");

        let activity = h.accounts.activity_for("alice", &login.token).await?;
        assert_eq!(activity.times_logged_in, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_conflicts_name_field() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        h.accounts.register(register_req("alice", "a@x.com")).await?;

        let err = h.accounts.register(register_req("alice", "other@x.com")).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::UsernameTaken));

        let err = h.accounts.register(register_req("bob", "a@x.com")).await.err();
        assert_eq!(err.as_ref().map(|e| e.code), Some(ErrorCode::EmailTaken));
        assert_eq!(
            err.and_then(|e| e.details),
            Some(serde_json::json!({ "field": UniqueField::Email.as_str() }))
        );

        h.accounts.register(register_req("bob", "b@x.com")).await?;
        assert_eq!(h.store.user_count().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_validation_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        let mut req = register_req("alice", "a@x.com");
        req.password = "short".to_string();
        assert!(h.accounts.register(req).await.is_err());
        assert!(h.accounts.register(register_req("al", "a@x.com")).await.is_err());
        assert!(h.accounts.register(register_req("alice", "nope")).await.is_err());
        assert_eq!(h.store.user_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_register_rolls_back_on_commit_failure() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        h.store.fail_next_commit();
        let err = h.accounts.register(register_req("alice", "a@x.com")).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::DatabaseError));
        assert_eq!(h.store.user_count().await, 0);

        h.accounts.register(register_req("alice", "a@x.com")).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        h.accounts.register(register_req("alice", "a@x.com")).await?;

        let wrong_password = h.accounts.login(login_req("alice", "password2")).await.err();
        let unknown_user = h.accounts.login(login_req("nobody", "password1")).await.err();
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(
            wrong_password.map(|e| e.code),
            Some(ErrorCode::InvalidCredentials)
        );

        let activity = h.store.activity_get_by_username("alice").await?;
        assert_eq!(activity.map(|a| a.times_logged_in), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        let err = h.accounts.login(login_req("", "password1")).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::ValidationFailed));
        Ok(())
    }

    #[tokio::test]
    async fn test_activity_rejects_foreign_token() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        h.accounts.register(register_req("alice", "a@x.com")).await?;
        h.accounts.register(register_req("bob", "b@x.com")).await?;
        let bob = h.accounts.login(login_req("bob", "password1")).await?;

        let err = h.accounts.activity_for("alice", &bob.token).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::InvalidToken));
        Ok(())
    }

    #[tokio::test]
    async fn test_token_outlives_reregistered_username() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        let first = h.accounts.register(register_req("alice", "a@x.com")).await?;
        let login = h.accounts.login(login_req("alice", "password1")).await?;

        h.accounts.delete_account(first.user_id).await?;
        h.accounts.register(register_req("alice", "a@x.com")).await?;

        let err = h.accounts.activity_for("alice", &login.token).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::InvalidToken));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account() -> Result<(), Box<dyn std::error::Error>> {
        let h = harness()?;
        let registered = h.accounts.register(register_req("alice", "a@x.com")).await?;

        let deleted = h.accounts.delete_account(registered.user_id).await?;
        assert!(deleted.message.contains(&registered.user_id.to_string()));
        assert_eq!(h.store.user_count().await, 0);

        let err = h.accounts.delete_account(registered.user_id).await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::UserNotFound));
        Ok(())
    }
}
