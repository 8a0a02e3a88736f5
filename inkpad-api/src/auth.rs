//! Authentication Module
//!
//! Issues and verifies the bearer tokens handed out at login.
//!
//! Tokens are signed with a per-username key: the server secret joined with
//! the username. A token minted for one username never verifies under
//! another, and renaming a user invalidates their outstanding tokens.

use crate::error::{ApiError, ApiResult};
use inkpad_core::{ConfigError, UserId};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Upper bound for the configurable clock-skew leeway.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

// ============================================================================
// CLOCK ABSTRACTION (FOR DETERMINISTIC TESTS)
// ============================================================================

/// Source of "now" for token expiry checks.
///
/// `jsonwebtoken` reads the system clock itself; we switch that off and
/// check `exp` against this clock instead, so tests can pin time and a
/// broken host clock surfaces as an error instead of a panic.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds. Negative for pre-1970 clocks.
    fn now_epoch_secs(&self) -> i64;
}

/// Reads `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Always answers the wrapped timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}


// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// Server-wide signing secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Fails on an empty secret.
    pub fn new(secret: String) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "INKPAD_JWT_SECRET".to_string(),
            });
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for key derivation).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }

    /// Derive the signing key for `username`.
    fn key_for(&self, username: &str) -> Vec<u8> {
        format!("{}:{}", self.expose(), username).into_bytes()
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Token service configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Server-wide secret; combined with the username to form the signing key
    pub jwt_secret: JwtSecret,

    /// HMAC algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// Token lifetime in seconds (default: 1800)
    pub jwt_expiration_secs: i64,

    /// Leeway applied to `exp`, clamped to 0..=60 (default: 30)
    pub jwt_clock_skew_secs: i64,

    /// Injected so tests can pin time
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret_str =
            std::env::var("INKPAD_JWT_SECRET").unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 1800, // 30 minutes
            jwt_clock_skew_secs: 30,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Parse the `INKPAD_JWT_ALGORITHM` value. Only HMAC algorithms apply
/// since keys are derived from a shared secret.
pub fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.trim().to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::InvalidValue {
            field: "INKPAD_JWT_ALGORITHM".to_string(),
            value: value.to_string(),
            reason: "must be HS256, HS384 or HS512".to_string(),
        }),
    }
}

impl AuthConfig {
    /// Read token settings from the environment.
    ///
    /// # Environment Variables
    /// - `INKPAD_JWT_SECRET`: server signing secret
    /// - `INKPAD_JWT_ALGORITHM`: HS256 | HS384 | HS512 (default: HS256)
    /// - `INKPAD_JWT_EXPIRATION_SECS`: token lifetime (default: 1800)
    /// - `INKPAD_JWT_CLOCK_SKEW_SECS`: expiry leeway, 0-60 (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_str =
            std::env::var("INKPAD_JWT_SECRET").unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        let jwt_algorithm = match std::env::var("INKPAD_JWT_ALGORITHM") {
            Ok(value) => parse_algorithm(&value)?,
            Err(_) => Algorithm::HS256,
        };

        let jwt_expiration_secs = std::env::var("INKPAD_JWT_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(1800);

        let jwt_clock_skew_secs = std::env::var("INKPAD_JWT_CLOCK_SKEW_SECS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(30)
            .clamp(0, MAX_CLOCK_SKEW_SECS);

        Ok(Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm,
            jwt_expiration_secs,
            jwt_clock_skew_secs,
            clock: Arc::new(SystemClock),
        })
    }

    /// Startup gate for the signing secret.
    ///
    /// Production refuses the insecure default and secrets shorter than 32
    /// characters. Development only warns.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        let environment = std::env::var("INKPAD_ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase();

        let is_production = environment == "production" || environment == "prod";

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::internal_error(format!(
                    "INKPAD_JWT_SECRET is unset or still the placeholder \
                     (INKPAD_ENVIRONMENT={}); refusing to start",
                    environment
                )));
            }
            tracing::warn!(
                "INKPAD_JWT_SECRET not set; signing tokens with the placeholder secret"
            );
        }

        if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::internal_error(format!(
                    "INKPAD_JWT_SECRET has {} characters; production needs 32 or more",
                    self.jwt_secret.len()
                )));
            } else if !self.jwt_secret.is_insecure_default() {
                tracing::warn!(
                    secret_len = self.jwt_secret.len(),
                    "INKPAD_JWT_SECRET is shorter than 32 characters"
                );
            }
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username the signing key was derived from
    pub usr: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expires at (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `user_id`, issued now and expiring `expiration_secs` later.
    pub fn new(user_id: UserId, username: &str, expiration_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();

        Self {
            sub: user_id.to_string(),
            usr: username.to_string(),
            iat: now,
            exp: now + expiration_secs,
        }
    }
}

// ============================================================================
// TOKEN SERVICE
// ============================================================================

/// Why a token was refused. Only ever logged; callers see one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenRejection {
    Malformed,
    BadSignature,
    Expired,
    UsernameMismatch,
    BadSubject,
}

/// `exp` checked against our own clock, with `leeway_secs` of grace.
fn check_expiry(now: i64, exp: i64, leeway_secs: i64) -> Result<(), TokenRejection> {
    if exp < now - leeway_secs {
        return Err(TokenRejection::Expired);
    }
    Ok(())
}

/// Issues and verifies per-username bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Issue a token for `user_id`, signed with the key for `username`.
    pub fn issue(&self, user_id: UserId, username: &str) -> ApiResult<String> {
        let claims = Claims::new(
            user_id,
            username,
            self.config.jwt_expiration_secs,
            &*self.config.clock,
        );

        let encoding_key = EncodingKey::from_secret(&self.config.jwt_secret.key_for(username));
        let header = Header::new(self.config.jwt_algorithm);

        encode(&header, &claims, &encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            ApiError::internal_error("Failed to generate token")
        })
    }

    /// Verify `token` for `username` and return the embedded user id.
    ///
    /// Tampered, expired, and foreign tokens all yield `InvalidToken`.
    /// A host clock before 1970 is reported as an internal error.
    pub fn verify(&self, token: &str, username: &str) -> ApiResult<UserId> {
        let now = self.config.clock.now_epoch_secs();
        if now < 0 {
            tracing::error!(
                timestamp = now,
                "Host clock reads before 1970, refusing to check tokens"
            );
            return Err(ApiError::internal_error(
                "Server clock is misconfigured",
            ));
        }

        self.check(token, username, now).map_err(|reason| {
            tracing::debug!(?reason, username = %username, "Token rejected");
            ApiError::invalid_token()
        })
    }

    fn check(&self, token: &str, username: &str, now: i64) -> Result<UserId, TokenRejection> {
        let decoding_key = DecodingKey::from_secret(&self.config.jwt_secret.key_for(username));

        // Signature only; time checks run against our clock below.
        let mut validation = Validation::new(self.config.jwt_algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            }
        })?;
        let claims = token_data.claims;

        check_expiry(now, claims.exp, self.config.jwt_clock_skew_secs)?;

        if claims.usr != username {
            return Err(TokenRejection::UsernameMismatch);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| TokenRejection::BadSubject)
    }
}
