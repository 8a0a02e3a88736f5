//! HTTP error envelope for inkpad.
//!
//! Every failing handler returns an [`ApiError`], rendered as
//! `{"code", "message", "details"?}` with the status taken from its
//! [`ErrorCode`]. Server-side failures answer 400 with generic text; the
//! detail is logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inkpad_core::{ConfigError, StorageError, UniqueField};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Machine-readable failure kind, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// No bearer token was presented
    Unauthorized,

    /// Token is malformed, expired, or signed for another user
    InvalidToken,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Body, path, or query did not pass validation
    ValidationFailed,

    /// A field was absent or blank
    MissingField,

    /// A length or size limit was exceeded
    InvalidRange,

    /// A field could not be parsed
    InvalidFormat,

    /// Username or password did not match
    InvalidCredentials,

    // ========================================================================
    // Conflict Errors (400)
    // ========================================================================
    /// Username is already registered
    UsernameTaken,

    /// Email is already registered
    EmailTaken,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested user does not exist
    UserNotFound,

    /// Requested note does not exist or belongs to another user
    NoteNotFound,

    /// Requested activity record does not exist
    ActivityNotFound,

    /// No route matches the request
    RouteNotFound,

    /// The handler did not finish within the configured request timeout
    RequestTimeout,

    // ========================================================================
    // Server Errors (reported as 400)
    // ========================================================================
    /// Anything the handler did not anticipate
    InternalError,

    /// The store rejected or lost the operation
    DatabaseError,

    /// Timed out waiting for a pooled connection
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// Status this code is answered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,

            ErrorCode::ValidationFailed
            | ErrorCode::MissingField
            | ErrorCode::InvalidRange
            | ErrorCode::InvalidFormat
            | ErrorCode::InvalidCredentials
            | ErrorCode::UsernameTaken
            | ErrorCode::EmailTaken => StatusCode::BAD_REQUEST,

            ErrorCode::UserNotFound
            | ErrorCode::NoteNotFound
            | ErrorCode::ActivityNotFound
            | ErrorCode::RouteNotFound => StatusCode::NOT_FOUND,

            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,

            // Unexpected failures keep the 400 contract of the public API.
            ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::ConnectionPoolExhausted => StatusCode::BAD_REQUEST,
        }
    }

    /// Message used when the caller supplies none.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Missing bearer token",
            ErrorCode::InvalidToken => "Invalid or expired token",

            ErrorCode::ValidationFailed => "Invalid request",
            ErrorCode::MissingField => "A required field is missing",
            ErrorCode::InvalidRange => "A value exceeds its allowed length",
            ErrorCode::InvalidFormat => "Malformed value",
            ErrorCode::InvalidCredentials => "Invalid credentials.",

            ErrorCode::UsernameTaken => "Username already in use.",
            ErrorCode::EmailTaken => "Email already registered.",

            ErrorCode::UserNotFound => "User not found",
            ErrorCode::NoteNotFound => "Note not found or unauthorized.",
            ErrorCode::ActivityNotFound => "User activity not found",
            ErrorCode::RouteNotFound => "Resource not found",
            ErrorCode::RequestTimeout => "Request timed out",

            ErrorCode::InternalError => "An unexpected error occurred",
            ErrorCode::DatabaseError => "Storage operation failed",
            ErrorCode::ConnectionPoolExhausted => "Storage is busy, try again",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,

    pub message: String,

    /// Optional additional details (field errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Error with an explicit message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error carrying the code's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Attach a `details` object.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ------------------------------------------------------------------------
    // Named constructors
    // ------------------------------------------------------------------------

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Every token failure collapses into this one error.
    pub fn invalid_token() -> Self {
        Self::from_code(ErrorCode::InvalidToken)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("{} is required", field),
        )
    }

    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("{} length must be between {} and {}", field, min, max),
        )
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("{} is malformed, expected {}", field, expected),
        )
    }

    /// Unknown username and wrong password look the same to the caller.
    pub fn invalid_credentials() -> Self {
        Self::from_code(ErrorCode::InvalidCredentials)
    }

    pub fn username_taken() -> Self {
        Self::from_code(ErrorCode::UsernameTaken)
            .with_details(serde_json::json!({ "field": "username" }))
    }

    pub fn email_taken() -> Self {
        Self::from_code(ErrorCode::EmailTaken).with_details(serde_json::json!({ "field": "email" }))
    }

    /// Map a unique-constraint violation to the matching conflict error.
    pub fn conflict(field: UniqueField) -> Self {
        match field {
            UniqueField::Username => Self::username_taken(),
            UniqueField::Email => Self::email_taken(),
        }
    }

    pub fn user_not_found(user_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UserNotFound,
            format!("User ID '{}' not found.", user_id),
        )
    }

    /// Missing notes and notes owned by someone else share this error.
    pub fn note_not_found() -> Self {
        Self::from_code(ErrorCode::NoteNotFound)
    }

    pub fn activity_not_found(username: &str) -> Self {
        Self::new(
            ErrorCode::ActivityNotFound,
            format!("No activity found for user '{}'.", username),
        )
    }

    pub fn route_not_found() -> Self {
        Self::from_code(ErrorCode::RouteNotFound)
    }

    pub fn request_timeout() -> Self {
        Self::from_code(ErrorCode::RequestTimeout)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        Self::from_code(ErrorCode::ConnectionPoolExhausted)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN AND STANDARD ERRORS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation { field } => ApiError::conflict(field),
            StorageError::UserNotFound { user_id } => ApiError::user_not_found(user_id),
            StorageError::PoolTimeout => ApiError::connection_pool_exhausted(),
            StorageError::TransactionFailed { reason } => {
                tracing::error!(reason = %reason, "Transaction rolled back");
                ApiError::database_error("Storage operation failed")
            }
            StorageError::Backend { reason } => {
                tracing::error!(reason = %reason, "Storage backend error");
                ApiError::database_error("Storage operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration rejected at request time");
        ApiError::internal_error("Server misconfigured")
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

pub type ApiResult<T> = Result<T, ApiError>;
