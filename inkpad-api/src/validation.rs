//! Validation Traits
//!
//! Field checks shared by the account and note services. Lengths are
//! counted in characters except the password cap, which is in bytes since
//! bcrypt only reads the first 72 bytes of its input.

use crate::error::{ApiError, ApiResult};
use inkpad_core::limits;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
});

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use inkpad_api::validation::ValidateNonEmpty;
///
/// req.title.validate_non_empty("title")?;
/// ```
pub trait ValidateNonEmpty {
    /// Returns `ApiError::missing_field` if the value is empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for validating string lengths in characters.
pub trait ValidateLength {
    /// Validate that the character count lies within `min..=max`.
    fn validate_length(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()>;
}

impl ValidateLength for str {
    fn validate_length(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()> {
        let len = self.chars().count();
        if len < min || len > max {
            return Err(ApiError::invalid_range(field_name, min, max)
                .with_details(serde_json::json!({ "field": field_name, "length": len })));
        }
        Ok(())
    }
}

impl ValidateLength for String {
    fn validate_length(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()> {
        self.as_str().validate_length(field_name, min, max)
    }
}

/// Trait for checking if an update request has any fields set.
pub trait HasUpdates {
    /// Check if any update fields are set.
    fn has_any_updates(&self) -> bool;

    /// Validate that at least one update field is set.
    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::validation_failed(
                "At least one field must be provided for update",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// FIELD RULES
// ============================================================================

pub fn validate_username(username: &str) -> ApiResult<()> {
    username.validate_non_empty("username")?;
    username.validate_length("username", limits::USERNAME_MIN_LEN, limits::USERNAME_MAX_LEN)
}

pub fn validate_email(email: &str) -> ApiResult<()> {
    email.validate_non_empty("email")?;
    email.validate_length("email", 3, limits::EMAIL_MAX_LEN)?;

    let matches = match EMAIL_PATTERN.as_ref() {
        Ok(pattern) => pattern.is_match(email),
        Err(e) => {
            tracing::error!(error = %e, "Email pattern failed to compile");
            false
        }
    };
    if !matches {
        return Err(ApiError::invalid_format("email", "a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ApiResult<()> {
    if password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }
    if password.chars().count() < limits::PASSWORD_MIN_LEN {
        return Err(ApiError::validation_failed(format!(
            "Field 'password' must be at least {} characters",
            limits::PASSWORD_MIN_LEN
        )));
    }
    if password.len() > limits::PASSWORD_MAX_BYTES {
        return Err(ApiError::validation_failed(format!(
            "Field 'password' must be at most {} bytes of UTF-8 (longer passphrases are not supported)",
            limits::PASSWORD_MAX_BYTES
        )));
    }
    Ok(())
}

/// Note fields only need one character; whitespace counts.
pub fn validate_title(title: &str) -> ApiResult<()> {
    if title.is_empty() {
        return Err(ApiError::missing_field("title"));
    }
    title.validate_length("title", limits::TITLE_MIN_LEN, limits::TITLE_MAX_LEN)
}

pub fn validate_content(content: &str) -> ApiResult<()> {
    if content.chars().count() < limits::CONTENT_MIN_LEN {
        return Err(ApiError::missing_field("content"));
    }
    Ok(())
}
