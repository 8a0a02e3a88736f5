//! Field length limits shared by validation and the relational schema.
//!
//! Lengths are counted in characters, except [`PASSWORD_MAX_BYTES`] which
//! bounds the UTF-8 encoding handed to the password hasher.

/// Minimum username length.
pub const USERNAME_MIN_LEN: usize = 3;
/// Maximum username length (`varchar(50)`).
pub const USERNAME_MAX_LEN: usize = 50;

/// Maximum email length (`varchar(255)`).
pub const EMAIL_MAX_LEN: usize = 255;

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;
/// bcrypt reads at most 72 bytes. The 36-byte hyphenated user id is
/// appended to the password, so the password gets the other 36.
pub const PASSWORD_MAX_BYTES: usize = 36;

/// Minimum note title length.
pub const TITLE_MIN_LEN: usize = 1;
/// Maximum note title length (`varchar(200)`).
pub const TITLE_MAX_LEN: usize = 200;

/// Minimum note content length. Content has no upper bound.
pub const CONTENT_MIN_LEN: usize = 1;
