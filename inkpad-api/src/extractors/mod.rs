//! Custom extractors.
//!
//! Wrappers around axum's built-in extractors whose rejections come back as
//! [`ApiError`](crate::error::ApiError) bodies instead of plain text.

mod bearer;
mod rejection;

pub use bearer::BearerToken;
pub use rejection::{ApiJson, ApiPath, ApiQuery};
