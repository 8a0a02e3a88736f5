//! inkpad API - REST layer for the inkpad notes service
//!
//! Exposes account registration and login, owner-scoped note CRUD, and
//! per-user activity counters over Axum. Storage goes through the
//! `inkpad_storage::Store` trait, backed by PostgreSQL in production and an
//! in-process store for development and tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use auth::{AuthConfig, Claims, FixedClock, JwtClock, SystemClock, TokenService};
pub use config::{load_dotenv, ApiConfig, StoreBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use password::{HasherConfig, PasswordHasher};
pub use routes::create_app;
pub use services::{AccountService, ActivityService, NoteService};
pub use state::AppState;
pub use types::*;

#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
