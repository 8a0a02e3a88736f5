//! OpenAPI document for the inkpad API
//!
//! Built with utoipa from the route annotations and request/response types.
//! Served at `/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{activity, health, note, user};
use crate::telemetry::metrics;
use crate::types::*;

use inkpad_core::{Note, UserActivity};

/// OpenAPI document for the inkpad API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "inkpad API",
        description = "Notes service: accounts, owner-scoped notes, and per-user activity counters",
    ),
    paths(
        user::register,
        user::login,
        user::delete_user,
        activity::get_user_activity,
        note::create_note,
        note::get_notes,
        note::update_note,
        note::delete_note,
        health::ping,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        MessageResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        Note,
        UserActivity,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Registration, login, and account deletion"),
        (name = "Activity", description = "Per-user activity counters"),
        (name = "Notes", description = "Owner-scoped note operations"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme used by the activity route.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /login, bound to one username"))
                        .build(),
                ),
            );
        }
    }
}

impl ApiDoc {
    /// Render the document as pretty-printed JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
