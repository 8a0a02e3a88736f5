//! Account REST API Routes
//!
//! Registration, login, and account deletion.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use std::sync::Arc;

use inkpad_core::UserId;

use crate::{
    error::ApiResult,
    extractors::{ApiJson, ApiPath},
    services::AccountService,
    state::AppState,
    types::{LoginRequest, RegisterRequest},
};

#[cfg(feature = "openapi")]
use crate::{
    error::ApiError,
    types::{LoginResponse, MessageResponse, RegisterResponse},
};

use super::route_not_found;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /register - Create an account
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/register",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input, or username/email already taken", body = ApiError),
    ),
))]
pub async fn register(
    State(accounts): State<Arc<AccountService>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /login - Exchange credentials for a bearer token
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/login",
    tag = "Accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid credentials", body = ApiError),
    ),
))]
pub async fn login(
    State(accounts): State<Arc<AccountService>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = accounts.login(req).await?;
    Ok(Json(response))
}

/// DELETE /delete_user/:user_id - Delete an account with its notes and counters
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/delete_user/{user_id}",
    tag = "Accounts",
    params(("user_id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = ApiError),
    ),
))]
pub async fn delete_user(
    State(accounts): State<Arc<AccountService>>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<impl IntoResponse> {
    let response = accounts.delete_account(user_id).await?;
    Ok(Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(route_not_found))
        .route("/login", post(login).fallback(route_not_found))
        .route(
            "/delete_user/:user_id",
            delete(delete_user).fallback(route_not_found),
        )
}
