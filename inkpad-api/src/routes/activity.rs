//! Activity REST API Route
//!
//! Counter lookup guarded by a bearer token issued to the same username.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::{
    error::ApiResult,
    extractors::{ApiPath, BearerToken},
    services::AccountService,
    state::AppState,
};

#[cfg(feature = "openapi")]
use crate::error::ApiError;
#[cfg(feature = "openapi")]
use inkpad_core::UserActivity;

use super::route_not_found;

/// GET /get_user_activity/:username - Counters for a user
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/get_user_activity/{username}",
    tag = "Activity",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Activity counters", body = UserActivity),
        (status = 401, description = "Missing, invalid, or expired token", body = ApiError),
        (status = 404, description = "Activity not found", body = ApiError),
    ),
    security(("bearer_auth" = []))
))]
pub async fn get_user_activity(
    State(accounts): State<Arc<AccountService>>,
    ApiPath(username): ApiPath<String>,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    let activity = accounts.activity_for(&username, &token).await?;
    Ok(Json(activity))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route(
        "/get_user_activity/:username",
        get(get_user_activity).fallback(route_not_found),
    )
}
