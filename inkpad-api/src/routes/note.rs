//! Note REST API Routes
//!
//! This module implements Axum route handlers for note operations. Mutations
//! name the acting owner with a `user_id` query parameter.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;

use inkpad_core::{NoteId, UserId};

use crate::{
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery},
    services::NoteService,
    state::AppState,
    types::{CreateNoteRequest, OwnerQuery, UpdateNoteRequest},
};

#[cfg(feature = "openapi")]
use crate::{error::ApiError, types::MessageResponse};
#[cfg(feature = "openapi")]
use inkpad_core::Note;

use super::route_not_found;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /create_note/:user_id - Create a note for a user
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/create_note/{user_id}",
    tag = "Notes",
    params(("user_id" = uuid::Uuid, Path, description = "Owner user ID")),
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "User not found", body = ApiError),
    ),
))]
pub async fn create_note(
    State(notes): State<Arc<NoteService>>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(req): ApiJson<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let note = notes.create(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /get_notes/:user_id - List a user's notes, oldest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/get_notes/{user_id}",
    tag = "Notes",
    params(("user_id" = uuid::Uuid, Path, description = "Owner user ID")),
    responses(
        (status = 200, description = "Notes of the user (possibly empty)", body = Vec<Note>),
        (status = 400, description = "Malformed user ID", body = ApiError),
    ),
))]
pub async fn get_notes(
    State(notes): State<Arc<NoteService>>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult<impl IntoResponse> {
    let list = notes.list(user_id).await?;
    Ok(Json(list))
}

/// PUT /update_note/:note_id?user_id= - Partially update an owned note
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/update_note/{note_id}",
    tag = "Notes",
    params(
        ("note_id" = uuid::Uuid, Path, description = "Note ID"),
        OwnerQuery,
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Note not found or unauthorized", body = ApiError),
    ),
))]
pub async fn update_note(
    State(notes): State<Arc<NoteService>>,
    ApiPath(note_id): ApiPath<NoteId>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
    ApiJson(req): ApiJson<UpdateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let note = notes.update(note_id, owner.user_id, req).await?;
    Ok(Json(note))
}

/// DELETE /delete_note/:note_id?user_id= - Delete an owned note
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/delete_note/{note_id}",
    tag = "Notes",
    params(
        ("note_id" = uuid::Uuid, Path, description = "Note ID"),
        OwnerQuery,
    ),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 404, description = "User or note not found", body = ApiError),
    ),
))]
pub async fn delete_note(
    State(notes): State<Arc<NoteService>>,
    ApiPath(note_id): ApiPath<NoteId>,
    ApiQuery(owner): ApiQuery<OwnerQuery>,
) -> ApiResult<impl IntoResponse> {
    let response = notes.delete(note_id, owner.user_id).await?;
    Ok(Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route(
            "/create_note/:user_id",
            post(create_note).fallback(route_not_found),
        )
        .route("/get_notes/:user_id", get(get_notes).fallback(route_not_found))
        .route(
            "/update_note/:note_id",
            put(update_note).fallback(route_not_found),
        )
        .route(
            "/delete_note/:note_id",
            delete(delete_note).fallback(route_not_found),
        )
}
