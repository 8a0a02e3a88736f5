//! Request and response bodies for the REST API.

use crate::validation::HasUpdates;
use inkpad_core::{NoteChanges, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ACCOUNT TYPES
// ============================================================================

/// Body of `POST /register`.
#[derive(Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    #[cfg_attr(feature = "openapi", schema(min_length = 3, max_length = 50))]
    pub username: String,
    pub email: String,
    /// At least 8 characters and at most 36 bytes of UTF-8.
    #[cfg_attr(feature = "openapi", schema(min_length = 8, max_length = 36))]
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /login`.
#[derive(Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterResponse {
    pub message: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoginResponse {
    pub message: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
    /// Bearer token bound to the username
    pub token: String,
}

/// Plain confirmation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// NOTE TYPES
// ============================================================================

/// Body of `POST /create_note/:user_id`.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_private: bool,
}

/// Body of `PUT /update_note/:note_id`. Omitted or null fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
}

impl HasUpdates for UpdateNoteRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.is_private.is_some()
    }
}

impl From<UpdateNoteRequest> for NoteChanges {
    fn from(req: UpdateNoteRequest) -> Self {
        NoteChanges {
            title: req.title,
            content: req.content,
            is_private: req.is_private,
        }
    }
}

/// `?user_id=` query naming the caller on note mutations.
#[derive(Debug, Clone, Copy, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct OwnerQuery {
    /// Owner the note must belong to
    #[cfg_attr(feature = "openapi", param(value_type = String, format = Uuid))]
    pub user_id: UserId,
}
