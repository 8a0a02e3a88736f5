//! Note Service
//!
//! Owner-scoped note CRUD. Every mutation names the owner it acts for; a
//! note owned by someone else is reported exactly like a missing one.

use std::sync::Arc;

use chrono::Utc;
use inkpad_core::{new_entity_id, Note, NoteChanges, NoteId, UserId};
use inkpad_storage::Store;

use crate::error::{ApiError, ApiResult};
use crate::telemetry::metrics;
use crate::types::{CreateNoteRequest, MessageResponse, UpdateNoteRequest};
use crate::validation::{validate_content, validate_title, HasUpdates};

fn record_event(event: &str) {
    if let Some(metrics) = metrics() {
        metrics.record_note_event(event);
    }
}

pub struct NoteService {
    store: Arc<dyn Store>,
}

impl NoteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a note for `owner` and bump their creation counters.
    pub async fn create(&self, owner: UserId, req: CreateNoteRequest) -> ApiResult<Note> {
        validate_title(&req.title)?;
        validate_content(&req.content)?;

        let note = Note {
            id: new_entity_id(),
            user_id: owner,
            title: req.title,
            content: req.content,
            is_private: req.is_private,
            created_at: Utc::now(),
        };

        let note = self.store.note_insert_counted(&note).await?;
        tracing::info!(note_id = %note.id, user_id = %owner, is_private = note.is_private, "Note created");
        record_event("created");
        Ok(note)
    }

    /// Notes of `owner`, oldest first. Unknown owners have no notes.
    pub async fn list(&self, owner: UserId) -> ApiResult<Vec<Note>> {
        Ok(self.store.note_list_by_owner(owner).await?)
    }

    /// Apply the supplied fields to a note owned by `owner`.
    pub async fn update(
        &self,
        note_id: NoteId,
        owner: UserId,
        req: UpdateNoteRequest,
    ) -> ApiResult<Note> {
        req.validate_has_updates()?;
        if let Some(title) = &req.title {
            validate_title(title)?;
        }
        if let Some(content) = &req.content {
            validate_content(content)?;
        }

        let changes = NoteChanges::from(req);
        let note = self
            .store
            .note_update_owned(note_id, owner, &changes)
            .await?
            .ok_or_else(ApiError::note_not_found)?;

        tracing::info!(note_id = %note_id, user_id = %owner, "Note updated");
        record_event("updated");
        Ok(note)
    }

    /// Delete a note owned by `owner` and bump their deletion counters.
    pub async fn delete(&self, note_id: NoteId, owner: UserId) -> ApiResult<MessageResponse> {
        if self.store.user_get(owner).await?.is_none() {
            return Err(ApiError::user_not_found(owner));
        }

        let note = self
            .store
            .note_delete_counted(note_id, owner)
            .await?
            .ok_or_else(ApiError::note_not_found)?;

        tracing::info!(note_id = %note.id, user_id = %owner, was_private = note.is_private, "Note deleted");
        record_event("deleted");
        Ok(MessageResponse::new(format!(
            "Note '{}' deleted successfully.",
            note_id
        )))
    }
}
