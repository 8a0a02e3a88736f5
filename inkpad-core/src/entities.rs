//! Core entity structures
//!
//! Plain records keyed by identifier. Relationships are foreign-key fields
//! (`Note::user_id`, `UserActivity::user_id`) resolved through the store.

use crate::{NoteId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered account.
///
/// The password hash never leaves the server: it is skipped by `Serialize`
/// and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// The counters tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActivityCounter {
    NotesCreated,
    NotesDeleted,
    NotesShared,
    TimesLoggedIn,
    PrivateNotes,
}

impl ActivityCounter {
    /// Column name in the `user_activity` table.
    pub fn column(&self) -> &'static str {
        match self {
            ActivityCounter::NotesCreated => "notes_created",
            ActivityCounter::NotesDeleted => "notes_deleted",
            ActivityCounter::NotesShared => "notes_shared",
            ActivityCounter::TimesLoggedIn => "times_logged_in",
            ActivityCounter::PrivateNotes => "private_notes",
        }
    }
}

/// Per-user activity counters, created together with the user.
///
/// All counters are non-negative. Mutations go through the `record_*`
/// methods so every store applies the same accounting rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserActivity {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
    pub notes_created: i32,
    pub notes_deleted: i32,
    pub notes_shared: i32,
    pub times_logged_in: i32,
    pub private_notes: i32,
}

impl UserActivity {
    /// Zeroed counters for a freshly registered user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            notes_created: 0,
            notes_deleted: 0,
            notes_shared: 0,
            times_logged_in: 0,
            private_notes: 0,
        }
    }

    /// Read a single counter.
    pub fn get(&self, counter: ActivityCounter) -> i32 {
        match counter {
            ActivityCounter::NotesCreated => self.notes_created,
            ActivityCounter::NotesDeleted => self.notes_deleted,
            ActivityCounter::NotesShared => self.notes_shared,
            ActivityCounter::TimesLoggedIn => self.times_logged_in,
            ActivityCounter::PrivateNotes => self.private_notes,
        }
    }

    fn slot(&mut self, counter: ActivityCounter) -> &mut i32 {
        match counter {
            ActivityCounter::NotesCreated => &mut self.notes_created,
            ActivityCounter::NotesDeleted => &mut self.notes_deleted,
            ActivityCounter::NotesShared => &mut self.notes_shared,
            ActivityCounter::TimesLoggedIn => &mut self.times_logged_in,
            ActivityCounter::PrivateNotes => &mut self.private_notes,
        }
    }

    /// Increment a counter, saturating at `i32::MAX`.
    pub fn increment(&mut self, counter: ActivityCounter) {
        let slot = self.slot(counter);
        *slot = slot.saturating_add(1);
    }

    /// Decrement a counter, never going below zero.
    pub fn decrement(&mut self, counter: ActivityCounter) {
        let slot = self.slot(counter);
        *slot = slot.saturating_sub(1).max(0);
    }

    pub fn record_login(&mut self) {
        self.increment(ActivityCounter::TimesLoggedIn);
    }

    pub fn record_note_created(&mut self, is_private: bool) {
        self.increment(ActivityCounter::NotesCreated);
        if is_private {
            self.increment(ActivityCounter::PrivateNotes);
        }
    }

    pub fn record_note_deleted(&mut self, was_private: bool) {
        self.increment(ActivityCounter::NotesDeleted);
        if was_private {
            self.decrement(ActivityCounter::PrivateNotes);
        }
    }

    /// Account for a visibility flip on an existing note.
    ///
    /// Private to public counts as sharing the note.
    pub fn record_visibility_change(&mut self, was_private: bool, is_private: bool) {
        match (was_private, is_private) {
            (true, false) => {
                self.decrement(ActivityCounter::PrivateNotes);
                self.increment(ActivityCounter::NotesShared);
            }
            (false, true) => self.increment(ActivityCounter::PrivateNotes),
            _ => {}
        }
    }
}

/// A note owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Note {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: NoteId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    pub is_private: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// Partial update for a note. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NoteChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.is_private.is_none()
    }

    /// Apply the supplied fields to `note` and return its previous privacy flag.
    pub fn apply_to(&self, note: &mut Note) -> bool {
        let was_private = note.is_private;
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(is_private) = self.is_private {
            note.is_private = is_private;
        }
        was_private
    }
}
