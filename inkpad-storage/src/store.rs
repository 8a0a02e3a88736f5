//! Async storage trait for the relational persistence layer.
//!
//! Every operation that touches more than one record is a single trait
//! method, so an implementation can run it as one transaction.

use ::async_trait::async_trait;
use inkpad_core::{Note, NoteChanges, NoteId, StorageResult, User, UserActivity, UserId};

/// Async storage trait for database operations.
///
/// Implementations must be safe to share across request handlers. Ownership
/// checks on notes happen inside the store: an operation scoped to the wrong
/// owner behaves exactly as if the note did not exist.
#[async_trait]
pub trait Store: Send + Sync {
    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    /// Insert a user together with zeroed activity counters.
    ///
    /// Fails with `StorageError::UniqueViolation` naming the colliding field
    /// when the username or email is already registered. Nothing is written
    /// on failure.
    async fn user_insert_with_activity(&self, user: &User) -> StorageResult<()>;

    /// Get a user by ID.
    async fn user_get(&self, id: UserId) -> StorageResult<Option<User>>;

    /// Get a user by exact username.
    async fn user_get_by_username(&self, username: &str) -> StorageResult<Option<User>>;

    /// Delete a user, cascading to their notes and activity.
    /// Returns `false` when no such user exists.
    async fn user_delete(&self, id: UserId) -> StorageResult<bool>;

    // ========================================================================
    // ACTIVITY OPERATIONS
    // ========================================================================

    async fn activity_get(&self, user_id: UserId) -> StorageResult<Option<UserActivity>>;

    async fn activity_get_by_username(&self, username: &str)
        -> StorageResult<Option<UserActivity>>;

    /// Increment `times_logged_in`. Returns `false` when the user is gone.
    async fn activity_record_login(&self, user_id: UserId) -> StorageResult<bool>;

    // ========================================================================
    // NOTE OPERATIONS
    // ========================================================================

    /// Insert a note and bump the owner's creation counters atomically.
    ///
    /// Fails with `StorageError::UserNotFound` when the owner does not exist.
    async fn note_insert_counted(&self, note: &Note) -> StorageResult<Note>;

    /// List notes owned by `owner`, oldest first. Unknown owners yield an
    /// empty list.
    async fn note_list_by_owner(&self, owner: UserId) -> StorageResult<Vec<Note>>;

    /// Apply a partial update to a note owned by `owner`.
    ///
    /// Visibility flips adjust `private_notes`; a private to public flip also
    /// counts toward `notes_shared`. Returns `None` when the note does not
    /// exist or belongs to someone else.
    async fn note_update_owned(
        &self,
        note_id: NoteId,
        owner: UserId,
        changes: &NoteChanges,
    ) -> StorageResult<Option<Note>>;

    /// Delete a note owned by `owner` and bump the owner's deletion counters
    /// atomically. Returns the removed note, or `None` under the same rule as
    /// [`Store::note_update_owned`].
    async fn note_delete_counted(&self, note_id: NoteId, owner: UserId)
        -> StorageResult<Option<Note>>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Check that the backend is reachable.
    async fn ping(&self) -> StorageResult<()>;
}
