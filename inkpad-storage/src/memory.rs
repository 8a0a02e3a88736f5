//! In-memory `Store` implementation.
//!
//! All tables sit behind one `tokio::sync::RwLock`, so every trait call is a
//! single critical section and observes the same atomicity as a database
//! transaction. Used by the test suites and by `INKPAD_STORE=memory` runs.

use crate::Store;
use ::async_trait::async_trait;
use inkpad_core::{
    Note, NoteChanges, NoteId, StorageError, StorageResult, UniqueField, User,
    UserActivity, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    activity: HashMap<UserId, UserActivity>,
    notes: HashMap<NoteId, Note>,
}

impl Tables {
    fn user_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    fn owned_note(&self, note_id: NoteId, owner: UserId) -> Option<&Note> {
        self.notes.get(&note_id).filter(|n| n.user_id == owner)
    }
}

/// In-memory store with the same semantics as the Postgres store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next multi-record write fail at commit time.
    ///
    /// The write is computed but never applied, which lets tests check that
    /// a failed operation leaves no partial state behind.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of stored notes across all users.
    pub async fn note_count(&self) -> usize {
        self.tables.read().await.notes.len()
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    fn check_commit(&self) -> StorageResult<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            tracing::debug!("injected commit failure");
            return Err(StorageError::TransactionFailed {
                reason: "injected commit failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn user_insert_with_activity(&self, user: &User) -> StorageResult<()> {
        let mut tables = self.tables.write().await;
        if tables.user_by_username(&user.username).is_some() {
            return Err(StorageError::UniqueViolation {
                field: UniqueField::Username,
            });
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::UniqueViolation {
                field: UniqueField::Email,
            });
        }
        if tables.users.contains_key(&user.user_id) {
            return Err(StorageError::Backend {
                reason: format!("duplicate user id {}", user.user_id),
            });
        }
        self.check_commit()?;

        tables.users.insert(user.user_id, user.clone());
        tables
            .activity
            .insert(user.user_id, UserActivity::new(user.user_id));
        Ok(())
    }

    async fn user_get(&self, id: UserId) -> StorageResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_get_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        Ok(self.tables.read().await.user_by_username(username).cloned())
    }

    async fn user_delete(&self, id: UserId) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(false);
        }
        self.check_commit()?;

        tables.users.remove(&id);
        tables.activity.remove(&id);
        tables.notes.retain(|_, n| n.user_id != id);
        Ok(true)
    }

    async fn activity_get(&self, user_id: UserId) -> StorageResult<Option<UserActivity>> {
        Ok(self.tables.read().await.activity.get(&user_id).cloned())
    }

    async fn activity_get_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<UserActivity>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_by_username(username)
            .and_then(|u| tables.activity.get(&u.user_id))
            .cloned())
    }

    async fn activity_record_login(&self, user_id: UserId) -> StorageResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.activity.get_mut(&user_id) {
            Some(activity) => {
                activity.record_login();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn note_insert_counted(&self, note: &Note) -> StorageResult<Note> {
        let mut tables = self.tables.write().await;
        let mut activity = match tables.activity.get(&note.user_id) {
            Some(a) if tables.users.contains_key(&note.user_id) => a.clone(),
            _ => {
                return Err(StorageError::UserNotFound {
                    user_id: note.user_id,
                })
            }
        };
        activity.record_note_created(note.is_private);
        self.check_commit()?;

        tables.notes.insert(note.id, note.clone());
        tables.activity.insert(note.user_id, activity);
        Ok(note.clone())
    }

    async fn note_list_by_owner(&self, owner: UserId) -> StorageResult<Vec<Note>> {
        let tables = self.tables.read().await;
        let mut notes: Vec<Note> = tables
            .notes
            .values()
            .filter(|n| n.user_id == owner)
            .cloned()
            .collect();
        notes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(notes)
    }

    async fn note_update_owned(
        &self,
        note_id: NoteId,
        owner: UserId,
        changes: &NoteChanges,
    ) -> StorageResult<Option<Note>> {
        let mut tables = self.tables.write().await;
        let mut note = match tables.owned_note(note_id, owner) {
            Some(n) => n.clone(),
            None => return Ok(None),
        };
        let was_private = changes.apply_to(&mut note);
        let activity = tables.activity.get(&owner).cloned().map(|mut a| {
            a.record_visibility_change(was_private, note.is_private);
            a
        });
        self.check_commit()?;

        if let Some(activity) = activity {
            tables.activity.insert(owner, activity);
        }
        tables.notes.insert(note_id, note.clone());
        Ok(Some(note))
    }

    async fn note_delete_counted(
        &self,
        note_id: NoteId,
        owner: UserId,
    ) -> StorageResult<Option<Note>> {
        let mut tables = self.tables.write().await;
        let note = match tables.owned_note(note_id, owner) {
            Some(n) => n.clone(),
            None => return Ok(None),
        };
        let activity = tables.activity.get(&owner).cloned().map(|mut a| {
            a.record_note_deleted(note.is_private);
            a
        });
        self.check_commit()?;

        if let Some(activity) = activity {
            tables.activity.insert(owner, activity);
        }
        tables.notes.remove(&note_id);
        Ok(Some(note))
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
