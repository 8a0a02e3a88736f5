//! Identity types for inkpad entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, so ids of notes created later sort later.
pub type EntityId = Uuid;

/// Identifier of a registered user.
pub type UserId = EntityId;

/// Identifier of a note.
pub type NoteId = EntityId;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
