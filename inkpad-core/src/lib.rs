//! inkpad core - entity types
//!
//! Pure data structures shared by the storage and API crates.
//! No I/O lives here.

mod entities;
mod error;
mod identity;
pub mod limits;

pub use entities::{ActivityCounter, Note, NoteChanges, User, UserActivity};
pub use error::{ConfigError, StorageError, StorageResult, UniqueField};
pub use identity::{new_entity_id, EntityId, NoteId, Timestamp, UserId};
