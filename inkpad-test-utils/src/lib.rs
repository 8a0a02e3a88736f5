//! inkpad Test Utilities
//!
//! Shared test infrastructure for the inkpad workspace:
//! - Proptest generators for request fields and note updates
//! - Test fixtures for common scenarios
//! - Assertions over storage results

// Re-export the in-memory store from its source crate
pub use inkpad_storage::MemoryStore;

pub use inkpad_core::{
    new_entity_id, Note, NoteChanges, NoteId, StorageError, StorageResult, Timestamp,
    UniqueField, User, UserActivity, UserId,
};

use chrono::Utc;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating inkpad inputs.

    use super::*;
    use inkpad_core::limits;
    use proptest::prelude::*;

    /// Usernames that pass validation (3-50 chars).
    pub fn arb_username() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{2,49}"
    }

    /// Usernames that are too short or too long.
    pub fn arb_invalid_username() -> impl Strategy<Value = String> {
        prop_oneof!["[a-z]{0,2}", "[a-z]{51,70}"]
    }

    /// Syntactically valid email addresses.
    pub fn arb_email() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9.]{0,15}", "[a-z]{1,12}", "(com|org|net|io)")
            .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
    }

    /// Strings that are not email addresses.
    pub fn arb_invalid_email() -> impl Strategy<Value = String> {
        prop_oneof!["[a-z]{1,20}", "@[a-z]{1,10}\\.com", "[a-z]{1,10}@", "[a-z]{1,5} @x\\.com"]
    }

    /// Passwords that pass validation (8-36 bytes, printable ASCII).
    pub fn arb_password() -> impl Strategy<Value = String> {
        "[!-~][ -~]{6,34}[!-~]".prop_filter("password length", |p| {
            (limits::PASSWORD_MIN_LEN..=limits::PASSWORD_MAX_BYTES).contains(&p.len())
        })
    }

    /// Note titles within the allowed length.
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ]{0,199}"
    }

    /// Note bodies of at least one character.
    pub fn arb_content() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 .,!?\n]{1,500}"
    }

    /// Generate a partial note update (possibly empty).
    pub fn arb_note_changes() -> impl Strategy<Value = NoteChanges> {
        (
            proptest::option::of(arb_title()),
            proptest::option::of(arb_content()),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(title, content, is_private)| NoteChanges {
                title,
                content,
                is_private,
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common testing scenarios.

    use super::*;

    /// A user record with a placeholder hash.
    pub fn test_user(username: &str, email: &str) -> User {
        User {
            user_id: new_entity_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
            created_at: Utc::now(),
        }
    }

    /// A note for `user_id`.
    pub fn test_note(user_id: UserId, is_private: bool) -> Note {
        Note {
            id: new_entity_id(),
            user_id,
            title: "test-note".to_string(),
            content: "A test note".to_string(),
            is_private,
            created_at: Utc::now(),
        }
    }

    /// A store with a single registered user.
    pub async fn store_with_user(username: &str, email: &str) -> StorageResult<(MemoryStore, User)> {
        use inkpad_storage::Store;

        let store = MemoryStore::new();
        let user = test_user(username, email);
        store.user_insert_with_activity(&user).await?;
        Ok((store, user))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over storage results.

    use super::*;

    /// Assert that a StorageResult reports `user_id` as missing.
    #[track_caller]
    pub fn assert_user_not_found<T: std::fmt::Debug>(result: &StorageResult<T>, user_id: UserId) {
        match result {
            Err(StorageError::UserNotFound { user_id: missing }) => {
                assert_eq!(*missing, user_id, "Wrong user id in UserNotFound");
            }
            other => panic!("Expected UserNotFound for {}, got: {:?}", user_id, other),
        }
    }

    /// Assert that a StorageResult is a unique violation on `field`.
    #[track_caller]
    pub fn assert_unique_violation<T: std::fmt::Debug>(
        result: &StorageResult<T>,
        field: UniqueField,
    ) {
        match result {
            Err(StorageError::UniqueViolation { field: f }) => {
                assert_eq!(*f, field, "Wrong field in UniqueViolation");
            }
            other => panic!("Expected UniqueViolation on {}, got: {:?}", field, other),
        }
    }

    /// Assert that every counter of `activity` is non-negative.
    #[track_caller]
    pub fn assert_counters_non_negative(activity: &UserActivity) {
        assert!(activity.notes_created >= 0, "notes_created < 0: {:?}", activity);
        assert!(activity.notes_deleted >= 0, "notes_deleted < 0: {:?}", activity);
        assert!(activity.notes_shared >= 0, "notes_shared < 0: {:?}", activity);
        assert!(activity.times_logged_in >= 0, "times_logged_in < 0: {:?}", activity);
        assert!(activity.private_notes >= 0, "private_notes < 0: {:?}", activity);
    }
}
