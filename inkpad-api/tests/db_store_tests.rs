//! PostgreSQL store tests
//!
//! Run with `--features db-tests` against the database named by
//! `DATABASE_URL` (or the `INKPAD_DB_*` variables).

#![cfg(feature = "db-tests")]

use inkpad_api::{ApiResult, DbClient, DbConfig};
use inkpad_core::{NoteChanges, UniqueField};
use inkpad_storage::Store;
use inkpad_test_utils::assertions::*;
use inkpad_test_utils::fixtures::*;

async fn test_db() -> ApiResult<DbClient> {
    let db = DbClient::from_config(&DbConfig::from_env())?;
    db.migrate().await?;
    Ok(db)
}

/// Username unique to this test run.
fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::now_v7().simple())
}

#[tokio::test]
async fn db_user_insert_and_conflicts() -> ApiResult<()> {
    let db = test_db().await?;
    let name = unique_name("dbuser");
    let user = test_user(&name, &format!("{}@example.com", name));
    db.user_insert_with_activity(&user).await?;

    let fetched = db.user_get_by_username(&name).await?;
    assert_eq!(fetched.map(|u| u.user_id), Some(user.user_id));

    let same_name = test_user(&name, &format!("other_{}@example.com", name));
    let result = db.user_insert_with_activity(&same_name).await;
    assert_unique_violation(&result, UniqueField::Username);

    let same_email = test_user(&unique_name("dbother"), &user.email);
    let result = db.user_insert_with_activity(&same_email).await;
    assert_unique_violation(&result, UniqueField::Email);

    assert!(db.user_delete(user.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn db_note_counters_and_cascade() -> ApiResult<()> {
    let db = test_db().await?;
    let name = unique_name("dbnotes");
    let user = test_user(&name, &format!("{}@example.com", name));
    db.user_insert_with_activity(&user).await?;

    let private = db.note_insert_counted(&test_note(user.user_id, true)).await?;
    let public = db.note_insert_counted(&test_note(user.user_id, false)).await?;

    let shared = NoteChanges {
        is_private: Some(false),
        ..NoteChanges::default()
    };
    let updated = db.note_update_owned(private.id, user.user_id, &shared).await?;
    assert_eq!(updated.map(|n| n.is_private), Some(false));

    let stranger = uuid::Uuid::now_v7();
    assert!(db.note_delete_counted(public.id, stranger).await?.is_none());
    assert!(db.note_delete_counted(public.id, user.user_id).await?.is_some());

    let activity = db.activity_get(user.user_id).await?.ok_or_else(|| {
        inkpad_api::ApiError::internal_error("activity row missing after insert")
    })?;
    assert_counters_non_negative(&activity);
    assert_eq!(activity.notes_created, 2);
    assert_eq!(activity.notes_deleted, 1);
    assert_eq!(activity.notes_shared, 1);
    assert_eq!(activity.private_notes, 0);

    assert!(db.user_delete(user.user_id).await?);
    assert!(db.note_list_by_owner(user.user_id).await?.is_empty());
    assert!(db.activity_get(user.user_id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn db_note_for_missing_owner() -> ApiResult<()> {
    let db = test_db().await?;
    let owner = uuid::Uuid::now_v7();
    let result = db.note_insert_counted(&test_note(owner, false)).await;
    assert_user_not_found(&result, owner);
    Ok(())
}

#[tokio::test]
async fn db_ping() -> ApiResult<()> {
    let db = test_db().await?;
    db.ping().await?;
    Ok(())
}
