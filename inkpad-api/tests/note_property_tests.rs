//! Property-Based Tests for Note Activity Accounting
//!
//! For any sequence of note operations issued over HTTP, the owner's
//! activity counters agree with a model computed from the same sequence,
//! and operations scoped to another user never change anything.


use std::collections::HashMap;

use axum::http::{Method, StatusCode};
use inkpad_test_utils::generators::arb_note_changes;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use test_support::{test_app, TestApp};

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone)]
enum NoteOp {
    Create { is_private: bool },
    /// Set visibility of the n-th live note (modulo live count)
    SetPrivate { pick: usize, is_private: bool },
    Delete { pick: usize },
    /// Attempt to delete the n-th live note as another user
    ForeignDelete { pick: usize },
}

fn note_op_strategy() -> impl Strategy<Value = NoteOp> {
    prop_oneof![
        3 => any::<bool>().prop_map(|is_private| NoteOp::Create { is_private }),
        2 => (any::<usize>(), any::<bool>())
            .prop_map(|(pick, is_private)| NoteOp::SetPrivate { pick, is_private }),
        1 => any::<usize>().prop_map(|pick| NoteOp::Delete { pick }),
        1 => any::<usize>().prop_map(|pick| NoteOp::ForeignDelete { pick }),
    ]
}

#[derive(Debug, Default, PartialEq)]
struct Expected {
    notes_created: i64,
    notes_deleted: i64,
    notes_shared: i64,
    private_notes: i64,
}

async fn run_ops(app: &TestApp, owner: &str, other: &str, ops: &[NoteOp]) -> (Expected, usize) {
    let mut expected = Expected::default();
    // note id -> is_private, in creation order
    let mut live: Vec<(String, bool)> = Vec::new();

    for op in ops {
        match op {
            NoteOp::Create { is_private } => {
                let id = app.create_note(owner, "prop note", *is_private).await;
                expected.notes_created += 1;
                if *is_private {
                    expected.private_notes += 1;
                }
                live.push((id, *is_private));
            }
            NoteOp::SetPrivate { pick, is_private } => {
                if live.is_empty() {
                    continue;
                }
                let idx = pick % live.len();
                let (id, was_private) = live[idx].clone();
                let (status, _) = app
                    .send(
                        Method::PUT,
                        &format!("/update_note/{}?user_id={}", id, owner),
                        Some(json!({ "is_private": is_private })),
                        None,
                    )
                    .await;
                assert_eq!(status, StatusCode::OK);
                match (was_private, *is_private) {
                    (true, false) => {
                        expected.private_notes -= 1;
                        expected.notes_shared += 1;
                    }
                    (false, true) => expected.private_notes += 1,
                    _ => {}
                }
                live[idx].1 = *is_private;
            }
            NoteOp::Delete { pick } => {
                if live.is_empty() {
                    continue;
                }
                let (id, was_private) = live.remove(pick % live.len());
                let (status, _) = app
                    .send(
                        Method::DELETE,
                        &format!("/delete_note/{}?user_id={}", id, owner),
                        None,
                        None,
                    )
                    .await;
                assert_eq!(status, StatusCode::OK);
                expected.notes_deleted += 1;
                if was_private {
                    expected.private_notes -= 1;
                }
            }
            NoteOp::ForeignDelete { pick } => {
                if live.is_empty() {
                    continue;
                }
                let (id, _) = &live[pick % live.len()];
                let (status, body) = app
                    .send(
                        Method::DELETE,
                        &format!("/delete_note/{}?user_id={}", id, other),
                        None,
                        None,
                    )
                    .await;
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body["code"], "NOTE_NOT_FOUND");
            }
        }
    }

    let live_private = live.iter().filter(|(_, p)| *p).count() as i64;
    assert_eq!(live_private, expected.private_notes);
    (expected, live.len())
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_counters_follow_note_operations(
        ops in prop::collection::vec(note_op_strategy(), 1..16)
    ) {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let (expected, live, activity, listed, other_activity) = rt.block_on(async {
            let app = test_app();
            let owner = app.register("owner", "password123").await;
            let other = app.register("other", "password123").await;

            let (expected, live) = run_ops(&app, &owner, &other, &ops).await;

            let token = app.login("owner", "password123").await;
            let (_, activity) = app.activity("owner", &token).await;
            let (_, listed) = app
                .send(Method::GET, &format!("/get_notes/{}", owner), None, None)
                .await;
            let other_token = app.login("other", "password123").await;
            let (_, other_activity) = app.activity("other", &other_token).await;
            (expected, live, activity, listed, other_activity)
        });

        let counters: HashMap<&str, i64> = [
            "notes_created",
            "notes_deleted",
            "notes_shared",
            "private_notes",
        ]
        .into_iter()
        .map(|name| (name, activity[name].as_i64().unwrap_or(-1)))
        .collect();

        prop_assert_eq!(counters["notes_created"], expected.notes_created);
        prop_assert_eq!(counters["notes_deleted"], expected.notes_deleted);
        prop_assert_eq!(counters["notes_shared"], expected.notes_shared);
        prop_assert_eq!(counters["private_notes"], expected.private_notes);
        prop_assert_eq!(listed.as_array().map(|a| a.len()), Some(live));

        // The other account was only ever used for rejected operations.
        prop_assert_eq!(other_activity["notes_created"].as_i64(), Some(0));
        prop_assert_eq!(other_activity["notes_deleted"].as_i64(), Some(0));
    }

    #[test]
    fn prop_partial_update_touches_only_given_fields(
        was_private in any::<bool>(),
        changes in arb_note_changes(),
    ) {
        let mut body = Map::new();
        if let Some(title) = &changes.title {
            body.insert("title".to_string(), json!(title));
        }
        if let Some(content) = &changes.content {
            body.insert("content".to_string(), json!(content));
        }
        if let Some(is_private) = changes.is_private {
            body.insert("is_private".to_string(), json!(is_private));
        }

        let rt = tokio::runtime::Runtime::new().expect("runtime");
        let (status, updated) = rt.block_on(async {
            let app = test_app();
            let owner = app.register("owner", "password123").await;
            let note = app.create_note(&owner, "prop note", was_private).await;
            app.send(
                Method::PUT,
                &format!("/update_note/{}?user_id={}", note, owner),
                Some(Value::Object(body)),
                None,
            )
            .await
        });

        if changes.title.is_none() && changes.content.is_none() && changes.is_private.is_none() {
            prop_assert_eq!(status, StatusCode::BAD_REQUEST);
            return Ok(());
        }

        prop_assert_eq!(status, StatusCode::OK, "{}", updated);
        let title = changes.title.as_deref().unwrap_or("prop note");
        let content = changes.content.as_deref().unwrap_or("body text");
        prop_assert_eq!(updated["title"].as_str(), Some(title));
        prop_assert_eq!(updated["content"].as_str(), Some(content));
        prop_assert_eq!(
            updated["is_private"].as_bool(),
            Some(changes.is_private.unwrap_or(was_private))
        );
    }
}

#[tokio::test]
async fn test_foreign_update_is_indistinguishable_from_missing() {
    let app = test_app();
    let owner = app.register("owner", "password123").await;
    let other = app.register("other", "password123").await;
    let note = app.create_note(&owner, "mine", true).await;

    let (status_foreign, body_foreign) = app
        .send(
            Method::PUT,
            &format!("/update_note/{}?user_id={}", note, other),
            Some(json!({ "title": "stolen" })),
            None,
        )
        .await;
    let (status_missing, body_missing) = app
        .send(
            Method::PUT,
            &format!("/update_note/{}?user_id={}", uuid::Uuid::now_v7(), owner),
            Some(json!({ "title": "ghost" })),
            None,
        )
        .await;

    assert_eq!(status_foreign, StatusCode::NOT_FOUND);
    assert_eq!(status_foreign, status_missing);
    assert_eq!(body_foreign, body_missing);
    assert_eq!(body_foreign["message"], "Note not found or unauthorized.");
}

#[tokio::test]
async fn test_whitespace_title_and_content_accepted() {
    let app = test_app();
    let owner = app.register("owner", "password123").await;

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/create_note/{}", owner),
            Some(json!({ "title": "   ", "content": " " })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["title"].as_str(), Some("   "));
}

#[tokio::test]
async fn test_note_requests_validated() {
    let app = test_app();
    let owner = app.register("owner", "password123").await;
    let note = app.create_note(&owner, "mine", false).await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/create_note/{}", owner),
            Some(json!({ "title": "", "content": "x" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/create_note/{}", owner),
            Some(json!({ "title": "t".repeat(201), "content": "x" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/update_note/{}?user_id={}", note, owner),
            Some(json!({})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/update_note/{}", note),
            Some(json!({ "title": "no owner" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_create_for_unknown_user_is_404() {
    let app = test_app();
    let missing = uuid::Uuid::now_v7();

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/create_note/{}", missing),
            Some(json!({ "title": "t", "content": "c" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");
    assert_eq!(app.store.note_count().await, 0);
}

#[tokio::test]
async fn test_delete_note_for_unknown_user_is_404() {
    let app = test_app();
    let owner = app.register("owner", "password123").await;
    let note = app.create_note(&owner, "mine", false).await;
    let missing = uuid::Uuid::now_v7();

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/delete_note/{}?user_id={}", note, missing),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("User ID '{}' not found.", missing));
    assert_eq!(app.store.note_count().await, 1);
}
