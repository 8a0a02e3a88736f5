//! End-to-end smoke tests for the inkpad API
//!
//! Drives the whole router over the in-memory store.


use axum::http::{Method, StatusCode};
use serde_json::json;
use test_support::test_app;

#[tokio::test]
async fn smoke_test_account_and_note_lifecycle() {
    let app = test_app();

    // Register and log in
    let user_id = app.register("alice", "password123").await;
    let token = app.login("alice", "password123").await;

    let (status, activity) = app.activity("alice", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activity["user_id"], user_id.as_str());
    assert_eq!(activity["times_logged_in"], 1);
    assert_eq!(activity["notes_created"], 0);

    // Three notes, one private
    let first = app.create_note(&user_id, "groceries", false).await;
    let secret = app.create_note(&user_id, "diary", true).await;
    let _third = app.create_note(&user_id, "todo", false).await;

    let (status, notes) = app
        .send(Method::GET, &format!("/get_notes/{}", user_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = notes
        .as_array()
        .expect("note list")
        .iter()
        .filter_map(|n| n["title"].as_str())
        .collect();
    assert_eq!(titles.len(), 3);
    assert!(titles.contains(&"diary"));

    // Share the private note
    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/update_note/{}?user_id={}", secret, user_id),
            Some(json!({ "is_private": false, "title": "shared diary" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "shared diary");
    assert_eq!(updated["is_private"], false);
    assert_eq!(updated["content"], "body text");

    // Delete one
    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/delete_note/{}?user_id={}", first, user_id),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Note '{}' deleted successfully.", first));

    let (_, activity) = app.activity("alice", &token).await;
    assert_eq!(activity["notes_created"], 3);
    assert_eq!(activity["notes_deleted"], 1);
    assert_eq!(activity["notes_shared"], 1);
    assert_eq!(activity["private_notes"], 0);
    assert_eq!(activity["times_logged_in"], 1);

    // Delete the account; notes and counters go with it
    let (status, body) = app
        .send(Method::DELETE, &format!("/delete_user/{}", user_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("User '{}' deleted successfully.", user_id));
    assert_eq!(app.store.note_count().await, 0);

    let (status, notes) = app
        .send(Method::GET, &format!("/get_notes/{}", user_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes, json!([]));

    let (status, body) = app
        .send(
            Method::POST,
            "/login",
            Some(json!({ "username": "alice", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn smoke_test_unknown_route_is_404() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/no/such/route", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    assert_eq!(body["message"], "Resource not found");
}

#[tokio::test]
async fn smoke_test_wrong_method_is_404() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/register", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ROUTE_NOT_FOUND");

    let (status, _) = app
        .send(Method::POST, "/get_notes/00000000-0000-0000-0000-000000000000", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn smoke_test_health_and_metrics() {
    let app = test_app();

    let (status, bytes) = app.send_raw(Method::GET, "/health/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"pong");

    let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["database"]["status"], "healthy");

    app.register("metric_user", "password123").await;
    let (status, bytes) = app.send_raw(Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(bytes).expect("metrics are utf-8");
    assert!(text.contains("inkpad_http_requests_total"));
}

#[tokio::test]
async fn smoke_test_unmatched_paths_share_one_series() {
    let app = test_app();

    for i in 0..5 {
        let uri = format!("/scrape-noise-{}/someone", i);
        let (status, _) = app.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, bytes) = app.send_raw(Method::GET, "/metrics", None, None).await;
    let text = String::from_utf8(bytes).expect("metrics are utf-8");
    assert!(!text.contains("scrape-noise"));

    let unmatched_404: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("inkpad_http_requests_total{"))
        .filter(|line| line.contains(r#"method="GET""#))
        .filter(|line| line.contains(r#"path="unmatched""#))
        .filter(|line| line.contains(r#"status="404""#))
        .collect();
    assert_eq!(unmatched_404.len(), 1, "{:?}", unmatched_404);
}

#[cfg(feature = "openapi")]
#[tokio::test]
async fn smoke_test_openapi_document_served() {
    let app = test_app();

    let (status, body) = app.send(Method::GET, "/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/register"].is_object());
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());
}
