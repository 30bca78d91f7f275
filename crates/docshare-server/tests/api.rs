//! End-to-end API tests over the in-memory backend.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use docshare_server::{ServerConfig, build_app, state::AppState};
use docshare_store::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "api-test-secret";

fn app() -> Router {
    let config = ServerConfig::with_secret(SECRET);
    let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());
    build_app(state, &config).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Register and log in, returning (user id, token).
async fn signup(app: &Router, name: &str) -> (i64, String) {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, user) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        user["id"].as_i64().unwrap(),
        login["token"].as_str().unwrap().to_string(),
    )
}

async fn create_doc(app: &Router, token: &str, content: &str, is_public: bool) -> i64 {
    let (status, doc) = send(
        app,
        "POST",
        "/api/documents",
        Some(token),
        Some(json!({ "title": "Plan", "content": content, "isPublic": is_public })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    doc["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn register_login_and_me() {
    let app = app();
    let (id, token) = signup(&app, "Alice").await;

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);
    assert_eq!(me["email"], "alice@example.com");
    assert!(me.get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": "Again", "email": "alice@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/documents", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_reads_public_document_only() {
    let app = app();
    let (_, token) = signup(&app, "Alice").await;
    let public = create_doc(&app, &token, "open", true).await;
    let private = create_doc(&app, &token, "closed", false).await;

    let (status, doc) = send(&app, "GET", &format!("/api/documents/{public}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["content"], "open");

    let (status, body) =
        send(&app, "GET", &format!("/api/documents/{private}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    // A bad token is rejected, not downgraded to anonymous.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/documents/{public}"),
        Some("not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mention_edit_shares_document_and_records_history() {
    let app = app();
    let (_, alice) = signup(&app, "Alice").await;
    let (bob_id, bob) = signup(&app, "Bob").await;
    let doc = create_doc(&app, &alice, "<p>draft</p>", false).await;

    let (status, _) = send(&app, "GET", &format!("/api/documents/{doc}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let content = format!(r#"<p>cc <span data-type="mention" data-id="{bob_id}">@Bob</span></p>"#);
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/documents/{doc}"),
        Some(&alice),
        Some(json!({ "title": "Plan v2", "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Plan v2");

    let (status, _) = send(&app, "GET", &format!("/api/documents/{doc}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, grants) = send(
        &app,
        "GET",
        &format!("/api/documents/{doc}/permissions"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grants.as_array().unwrap().len(), 1);
    assert_eq!(grants[0]["userId"], bob_id);
    assert_eq!(grants[0]["level"], "VIEW");

    let (status, versions) = send(
        &app,
        "GET",
        &format!("/api/documents/{doc}/versions"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(versions.as_array().unwrap().len(), 1);
    assert_eq!(versions[0]["content"], "<p>draft</p>");

    // VIEW cannot edit.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/documents/{doc}"),
        Some(&bob),
        Some(json!({ "title": "mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn author_shares_with_edit_then_collaborator_edits() {
    let app = app();
    let (alice_id, alice) = signup(&app, "Alice").await;
    let (bob_id, bob) = signup(&app, "Bob").await;
    let doc = create_doc(&app, &alice, "v0", false).await;

    let (status, grant) = send(
        &app,
        "POST",
        &format!("/api/documents/{doc}/permissions"),
        Some(&alice),
        Some(json!({ "email": "bob@example.com", "level": "EDIT" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(grant["userId"], bob_id);
    assert_eq!(grant["level"], "EDIT");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/documents/{doc}"),
        Some(&bob),
        Some(json!({ "title": "Plan", "content": "v1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, versions) = send(
        &app,
        "GET",
        &format!("/api/documents/{doc}/versions"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(versions[0]["authorId"], bob_id);
    assert_ne!(versions[0]["authorId"], alice_id);

    // Only the author can share.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/documents/{doc}/permissions"),
        Some(&bob),
        Some(json!({ "email": "alice@example.com", "level": "VIEW" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/documents/{doc}/permissions"),
        Some(&alice),
        Some(json!({ "email": "ghost@example.com", "level": "VIEW" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validation_and_missing_documents() {
    let app = app();
    let (_, token) = signup(&app, "Alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/documents",
        Some(&token),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = send(&app, "GET", "/api/documents/4242", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn listing_search_and_user_lookup() {
    let app = app();
    let (_, alice) = signup(&app, "Alice").await;
    let (_, bob) = signup(&app, "Bob").await;
    create_doc(&app, &alice, "quarterly roadmap", false).await;
    create_doc(&app, &alice, "public roadmap", true).await;

    let (_, mine) = send(&app, "GET", "/api/documents", Some(&alice), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 2);

    let (_, theirs) = send(&app, "GET", "/api/documents", Some(&bob), None).await;
    assert_eq!(theirs.as_array().unwrap().len(), 1);

    let (_, found) = send(
        &app,
        "GET",
        "/api/documents/search?q=roadmap",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["content"], "public roadmap");

    let (_, empty) = send(&app, "GET", "/api/documents/search?q=", Some(&bob), None).await;
    assert!(empty.as_array().unwrap().is_empty());

    let (status, users) = send(
        &app,
        "GET",
        "/api/users/search?q=example",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["name"], "Bob");
}

#[tokio::test]
async fn put_replaces_omitted_fields_with_defaults() {
    let app = app();
    let (_, alice) = signup(&app, "Alice").await;
    let doc = create_doc(&app, &alice, "<p>open</p>", true).await;

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/documents/{doc}"),
        Some(&alice),
        Some(json!({ "title": "Closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Closed");
    assert_eq!(updated["content"], "");
    assert_eq!(updated["isPublic"], false);

    let (status, body) = send(&app, "GET", &format!("/api/documents/{doc}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn grant_listing_hidden_from_readers_without_grant() {
    let app = app();
    let (_, alice) = signup(&app, "Alice").await;
    let (_, carol) = signup(&app, "Carol").await;
    let doc = create_doc(&app, &alice, "open", true).await;
    let uri = format!("/api/documents/{doc}/permissions");

    let (status, _) = send(&app, "GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &uri, Some(&carol), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
