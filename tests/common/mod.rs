// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use skill_swap::config::Config;
use skill_swap::db::SqliteDb;
use skill_swap::models::skill::DEFAULT_SKILLS;
use skill_swap::routes::create_router;
use skill_swap::AppState;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// A registered, logged-in user.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Create a test app backed by a private in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let db = SqliteDb::in_memory()
        .await
        .expect("Failed to open in-memory database");
    db.seed_skills(&DEFAULT_SKILLS)
        .await
        .expect("Failed to seed skills");

    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Create a test app on a WAL database file with a multi-connection pool.
/// The returned directory holds the file; keep it alive for the test.
#[allow(dead_code)]
pub async fn create_file_backed_app(
    max_connections: u32,
) -> (Router, Arc<AppState>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("skill_swap.db").display());
    let db = SqliteDb::connect(&url, max_connections)
        .await
        .expect("Failed to open database file");
    db.migrate().await.expect("Failed to apply schema");
    db.seed_skills(&DEFAULT_SKILLS)
        .await
        .expect("Failed to seed skills");

    let state = Arc::new(AppState::new(Config::test_default(), db));
    (create_router(state.clone()), state, dir)
}

/// Send a request and decode the JSON body (`Value::Null` if empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

#[allow(dead_code)]
pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// JSON request with an optional bearer token.
#[allow(dead_code)]
pub fn json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[allow(dead_code)]
pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={email}&password={password}")))
        .unwrap()
}

/// Register a user with `extra` merged into the body, then log in.
#[allow(dead_code)]
pub async fn register_with(app: &Router, name: &str, email: &str, extra: Value) -> TestUser {
    let mut body = serde_json::json!({
        "name": name,
        "email": email,
        "password": PASSWORD,
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }

    let (status, user) = send(app, json("POST", "/auth/register", None, body)).await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {user}");

    let (status, token) = send(app, login_request(email, PASSWORD)).await;
    assert_eq!(status, StatusCode::OK, "login {email}: {token}");

    TestUser {
        id: user["id"].as_str().unwrap().to_string(),
        email: email.to_string(),
        token: token["access_token"].as_str().unwrap().to_string(),
    }
}

#[allow(dead_code)]
pub async fn register(app: &Router, name: &str, email: &str) -> TestUser {
    register_with(app, name, email, serde_json::json!({})).await
}

/// Add a skill by name; returns its catalog id.
#[allow(dead_code)]
pub async fn add_skill(app: &Router, user: &TestUser, name: &str, direction: &str) -> String {
    let (status, body) = send(
        app,
        json(
            "POST",
            "/users/skills",
            Some(&user.token),
            serde_json::json!({ "name": name, "type": direction }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add skill {name}: {body}");
    body["skill_id"].as_str().unwrap().to_string()
}

/// Send a swap request from `sender` offering `offered` for `wanted`.
#[allow(dead_code)]
pub async fn request_swap(
    app: &Router,
    sender: &TestUser,
    receiver: &TestUser,
    offered: &str,
    wanted: &str,
) -> (StatusCode, Value) {
    send(
        app,
        json(
            "POST",
            "/swaps/request",
            Some(&sender.token),
            serde_json::json!({
                "receiver_id": receiver.id,
                "sender_skill_id": offered,
                "receiver_skill_id": wanted,
                "message": "Let's trade lessons",
            }),
        ),
    )
    .await
}

/// Request a status change on a swap.
#[allow(dead_code)]
pub async fn set_status(
    app: &Router,
    user: &TestUser,
    swap_id: &str,
    status: &str,
) -> (StatusCode, Value) {
    send(
        app,
        json(
            "PUT",
            &format!("/swaps/{swap_id}/status"),
            Some(&user.token),
            serde_json::json!({ "status": status }),
        ),
    )
    .await
}

/// Two users where A offers Guitar and B offers Piano, plus a pending
/// request from A to B. Returns (a, b, swap_id).
#[allow(dead_code)]
pub async fn guitar_for_piano(app: &Router) -> (TestUser, TestUser, String) {
    let a = register(app, "Alice", "alice@example.com").await;
    let b = register(app, "Bob", "bob@example.com").await;
    let guitar = add_skill(app, &a, "Guitar", "offered").await;
    let piano = add_skill(app, &b, "Piano", "offered").await;

    let (status, swap) = request_swap(app, &a, &b, &guitar, &piano).await;
    assert_eq!(status, StatusCode::CREATED, "{swap}");
    assert_eq!(swap["status"], "pending");

    (a, b, swap["id"].as_str().unwrap().to_string())
}

/// Insert a user straight into the store (no password, cannot log in).
#[allow(dead_code)]
pub async fn insert_user(
    state: &AppState,
    name: &str,
    availability: Option<&str>,
    is_public: bool,
    is_banned: bool,
) -> String {
    let now = chrono::Utc::now();
    let id = uuid::Uuid::new_v4().to_string();
    let user = skill_swap::models::User {
        id: id.clone(),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        password_hash: "!".to_string(),
        location: None,
        profile_photo: None,
        is_public,
        availability: availability.map(str::to_string),
        role: skill_swap::models::Role::User,
        is_banned,
        created_at: now,
        updated_at: now,
    };
    state.db.create_user(&user).await.unwrap();
    id
}

/// Give a stored user a skill by name.
#[allow(dead_code)]
pub async fn insert_user_skill(state: &AppState, user_id: &str, name: &str, direction: &str) {
    let skill = state.db.get_or_create_skill(name).await.unwrap();
    let added = state
        .db
        .add_user_skill(
            user_id,
            &skill.id,
            direction.parse().unwrap(),
            state.config.max_skills_per_direction,
            chrono::Utc::now(),
        )
        .await
        .unwrap();
    assert!(added);
}
