// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use serde_json::Value;
use skill_swap::error::AppError;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_client_errors_carry_details() {
    let cases = [
        (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN, "forbidden"),
        (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND, "not_found"),
        (AppError::BadRequest("bad".into()), StatusCode::BAD_REQUEST, "bad_request"),
        (AppError::Conflict("taken".into()), StatusCode::CONFLICT, "conflict"),
    ];

    for (err, expected_status, expected_code) in cases {
        let (status, body) = render(err).await;
        assert_eq!(status, expected_status);
        assert_eq!(body["error"], expected_code);
        assert!(body["details"].is_string());
    }
}

#[tokio::test]
async fn test_auth_errors_are_unauthorized() {
    let (status, body) = render(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("details").is_none());

    let (status, body) = render(AppError::InvalidToken).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");

    let (status, body) = render(AppError::InvalidCredentials).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"], "Incorrect email or password");
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let (status, body) = render(AppError::Database("disk I/O error at /var/db".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());

    let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("details").is_none());
}

#[test]
fn test_sqlx_errors_map_to_database() {
    let err: AppError = sqlx::Error::RowNotFound.into();
    assert!(matches!(err, AppError::Database(_)));
    assert!(!skill_swap::error::is_unique_violation(&sqlx::Error::RowNotFound));
}
