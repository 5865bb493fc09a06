// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login and current-user routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Form, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::extract::Valid;
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{Role, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::profile::ProfileView;
use crate::AppState;

/// Public auth routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Auth routes that need a session. The auth middleware is applied in routes/mod.rs.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}

// ─── Registration ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters long."))]
    pub name: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = crate::services::password::MIN_PASSWORD_LENGTH,
        message = "Password must contain at least 8 characters."
    ))]
    pub password: String,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub is_public: Option<bool>,
    #[validate(length(max = 100))]
    pub availability: Option<String>,
}

/// Create an account. The first login is a separate call.
async fn register(
    State(state): State<Arc<AppState>>,
    Valid(body): Valid<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileView>)> {
    let email = body.email.trim().to_lowercase();
    let role = if state.config.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::User
    };

    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        email,
        password_hash,
        location: body.location,
        profile_photo: None,
        is_public: body.is_public.unwrap_or(true),
        availability: body.availability,
        role,
        is_banned: false,
        created_at: now,
        updated_at: now,
    };

    state.db.create_user(&user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    let profile = state.profiles.get_profile(&user.id).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Login ───────────────────────────────────────────────────

/// OAuth2 password-grant style form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>> {
    let email = form.username.trim().to_lowercase();
    let user = state
        .db
        .get_user_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let password = form.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    if !valid {
        tracing::debug!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    if user.is_banned {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }

    let access_token = create_jwt(
        &user.id,
        user.role,
        &state.config.jwt_signing_key,
        state.config.jwt_expire_minutes,
    )?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.config.jwt_expire_minutes * 60,
    }))
}

// ─── Current User ────────────────────────────────────────────

async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.get_profile(&user.user_id).await?))
}
