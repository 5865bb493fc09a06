// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes. Every handler checks the admin role first.

use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::extract::ValidQuery;
use crate::middleware::auth::AuthUser;
use crate::models::{Feedback, SwapView};
use crate::services::admin::{AdminStats, AdminUserView, PageQuery, SwapListQuery};
use crate::AppState;

use super::MessageResponse;

/// Admin routes (require authentication via JWT plus the admin role).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{user_id}/ban", put(ban_user))
        .route("/admin/users/{user_id}/unban", put(unban_user))
        .route("/admin/swaps", get(list_swaps))
        .route("/admin/swaps/{swap_id}", delete(delete_swap))
        .route("/admin/feedback", get(list_feedback))
        .route("/admin/feedback/{feedback_id}", delete(delete_feedback))
}

// ─── Statistics ──────────────────────────────────────────────

async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AdminStats>> {
    user.require_admin()?;
    Ok(Json(state.admin.stats().await?))
}

// ─── Users ───────────────────────────────────────────────────

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<Json<Vec<AdminUserView>>> {
    user.require_admin()?;
    Ok(Json(state.admin.list_users(&page).await?))
}

async fn ban_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<AdminUserView>> {
    user.require_admin()?;
    Ok(Json(state.admin.ban_user(&user.user_id, &user_id).await?))
}

async fn unban_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<AdminUserView>> {
    user.require_admin()?;
    Ok(Json(state.admin.unban_user(&user.user_id, &user_id).await?))
}

// ─── Moderation ──────────────────────────────────────────────

async fn list_swaps(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<SwapListQuery>,
) -> Result<Json<Vec<SwapView>>> {
    user.require_admin()?;
    Ok(Json(state.admin.list_swaps(&query).await?))
}

async fn delete_swap(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(swap_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    user.require_admin()?;
    state.admin.delete_swap(&user.user_id, &swap_id).await?;
    Ok(Json(MessageResponse {
        message: "Swap request deleted".to_string(),
    }))
}

async fn list_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<Json<Vec<Feedback>>> {
    user.require_admin()?;
    Ok(Json(state.admin.list_feedback(&page).await?))
}

async fn delete_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(feedback_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    user.require_admin()?;
    state
        .admin
        .delete_feedback(&user.user_id, &feedback_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Feedback deleted".to_string(),
    }))
}
