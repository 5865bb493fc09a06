// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feedback routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

use crate::error::Result;
use crate::extract::Valid;
use crate::middleware::auth::AuthUser;
use crate::models::Feedback;
use crate::services::feedback::{SubmitFeedback, UserFeedback};
use crate::AppState;

/// Feedback routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/feedback/", post(submit_feedback))
        .route("/feedback", post(submit_feedback))
        .route("/feedback/my-feedback", get(my_feedback))
        .route("/feedback/received-feedback", get(received_feedback))
        .route("/feedback/swap/{swap_id}", get(swap_feedback))
        .route("/feedback/user/{user_id}", get(user_feedback))
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Valid(request): Valid<SubmitFeedback>,
) -> Result<(StatusCode, Json<Feedback>)> {
    let feedback = state
        .feedback
        .submit_feedback(&user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Feedback the caller has written.
async fn my_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Feedback>>> {
    Ok(Json(state.feedback.list_given(&user.user_id).await?))
}

/// Feedback about the caller, with their rating.
async fn received_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserFeedback>> {
    Ok(Json(state.feedback.list_received(&user.user_id).await?))
}

async fn swap_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(swap_id): Path<String>,
) -> Result<Json<Vec<Feedback>>> {
    Ok(Json(
        state
            .feedback
            .list_for_swap(&swap_id, &user.user_id, user.is_admin())
            .await?,
    ))
}

async fn user_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserFeedback>> {
    Ok(Json(
        state
            .feedback
            .list_for_user(&user.user_id, user.is_admin(), &user_id)
            .await?,
    ))
}
