// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, skill and search routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::extract::{Valid, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::models::{Skill, SkillDirection, UserSkill};
use crate::services::profile::{
    AddSkillRequest, ProfileUpdate, ProfileView, SearchPage, SearchQuery, UserCard,
};
use crate::AppState;

use super::MessageResponse;

/// User routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/profile", get(get_profile).patch(update_profile))
        .route("/users/search", get(search_users))
        .route("/users/available-skills", get(available_skills))
        .route("/users/skills", get(list_skills).post(add_skill))
        .route("/users/skills/{skill_id}", delete(remove_skill))
        .route("/users/{user_id}", get(get_user))
}

// ─── Own Profile ─────────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileView>> {
    Ok(Json(state.profiles.get_profile(&user.user_id).await?))
}

/// Partial update; skill lists, when present, replace the whole set.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Valid(update): Valid<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    Ok(Json(
        state.profiles.update_profile(&user.user_id, update).await?,
    ))
}

// ─── Skills ──────────────────────────────────────────────────

async fn available_skills(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Skill>>> {
    Ok(Json(state.profiles.list_available_skills().await?))
}

async fn list_skills(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UserSkill>>> {
    Ok(Json(state.profiles.list_user_skills(&user.user_id).await?))
}

async fn add_skill(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Valid(request): Valid<AddSkillRequest>,
) -> Result<(StatusCode, Json<UserSkill>)> {
    let skill = state.profiles.add_skill(&user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveSkillParams {
    skill_type: SkillDirection,
}

async fn remove_skill(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(skill_id): Path<String>,
    ValidQuery(params): ValidQuery<RemoveSkillParams>,
) -> Result<Json<MessageResponse>> {
    state
        .profiles
        .remove_skill(&user.user_id, &skill_id, params.skill_type)
        .await?;

    Ok(Json(MessageResponse {
        message: "Skill removed".to_string(),
    }))
}

// ─── Other Users ─────────────────────────────────────────────

async fn search_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<SearchQuery>,
) -> Result<Json<SearchPage>> {
    Ok(Json(state.profiles.search_users(&user.user_id, query).await?))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<UserCard>> {
    Ok(Json(
        state
            .profiles
            .get_public_profile(&user.user_id, user.is_admin(), &user_id)
            .await?,
    ))
}
