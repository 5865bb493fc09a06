// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swap request routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::Result;
use crate::extract::{Valid, ValidQuery};
use crate::middleware::auth::AuthUser;
use crate::models::{SwapStatus, SwapView};
use crate::services::swap::{CreateSwapRequest, StatusUpdate};
use crate::AppState;

/// Swap routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/swaps/request", post(create_request))
        .route("/swaps/my-requests", get(my_requests))
        .route("/swaps/received-requests", get(received_requests))
        .route("/swaps/{swap_id}/status", put(update_status))
        .route("/swaps/{swap_id}", get(get_request).delete(cancel_request))
}

/// Optional status filter for the listings.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct StatusFilter {
    #[serde(alias = "status_filter")]
    status: Option<SwapStatus>,
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Valid(request): Valid<CreateSwapRequest>,
) -> Result<(StatusCode, Json<SwapView>)> {
    let swap = state.swaps.create_request(&user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(swap)))
}

async fn my_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(filter): ValidQuery<StatusFilter>,
) -> Result<Json<Vec<SwapView>>> {
    Ok(Json(
        state.swaps.list_sent(&user.user_id, filter.status).await?,
    ))
}

async fn received_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidQuery(filter): ValidQuery<StatusFilter>,
) -> Result<Json<Vec<SwapView>>> {
    Ok(Json(
        state
            .swaps
            .list_received(&user.user_id, filter.status)
            .await?,
    ))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(swap_id): Path<String>,
    Valid(update): Valid<StatusUpdate>,
) -> Result<Json<SwapView>> {
    Ok(Json(
        state
            .swaps
            .update_status(&swap_id, &user.user_id, update.status)
            .await?,
    ))
}

/// Sender withdraws a pending request. The record is kept as `cancelled`.
async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(swap_id): Path<String>,
) -> Result<Json<SwapView>> {
    Ok(Json(
        state.swaps.cancel_request(&swap_id, &user.user_id).await?,
    ))
}

async fn get_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(swap_id): Path<String>,
) -> Result<Json<SwapView>> {
    Ok(Json(
        state
            .swaps
            .get_request(&swap_id, &user.user_id, user.is_admin())
            .await?,
    ))
}
