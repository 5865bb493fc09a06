// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Moderation and platform statistics.

use crate::db::SqliteDb;
use crate::error::AppError;
use crate::models::{Feedback, Role, SwapStatus, SwapView, User};
use crate::services::SwapService;
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

const DEFAULT_ADMIN_PAGE: u32 = 100;

/// `skip` / `limit` query used by the admin listings.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PageQuery {
    pub skip: Option<u32>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
}

impl PageQuery {
    fn bounds(&self) -> (u32, u32) {
        (
            self.skip.unwrap_or(0),
            self.limit.unwrap_or(DEFAULT_ADMIN_PAGE),
        )
    }
}

/// `GET /admin/swaps` query.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SwapListQuery {
    #[serde(alias = "status_filter")]
    pub status: Option<SwapStatus>,
    pub skip: Option<u32>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u32>,
}

/// Platform-wide counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub banned_users: i64,
    pub total_swaps: i64,
    pub pending_swaps: i64,
    pub accepted_swaps: i64,
    pub completed_swaps: i64,
    pub total_feedback: i64,
    /// Mean of all ratings, `None` before any feedback exists
    pub average_rating: Option<f64>,
}

/// Full user record as shown to admins (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub profile_photo: Option<String>,
    pub is_public: bool,
    pub availability: Option<String>,
    pub role: Role,
    pub is_banned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for AdminUserView {
    fn from(user: User) -> Self {
        Self {
            created_at: format_utc_rfc3339(user.created_at),
            updated_at: format_utc_rfc3339(user.updated_at),
            id: user.id,
            name: user.name,
            email: user.email,
            location: user.location,
            profile_photo: user.profile_photo,
            is_public: user.is_public,
            availability: user.availability,
            role: user.role,
            is_banned: user.is_banned,
        }
    }
}

/// Admin operations. Callers must have checked the admin role.
#[derive(Clone)]
pub struct AdminService {
    db: SqliteDb,
    swaps: SwapService,
}

impl AdminService {
    pub fn new(db: SqliteDb, swaps: SwapService) -> Self {
        Self { db, swaps }
    }

    pub async fn stats(&self) -> Result<AdminStats, AppError> {
        Ok(AdminStats {
            total_users: self.db.count_users().await?,
            banned_users: self.db.count_banned_users().await?,
            total_swaps: self.db.count_swaps(None).await?,
            pending_swaps: self.db.count_swaps(Some(SwapStatus::Pending)).await?,
            accepted_swaps: self.db.count_swaps(Some(SwapStatus::Accepted)).await?,
            completed_swaps: self.db.count_swaps(Some(SwapStatus::Completed)).await?,
            total_feedback: self.db.count_feedback().await?,
            average_rating: self.db.average_rating().await?,
        })
    }

    pub async fn list_users(&self, page: &PageQuery) -> Result<Vec<AdminUserView>, AppError> {
        let (skip, limit) = page.bounds();
        let users = self.db.list_users(skip, limit).await?;
        Ok(users.into_iter().map(AdminUserView::from).collect())
    }

    /// Ban a user. Takes effect on their next request.
    pub async fn ban_user(&self, admin_id: &str, user_id: &str) -> Result<AdminUserView, AppError> {
        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        if user.is_admin() {
            return Err(AppError::BadRequest("Cannot ban an admin user".to_string()));
        }

        let now = Utc::now();
        self.db.set_user_banned(user_id, true, now).await?;
        tracing::info!(admin_id, user_id, "User banned");

        user.is_banned = true;
        user.updated_at = now;
        Ok(user.into())
    }

    pub async fn unban_user(
        &self,
        admin_id: &str,
        user_id: &str,
    ) -> Result<AdminUserView, AppError> {
        let mut user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        let now = Utc::now();
        self.db.set_user_banned(user_id, false, now).await?;
        tracing::info!(admin_id, user_id, "User unbanned");

        user.is_banned = false;
        user.updated_at = now;
        Ok(user.into())
    }

    pub async fn list_swaps(&self, query: &SwapListQuery) -> Result<Vec<SwapView>, AppError> {
        let (skip, limit) = PageQuery {
            skip: query.skip,
            limit: query.limit,
        }
        .bounds();
        let swaps = self.db.list_swaps(query.status, skip, limit).await?;

        let mut views = Vec::with_capacity(swaps.len());
        for swap in swaps {
            views.push(self.swaps.view(swap).await?);
        }
        Ok(views)
    }

    pub async fn list_feedback(&self, page: &PageQuery) -> Result<Vec<Feedback>, AppError> {
        let (skip, limit) = page.bounds();
        self.db.list_feedback(skip, limit).await
    }

    /// Hard-delete a swap and any feedback attached to it.
    pub async fn delete_swap(&self, admin_id: &str, swap_id: &str) -> Result<(), AppError> {
        if !self.db.delete_swap(swap_id).await? {
            return Err(AppError::NotFound(format!(
                "Swap request {swap_id} not found"
            )));
        }
        tracing::info!(admin_id, swap_id, "Swap request deleted by admin");
        Ok(())
    }

    pub async fn delete_feedback(&self, admin_id: &str, feedback_id: &str) -> Result<(), AppError> {
        if !self.db.delete_feedback(feedback_id).await? {
            return Err(AppError::NotFound(format!(
                "Feedback {feedback_id} not found"
            )));
        }
        tracing::info!(admin_id, feedback_id, "Feedback deleted by admin");
        Ok(())
    }
}
