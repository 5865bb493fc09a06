// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ratings left by swap parties.

use crate::db::SqliteDb;
use crate::error::AppError;
use crate::models::{Feedback, RatingSummary};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /feedback/`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitFeedback {
    #[validate(length(min = 1, message = "Swap is required."))]
    pub swap_id: String,
    #[validate(range(
        min = crate::models::feedback::MIN_RATING,
        max = crate::models::feedback::MAX_RATING,
        message = "Rating must be between 1 and 5."
    ))]
    pub rating: i64,
    #[serde(alias = "feedback_text")]
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters long."))]
    pub comment: Option<String>,
}

/// Feedback received by one user with its aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFeedback {
    pub user_id: String,
    pub summary: RatingSummary,
    pub feedback: Vec<Feedback>,
}

#[derive(Clone)]
pub struct FeedbackService {
    db: SqliteDb,
}

impl FeedbackService {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }

    /// Rate the other party of a swap that actually took place.
    pub async fn submit_feedback(
        &self,
        rater_id: &str,
        request: SubmitFeedback,
    ) -> Result<Feedback, AppError> {
        let swap = self
            .db
            .get_swap(&request.swap_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Swap request {} not found", request.swap_id))
            })?;

        let rated_id = swap
            .counterpart_of(rater_id)
            .ok_or_else(|| {
                AppError::Forbidden("Only swap participants can leave feedback".to_string())
            })?
            .to_string();

        if !swap.status.allows_feedback() {
            return Err(AppError::BadRequest(format!(
                "Feedback can only be left on accepted or completed swaps (status is {})",
                swap.status
            )));
        }

        if self.db.has_feedback(&swap.id, rater_id).await? {
            return Err(AppError::Conflict(
                "Feedback already submitted for this swap".to_string(),
            ));
        }

        let feedback = Feedback {
            id: uuid::Uuid::new_v4().to_string(),
            swap_id: swap.id,
            rater_id: rater_id.to_string(),
            rated_id,
            rating: request.rating,
            comment: request.comment.filter(|c| !c.trim().is_empty()),
            created_at: Utc::now(),
        };

        // The unique (swap, rater) index catches a concurrent duplicate.
        self.db.insert_feedback(&feedback).await?;

        tracing::info!(
            feedback_id = %feedback.id,
            swap_id = %feedback.swap_id,
            rater_id = %feedback.rater_id,
            rating = feedback.rating,
            "Feedback submitted"
        );

        Ok(feedback)
    }

    /// Feedback written by `user_id`.
    pub async fn list_given(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        self.db.list_feedback_by_rater(user_id).await
    }

    /// Feedback about `user_id` with the rating aggregate.
    pub async fn list_received(&self, user_id: &str) -> Result<UserFeedback, AppError> {
        let feedback = self.db.list_feedback_for_user(user_id).await?;
        let summary = RatingSummary::from_ratings(feedback.iter().map(|f| f.rating));

        Ok(UserFeedback {
            user_id: user_id.to_string(),
            summary,
            feedback,
        })
    }

    /// Feedback attached to one swap, visible to its parties and admins.
    pub async fn list_for_swap(
        &self,
        swap_id: &str,
        caller_id: &str,
        caller_is_admin: bool,
    ) -> Result<Vec<Feedback>, AppError> {
        let swap = self
            .db
            .get_swap(swap_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Swap request {swap_id} not found")))?;

        if swap.party_of(caller_id).is_none() && !caller_is_admin {
            return Err(AppError::Forbidden(
                "Not a party to this swap request".to_string(),
            ));
        }

        self.db.list_feedback_for_swap(swap_id).await
    }

    /// Feedback received by another user. Same visibility rules as their profile.
    pub async fn list_for_user(
        &self,
        viewer_id: &str,
        viewer_is_admin: bool,
        user_id: &str,
    ) -> Result<UserFeedback, AppError> {
        let privileged = viewer_is_admin || viewer_id == user_id;

        let user = match self.db.get_user(user_id).await? {
            Some(user) if privileged || !user.is_banned => user,
            _ => return Err(AppError::NotFound(format!("User {user_id} not found"))),
        };

        if !user.is_public && !privileged {
            return Err(AppError::Forbidden("Profile is private".to_string()));
        }

        self.list_received(&user.id).await
    }
}
