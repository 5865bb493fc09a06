// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swap request lifecycle.
//!
//! Every status change is a compare-and-set against the status the caller's
//! authorization was checked for. When two parties race (receiver accepts
//! while sender cancels) exactly one update lands and the other caller gets
//! a conflict.

use crate::db::{SqliteDb, SwapSide};
use crate::error::AppError;
use crate::models::swap::{check_transition, TransitionError};
use crate::models::{PublicUser, SkillDirection, SkillRef, SwapRequest, SwapStatus, SwapView};
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /swaps/request`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSwapRequest {
    #[validate(length(min = 1, message = "Receiver is required."))]
    pub receiver_id: String,
    /// Skill the sender offers
    #[serde(alias = "sender_skill")]
    #[validate(length(min = 1))]
    pub sender_skill_id: String,
    /// Skill the sender wants from the receiver
    #[serde(alias = "receiver_skill")]
    #[validate(length(min = 1))]
    pub receiver_skill_id: String,
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters long."))]
    pub message: Option<String>,
}

/// Body of `PUT /swaps/{id}/status`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusUpdate {
    pub status: SwapStatus,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotATarget(_) => AppError::BadRequest(err.to_string()),
            TransitionError::NotPermitted { .. } => AppError::Forbidden(err.to_string()),
            TransitionError::Invalid { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

/// Creates, transitions and lists swap requests.
#[derive(Clone)]
pub struct SwapService {
    db: SqliteDb,
}

impl SwapService {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }

    async fn load(&self, swap_id: &str) -> Result<SwapRequest, AppError> {
        self.db
            .get_swap(swap_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Swap request {swap_id} not found")))
    }

    /// Resolve both parties and both skills for display.
    pub async fn view(&self, swap: SwapRequest) -> Result<SwapView, AppError> {
        let sender = self.public_user(&swap.sender_id).await?;
        let receiver = self.public_user(&swap.receiver_id).await?;
        let sender_skill = self.skill_ref(&swap.sender_skill_id).await?;
        let receiver_skill = self.skill_ref(&swap.receiver_skill_id).await?;

        Ok(SwapView {
            id: swap.id,
            sender,
            receiver,
            sender_skill,
            receiver_skill,
            message: swap.message,
            status: swap.status,
            created_at: format_utc_rfc3339(swap.created_at),
            updated_at: format_utc_rfc3339(swap.updated_at),
        })
    }

    async fn views(&self, swaps: Vec<SwapRequest>) -> Result<Vec<SwapView>, AppError> {
        let mut views = Vec::with_capacity(swaps.len());
        for swap in swaps {
            views.push(self.view(swap).await?);
        }
        Ok(views)
    }

    async fn public_user(&self, user_id: &str) -> Result<PublicUser, AppError> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database(format!("Swap references missing user {user_id}")))?;
        Ok(PublicUser::from(&user))
    }

    async fn skill_ref(&self, skill_id: &str) -> Result<SkillRef, AppError> {
        let skill = self.db.get_skill(skill_id).await?.ok_or_else(|| {
            AppError::Database(format!("Swap references missing skill {skill_id}"))
        })?;
        Ok(SkillRef {
            id: skill.id,
            name: skill.name,
        })
    }

    /// Create a pending request from `sender_id`.
    pub async fn create_request(
        &self,
        sender_id: &str,
        request: CreateSwapRequest,
    ) -> Result<SwapView, AppError> {
        if request.receiver_id == sender_id {
            return Err(AppError::BadRequest(
                "Cannot send a swap request to yourself".to_string(),
            ));
        }

        match self.db.get_user(&request.receiver_id).await? {
            Some(receiver) if !receiver.is_banned => {}
            _ => return Err(AppError::NotFound("Receiver not found".to_string())),
        }

        if !self
            .db
            .has_user_skill(sender_id, &request.sender_skill_id, SkillDirection::Offered)
            .await?
        {
            return Err(AppError::BadRequest(
                "You don't offer this skill".to_string(),
            ));
        }

        if !self
            .db
            .has_user_skill(
                &request.receiver_id,
                &request.receiver_skill_id,
                SkillDirection::Offered,
            )
            .await?
        {
            return Err(AppError::BadRequest(
                "Receiver doesn't offer this skill".to_string(),
            ));
        }

        let now = Utc::now();
        let swap = SwapRequest {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: request.receiver_id,
            sender_skill_id: request.sender_skill_id,
            receiver_skill_id: request.receiver_skill_id,
            message: request.message.filter(|m| !m.trim().is_empty()),
            status: SwapStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        if !self.db.insert_swap_unless_duplicate(&swap).await? {
            return Err(AppError::Conflict(
                "A pending request for this skill swap already exists".to_string(),
            ));
        }

        tracing::info!(
            swap_id = %swap.id,
            sender_id = %swap.sender_id,
            receiver_id = %swap.receiver_id,
            "Swap request created"
        );

        self.view(swap).await
    }

    /// Move a request to `target` on behalf of `caller_id`.
    pub async fn update_status(
        &self,
        swap_id: &str,
        caller_id: &str,
        target: SwapStatus,
    ) -> Result<SwapView, AppError> {
        let mut swap = self.load(swap_id).await?;

        let party = swap.party_of(caller_id).ok_or_else(|| {
            AppError::Forbidden("Not a party to this swap request".to_string())
        })?;

        if let Err(err) = check_transition(swap.status, target, party) {
            tracing::debug!(swap_id, caller_id, error = %err, "Swap transition refused");
            return Err(err.into());
        }

        let now = Utc::now();
        let applied = self
            .db
            .transition_swap(swap_id, swap.status, target, now)
            .await?;

        if !applied {
            tracing::debug!(
                swap_id,
                caller_id,
                expected = %swap.status,
                target = %target,
                "Swap status changed concurrently"
            );
            return Err(AppError::Conflict(format!(
                "Swap request is no longer {}",
                swap.status
            )));
        }

        tracing::info!(
            swap_id,
            caller_id,
            from = %swap.status,
            to = %target,
            "Swap status updated"
        );

        swap.status = target;
        swap.updated_at = now;
        self.view(swap).await
    }

    /// Sender withdraws a pending request.
    pub async fn cancel_request(
        &self,
        swap_id: &str,
        caller_id: &str,
    ) -> Result<SwapView, AppError> {
        self.update_status(swap_id, caller_id, SwapStatus::Cancelled)
            .await
    }

    /// Requests sent by `user_id`, newest first.
    pub async fn list_sent(
        &self,
        user_id: &str,
        status: Option<SwapStatus>,
    ) -> Result<Vec<SwapView>, AppError> {
        let swaps = self
            .db
            .list_swaps_for_user(user_id, SwapSide::Sent, status)
            .await?;
        self.views(swaps).await
    }

    /// Requests received by `user_id`, newest first.
    pub async fn list_received(
        &self,
        user_id: &str,
        status: Option<SwapStatus>,
    ) -> Result<Vec<SwapView>, AppError> {
        let swaps = self
            .db
            .list_swaps_for_user(user_id, SwapSide::Received, status)
            .await?;
        self.views(swaps).await
    }

    /// A single request, visible to its two parties and to admins.
    pub async fn get_request(
        &self,
        swap_id: &str,
        caller_id: &str,
        caller_is_admin: bool,
    ) -> Result<SwapView, AppError> {
        let swap = self.load(swap_id).await?;

        if swap.party_of(caller_id).is_none() && !caller_is_admin {
            return Err(AppError::Forbidden(
                "Not a party to this swap request".to_string(),
            ));
        }

        self.view(swap).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_errors_map_to_http_classes() {
        let err: AppError = TransitionError::NotATarget(SwapStatus::Pending).into();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err: AppError = TransitionError::NotPermitted {
            required: "receiver",
            target: SwapStatus::Accepted,
        }
        .into();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err: AppError = TransitionError::Invalid {
            from: SwapStatus::Accepted,
            to: SwapStatus::Cancelled,
        }
        .into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_create_request_accepts_short_field_names() {
        let request: CreateSwapRequest = serde_json::from_str(
            r#"{"receiver_id": "b", "sender_skill": "guitar", "receiver_skill": "piano"}"#,
        )
        .unwrap();

        assert_eq!(request.sender_skill_id, "guitar");
        assert_eq!(request.receiver_skill_id, "piano");
        assert!(request.message.is_none());
    }
}
