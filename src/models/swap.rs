// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swap request model and its status lifecycle.
//!
//! ```text
//! pending ──► accepted ──► completed
//!    │
//!    ├──► rejected
//!    └──► cancelled
//! ```
//!
//! The receiver accepts or rejects, the sender cancels, and either party may
//! mark an accepted swap as completed. `rejected`, `cancelled` and
//! `completed` are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::skill::SkillRef;
use crate::models::user::PublicUser;

/// Status of a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl SwapStatus {
    pub const ALL: [SwapStatus; 5] = [
        SwapStatus::Pending,
        SwapStatus::Accepted,
        SwapStatus::Rejected,
        SwapStatus::Cancelled,
        SwapStatus::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Rejected => "rejected",
            SwapStatus::Cancelled => "cancelled",
            SwapStatus::Completed => "completed",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SwapStatus::Rejected | SwapStatus::Cancelled | SwapStatus::Completed
        )
    }

    /// Whether the lifecycle has an edge from `self` to `next`.
    pub fn can_transition_to(self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (
                SwapStatus::Pending,
                SwapStatus::Accepted | SwapStatus::Rejected | SwapStatus::Cancelled
            ) | (SwapStatus::Accepted, SwapStatus::Completed)
        )
    }

    /// Which party may move a request into this status.
    ///
    /// `None` for `pending`, which is only ever the initial status.
    pub fn allowed_actor(self) -> Option<ActorRule> {
        match self {
            SwapStatus::Pending => None,
            SwapStatus::Accepted | SwapStatus::Rejected => Some(ActorRule::Receiver),
            SwapStatus::Cancelled => Some(ActorRule::Sender),
            SwapStatus::Completed => Some(ActorRule::EitherParty),
        }
    }

    /// Statuses that count as a swap having taken place (feedback allowed).
    pub fn allows_feedback(self) -> bool {
        matches!(self, SwapStatus::Accepted | SwapStatus::Completed)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwapStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown swap status: {s}"))
    }
}

/// The caller's role in a particular swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapParty {
    Sender,
    Receiver,
}

/// Who may perform a transition into a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRule {
    Sender,
    Receiver,
    EitherParty,
}

impl ActorRule {
    pub fn permits(self, party: SwapParty) -> bool {
        matches!(
            (self, party),
            (ActorRule::EitherParty, _)
                | (ActorRule::Sender, SwapParty::Sender)
                | (ActorRule::Receiver, SwapParty::Receiver)
        )
    }
}

/// Why a requested transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("status cannot be set to {0}")]
    NotATarget(SwapStatus),

    #[error("only the {required} may set status to {target}")]
    NotPermitted {
        required: &'static str,
        target: SwapStatus,
    },

    #[error("cannot change status from {from} to {to}")]
    Invalid { from: SwapStatus, to: SwapStatus },
}

/// Check a transition requested by `party` against the lifecycle.
///
/// Authorization is checked before the current status.
pub fn check_transition(
    current: SwapStatus,
    target: SwapStatus,
    party: SwapParty,
) -> Result<(), TransitionError> {
    let rule = target
        .allowed_actor()
        .ok_or(TransitionError::NotATarget(target))?;

    if !rule.permits(party) {
        let required = match rule {
            ActorRule::Sender => "sender",
            ActorRule::Receiver => "receiver",
            ActorRule::EitherParty => "sender or receiver",
        };
        return Err(TransitionError::NotPermitted { required, target });
    }

    if !current.can_transition_to(target) {
        return Err(TransitionError::Invalid {
            from: current,
            to: target,
        });
    }

    Ok(())
}

/// Swap request as stored in the `swap_requests` table.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    /// Skill the sender offers
    pub sender_skill_id: String,
    /// Skill the sender wants from the receiver
    pub receiver_skill_id: String,
    pub message: Option<String>,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SwapRequest {
    /// The caller's side of this swap, if any.
    pub fn party_of(&self, user_id: &str) -> Option<SwapParty> {
        if self.sender_id == user_id {
            Some(SwapParty::Sender)
        } else if self.receiver_id == user_id {
            Some(SwapParty::Receiver)
        } else {
            None
        }
    }

    /// The other party's id, from `user_id`'s point of view.
    pub fn counterpart_of(&self, user_id: &str) -> Option<&str> {
        match self.party_of(user_id)? {
            SwapParty::Sender => Some(&self.receiver_id),
            SwapParty::Receiver => Some(&self.sender_id),
        }
    }
}

/// Swap request enriched with both parties and skill names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapView {
    pub id: String,
    pub sender: PublicUser,
    pub receiver: PublicUser,
    pub sender_skill: SkillRef,
    pub receiver_skill: SkillRef,
    pub message: Option<String>,
    pub status: SwapStatus,
    pub created_at: String,
    pub updated_at: String,
}
