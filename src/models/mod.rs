// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod feedback;
pub mod skill;
pub mod swap;
pub mod user;

pub use feedback::{Feedback, RatingSummary};
pub use skill::{Skill, SkillDirection, SkillRef, UserSkill};
pub use swap::{SwapParty, SwapRequest, SwapStatus, SwapView};
pub use user::{PublicUser, Role, User};
