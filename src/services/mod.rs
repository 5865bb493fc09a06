// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod admin;
pub mod feedback;
pub mod password;
pub mod profile;
pub mod swap;

pub use admin::AdminService;
pub use feedback::FeedbackService;
pub use profile::ProfileService;
pub use swap::SwapService;
