// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Skill Swap: trade what you can teach for what you want to learn
//!
//! This crate provides the backend API: user profiles with offered and
//! wanted skills, user search, swap requests with their status lifecycle,
//! feedback, and admin moderation.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SqliteDb;
use services::{AdminService, FeedbackService, ProfileService, SwapService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SqliteDb,
    pub profiles: ProfileService,
    pub swaps: SwapService,
    pub feedback: FeedbackService,
    pub admin: AdminService,
}

impl AppState {
    /// Wire the services over one database handle.
    pub fn new(config: Config, db: SqliteDb) -> Self {
        let swaps = SwapService::new(db.clone());
        Self {
            profiles: ProfileService::new(db.clone(), config.max_skills_per_direction),
            feedback: FeedbackService::new(db.clone()),
            admin: AdminService::new(db.clone(), swaps.clone()),
            swaps,
            config,
            db,
        }
    }
}
