// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::str::FromStr;

/// Default location of the SQLite database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://skill_swap.db";
/// Access tokens expire after this many minutes unless overridden.
pub const DEFAULT_JWT_EXPIRE_MINUTES: i64 = 30;
/// Per-direction skill cap (offered / wanted).
pub const DEFAULT_MAX_SKILLS_PER_DIRECTION: usize = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    pub database_url: String,
    /// Connection pool size
    pub database_max_connections: u32,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for access tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Access token lifetime in minutes
    pub jwt_expire_minutes: i64,
    /// Maximum number of skills a user may list per direction
    pub max_skills_per_direction: usize,
    /// Seed the default skill catalog when the skills table is empty
    pub seed_skills: bool,
    /// Lowercased emails that are granted the admin role at registration
    pub admin_emails: Vec<String>,
}

impl Config {
    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            frontend_url: "http://localhost:3000".to_string(),
            port: 8000,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jwt_expire_minutes: DEFAULT_JWT_EXPIRE_MINUTES,
            max_skills_per_direction: DEFAULT_MAX_SKILLS_PER_DIRECTION,
            seed_skills: true,
            admin_emails: vec!["admin@example.com".to_string()],
        }
    }

    /// Whether an account registered with `email` becomes an admin.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email))
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: parse_var("PORT", 8000)?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            jwt_expire_minutes: parse_var("JWT_EXPIRE_MINUTES", DEFAULT_JWT_EXPIRE_MINUTES)?,
            max_skills_per_direction: parse_var(
                "MAX_SKILLS_PER_DIRECTION",
                DEFAULT_MAX_SKILLS_PER_DIRECTION,
            )?,
            seed_skills: parse_var("SEED_SKILLS", true)?,
            admin_emails: env::var("ADMIN_EMAILS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
